use napi::bindgen_prelude::Buffer;
use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use eet_peer_core::analysis::{analyze, build_report};
use eet_peer_core::chart::ChartStyle;
use eet_peer_core::dataset::{Dataset, DatasetCache, LoaderOptions};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Optional settings passed as a JSON string.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RequestOptions {
    /// Single-character field delimiter, `,` when absent.
    delimiter: Option<String>,
    style: Option<ChartStyle>,
}

impl RequestOptions {
    fn parse(options_json: Option<String>) -> NapiResult<Self> {
        match options_json {
            Some(json) => serde_json::from_str(&json).map_err(to_napi_error),
            None => Ok(RequestOptions::default()),
        }
    }

    fn loader(&self) -> NapiResult<LoaderOptions> {
        match self.delimiter.as_deref().map(str::as_bytes) {
            None => Ok(LoaderOptions::default()),
            Some([b]) => Ok(LoaderOptions { delimiter: *b }),
            Some(_) => Err(to_napi_error("delimiter must be a single ASCII character")),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset cache
// ---------------------------------------------------------------------------

type CacheKey = (String, u8);

static CACHES: OnceLock<Mutex<HashMap<CacheKey, Arc<DatasetCache>>>> = OnceLock::new();

/// One lazily loaded dataset per (path, delimiter) for the life of the process.
fn dataset(data_path: &str, options: LoaderOptions) -> NapiResult<Arc<Dataset>> {
    let cache = {
        let mut caches = CACHES
            .get_or_init(Default::default)
            .lock()
            .map_err(to_napi_error)?;
        Arc::clone(
            caches
                .entry((data_path.to_string(), options.delimiter))
                .or_insert_with(|| Arc::new(DatasetCache::new(data_path, options))),
        )
    };
    cache.get().map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Peer analysis
// ---------------------------------------------------------------------------

/// Peer statistics for `isin` as a JSON string.
#[napi]
pub fn peer_summary(
    data_path: String,
    isin: String,
    options_json: Option<String>,
) -> NapiResult<String> {
    let options = RequestOptions::parse(options_json)?;
    let dataset = dataset(&data_path, options.loader()?)?;
    let output = analyze(&dataset, &isin).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// The PDF report for `isin`, or `null` when no metric could be compared.
#[napi]
pub fn peer_report(
    data_path: String,
    isin: String,
    options_json: Option<String>,
) -> NapiResult<Option<Buffer>> {
    let options = RequestOptions::parse(options_json)?;
    let dataset = dataset(&data_path, options.loader()?)?;
    let style = options.style.unwrap_or_default();
    let output = build_report(&dataset, &isin, &style).map_err(to_napi_error)?;
    Ok(output.result.document.map(|d| Buffer::from(d.bytes)))
}

/// Download name of the report for `isin`.
#[napi]
pub fn report_file_name(isin: String) -> String {
    eet_peer_core::report::report_file_name(&isin)
}
