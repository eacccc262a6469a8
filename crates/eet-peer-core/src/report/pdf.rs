use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::info;

use crate::chart::ReportPage;
use crate::dataset::normalize_identifier;
use crate::error::EetError;
use crate::types::Metric;
use crate::EetResult;

pub const PDF_MIME_TYPE: &str = "application/pdf";

const PDF_VERSION: &str = "1.5";
const IMAGE_NAME: &str = "Im0";

/// A finished multi-page report, ready for download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    /// Metric shown on each page, in page order.
    pub metrics: Vec<Metric>,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ReportDocument {
    pub fn page_count(&self) -> usize {
        self.metrics.len()
    }

    pub fn mime_type(&self) -> &'static str {
        PDF_MIME_TYPE
    }
}

/// Download name for the report on `identifier`.
pub fn report_file_name(identifier: &str) -> String {
    format!("{}_analyse.pdf", normalize_identifier(identifier))
}

/// Concatenate `pages` into one PDF, one raster per page, in the given order.
///
/// Returns `None` when there is nothing to put in a document.
pub fn assemble(pages: &[ReportPage]) -> EetResult<Option<ReportDocument>> {
    assemble_with_title(pages, None)
}

pub fn assemble_with_title(
    pages: &[ReportPage],
    title: Option<&str>,
) -> EetResult<Option<ReportDocument>> {
    if pages.is_empty() {
        return Ok(None);
    }

    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        kids.push(add_page(&mut doc, pages_id, page)?.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut info_dict = dictionary! {
        "Producer" => Object::string_literal(format!("eet-peer {}", env!("CARGO_PKG_VERSION"))),
    };
    if let Some(title) = title {
        info_dict.set("Title", Object::string_literal(title));
    }
    let info_id = doc.add_object(info_dict);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(report_err)?;

    info!(pages = pages.len(), bytes = bytes.len(), "assembled report");
    Ok(Some(ReportDocument {
        metrics: pages.iter().map(|p| p.metric).collect(),
        bytes,
    }))
}

/// Embed one raster as an image XObject drawn across the full page.
/// One pixel maps to one point.
fn add_page(doc: &mut Document, parent: ObjectId, page: &ReportPage) -> EetResult<ObjectId> {
    let (width, height) = (page.width(), page.height());

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(page.image.as_raw()).map_err(report_err)?;
    let pixels = encoder.finish().map_err(report_err)?;

    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        pixels,
    )
    .with_compression(false);
    let image_id = doc.add_object(image);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    0.into(),
                    0.into(),
                    height.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![IMAGE_NAME.into()]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().map_err(report_err)?,
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_NAME => image_id,
            },
        },
    });

    Ok(page_id)
}

fn report_err<E: std::fmt::Display>(e: E) -> EetError {
    EetError::Report(e.to_string())
}
