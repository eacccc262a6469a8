pub mod analysis;
pub mod shell;

use eet_peer_core::dataset::{DatasetCache, LoaderOptions};

/// Dataset shared by every command of this process; loaded on first use.
pub fn dataset_cache(
    path: &str,
    delimiter: char,
) -> Result<DatasetCache, Box<dyn std::error::Error>> {
    if !delimiter.is_ascii() {
        return Err(format!("--delimiter must be a single ASCII character, got '{}'", delimiter).into());
    }
    let options = LoaderOptions {
        delimiter: delimiter as u8,
    };
    Ok(DatasetCache::new(path, options))
}
