use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::dataset::loader::{load_with_options, Dataset, LoaderOptions};
use crate::EetResult;

/// Lazily loaded, never mutated dataset shared by every request of a process.
///
/// A failed load is not cached; the next call tries again.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    options: LoaderOptions,
    cell: OnceLock<Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>, options: LoaderOptions) -> Self {
        DatasetCache {
            path: path.into(),
            options,
            cell: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> EetResult<Arc<Dataset>> {
        if let Some(dataset) = self.cell.get() {
            return Ok(Arc::clone(dataset));
        }

        let loaded = Arc::new(load_with_options(&self.path, &self.options)?);
        // Another thread may have won the race; keep whichever landed first.
        let dataset = self.cell.get_or_init(|| loaded);
        debug!(path = %self.path.display(), "dataset cache initialised");
        Ok(Arc::clone(dataset))
    }
}
