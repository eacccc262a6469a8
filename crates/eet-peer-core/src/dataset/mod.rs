pub mod cache;
pub mod loader;
pub mod peers;

pub use cache::DatasetCache;
pub use loader::{load, load_with_options, Dataset, LoaderOptions, Record, DEFAULT_DATA_PATH};
pub use peers::{find_record, normalize_identifier, peer_group, PeerGroup};
