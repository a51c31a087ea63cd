//! Durable local state: a small key-value store plus the typed records kept in it.

mod cache;
mod keys;
mod snapshot;
mod store;

pub use cache::ResultCache;
pub use keys::{progress_key, result_key, session_key};
pub use snapshot::PersistedSession;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, load_json, remove_key, save_json};
