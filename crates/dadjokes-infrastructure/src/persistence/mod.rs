mod database;
mod kv_store;
mod memory;
mod result_ext;

pub use database::Database;
pub use kv_store::SqliteKeyValueStore;
pub use memory::InMemoryKeyValueStore;
pub use result_ext::ResultExt;
