mod http;
mod memory;

pub use http::HttpRemoteStore;
pub use memory::InMemoryRemoteStore;
