mod aggregate;


pub use aggregate::{LibraryExport, UserState, ViewOutcome, STATE_SCHEMA_VERSION};
