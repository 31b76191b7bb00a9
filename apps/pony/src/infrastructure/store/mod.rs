//! Query Store Implementations
//!
//! - `InMemoryStore`: a fixed snapshot, insertion ordered
//! - `JsonFileStore`: JSON snapshot loaded into an `InMemoryStore`

mod in_memory;
mod json_file;

pub use in_memory::{InMemoryStore, StoreSnapshot};
pub use json_file::JsonFileStore;
