mod documents;
mod memory;
mod schema;
mod types;

pub use memory::MemoryStore;
pub use schema::Database;
pub use types::{DocumentStore, StoreError};
