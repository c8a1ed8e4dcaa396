pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::{build_store, connect};
pub use memory::{MemoryData, MemoryStore};
pub use postgres::PgStore;
pub use store::{Store, StoreError, StoreResult};
