//! Storage layer: one repository interface, two implementations

pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::InMemoryResourceStore;
pub use postgres::PostgresResourceStore;
pub use traits::{ResourceStore, StoredResource};
