//! Typed domain model for the administrative resources

pub mod kinds;
pub mod query;
pub mod resources;

pub use kinds::ResourceKind;
pub use query::{Filter, FilterOp, ListQuery};
pub use resources::{validate_payload, IdentifierValue, ValidatedResource};
