//! Service layer - business logic between handlers and the store

pub mod charges;
pub mod crud;
pub mod tasks;

pub use charges::ChargeValidator;
pub use crud::ResourceService;
pub use tasks::TaskRunner;
