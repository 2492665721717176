//! Atria - healthcare administrative resource server
//!
//! One uniform pattern, ten resource types: a typed domain model validated at
//! the API boundary, a repository per resource behind the [`db::ResourceStore`]
//! trait, and a thin REST CRUD surface on top.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use error::{Error, Result};
