//! Domain layer for the token store
//!
//! Core models, errors and the storage port.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
