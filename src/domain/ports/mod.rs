//! Port trait definitions (Hexagonal Architecture)
//!
//! - CredentialRepository: durable storage of credential records
//!
//! The service layer depends only on these traits, so the storage engine
//! can be swapped or faked in tests.

pub mod credential_repository;

pub use credential_repository::CredentialRepository;
