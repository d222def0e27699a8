//! Port contracts for the case pipeline.
//!
//! Ports define infrastructure-agnostic interfaces used by board services.

pub mod repository;

pub use repository::{CaseRepository, CaseRepositoryError, CaseRepositoryResult};
