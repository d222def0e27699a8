//! `PostgreSQL` adapters for case persistence.

mod models;
mod repository;
mod schema;

pub use repository::{CasePgPool, PostgresCaseRepository};
