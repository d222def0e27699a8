//! Case pipeline management.
//!
//! Cases move through a fixed set of stages. The module keeps the board that
//! renders those stages consistent with the case store: mutations are applied
//! as tentative changes, persisted through the [`ports::CaseRepository`]
//! port, then confirmed or rolled back. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Board state and projections in [`board`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod board;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
