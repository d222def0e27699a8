//! Esteira: case pipeline board for a small back-office CRM.
//!
//! This crate tracks customer cases through a fixed operational pipeline
//! (contract pending, unlock, value release, payment, done or cancelled) and
//! keeps a Kanban-style board consistent with the authoritative case store.
//!
//! # Architecture
//!
//! Esteira follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (snapshot file,
//!   `PostgreSQL`, in-memory)
//!
//! # Modules
//!
//! - [`pipeline`]: Stage state machine, board projection and mutations
//! - [`config`]: Runtime settings loaded from TOML and the environment

pub mod config;
pub mod pipeline;
