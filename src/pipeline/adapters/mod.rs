//! Adapter implementations of the case repository port.

pub mod memory;
pub mod postgres;
pub mod snapshot;
