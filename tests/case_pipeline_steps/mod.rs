//! Step definitions for case pipeline BDD scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
