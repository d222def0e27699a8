//! Unit tests for the case pipeline.

mod projection_tests;
mod stage_transition_tests;
mod support;
