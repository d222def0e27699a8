//! Snapshot-file adapter: the whole board stored as one JSON document.

mod document;
mod repository;

pub use repository::{SnapshotCaseRepository, SnapshotSeed};
