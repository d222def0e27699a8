//! In-memory adapters for tests and ephemeral boards.

mod case;

pub use case::InMemoryCaseRepository;
