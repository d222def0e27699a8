//! Board state and the read models derived from it.
//!
//! [`BoardProjection`] groups a flat case list into stage columns,
//! [`OptimisticBoard`] layers tentative changes over the confirmed list and
//! [`BoardStore`] owns that state for a session and publishes snapshots.

mod optimistic;
mod projection;
mod store;
mod summary;

pub use optimistic::OptimisticBoard;
pub use projection::{BoardProjection, ColumnSummary, matches_query};
pub use store::{BoardSnapshot, BoardStore};
pub use summary::{OperatorSummary, due_follow_ups, operator_summaries};
