//! Application services for board orchestration.

mod board;
mod policy;
mod requests;

pub use board::{BoardError, BoardResult, BoardService};
pub use policy::MutationPolicy;
pub use requests::{CreateCaseRequest, DropEvent, DropOutcome, IgnoredDrop};
