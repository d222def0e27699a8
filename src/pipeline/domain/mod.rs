//! Domain model for the case pipeline.
//!
//! The pipeline domain models cases, their stage state machine and the
//! validated scalar values attached to cards, while keeping persistence and
//! board concerns outside of the domain boundary.

mod amount;
mod case;
mod color;
mod edit;
mod error;
mod ids;
mod stage;

pub use amount::ContractedAmount;
pub use case::{Case, NewCase, PersistedCaseData};
pub use color::ColorTag;
pub use edit::{AppliedEdit, CaseEdit};
pub use error::{ParseStageError, PipelineDomainError};
pub use ids::CaseId;
pub use stage::{ColumnLabels, Stage};
