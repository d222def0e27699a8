//! Request and outcome types accepted by the board service.

use crate::pipeline::domain::{Case, CaseId, ContractedAmount, NewCase};

/// Request payload for opening a case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCaseRequest {
    name: String,
    tax_id: String,
    contracted_amount: ContractedAmount,
    assigned_operator: String,
}

impl CreateCaseRequest {
    /// Creates a request with the customer's identity.
    #[must_use]
    pub fn new(name: impl Into<String>, tax_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tax_id: tax_id.into(),
            contracted_amount: ContractedAmount::ZERO,
            assigned_operator: String::new(),
        }
    }

    /// Sets the contracted amount.
    #[must_use]
    pub const fn with_contracted_amount(mut self, amount: ContractedAmount) -> Self {
        self.contracted_amount = amount;
        self
    }

    /// Sets the assigned handler.
    #[must_use]
    pub fn with_assigned_operator(mut self, operator: impl Into<String>) -> Self {
        self.assigned_operator = operator.into();
        self
    }

    pub(super) fn into_new_case(self) -> NewCase {
        NewCase {
            name: self.name,
            tax_id: self.tax_id,
            contracted_amount: self.contracted_amount,
            assigned_operator: self.assigned_operator,
        }
    }
}

/// A card released by a drag gesture.
///
/// Columns are identified by the stage name they render. The target is
/// `None` when the card was released outside every column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEvent {
    /// Dragged case.
    pub case_id: CaseId,
    /// Column the drag started from.
    pub source_column: String,
    /// Column the card was released over, if any.
    pub target_column: Option<String>,
}

impl DropEvent {
    /// Creates a drop over `target_column`.
    #[must_use]
    pub fn new(
        case_id: CaseId,
        source_column: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        Self {
            case_id,
            source_column: source_column.into(),
            target_column: Some(target_column.into()),
        }
    }

    /// Creates a drop released outside every column.
    #[must_use]
    pub fn outside(case_id: CaseId, source_column: impl Into<String>) -> Self {
        Self {
            case_id,
            source_column: source_column.into(),
            target_column: None,
        }
    }
}

/// Why a drop did not change anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredDrop {
    /// The card was released outside every column.
    OutsideColumns,
    /// The card was released over the column it came from.
    SameColumn,
    /// The case already occupied the target stage.
    AlreadyInStage,
}

/// Result of handling a [`DropEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Nothing changed.
    Ignored(IgnoredDrop),
    /// The case moved and the store confirmed it.
    Moved(Case),
}
