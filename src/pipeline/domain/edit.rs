//! Partial field edits applied from the card detail editor.

use super::{Case, ContractedAmount, PipelineDomainError};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// Partial update of a case's descriptive fields.
///
/// Only fields that were set are applied. The contracted amount is carried
/// as the text the user typed and parsed pt-BR style on application.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaseEdit {
    name: Option<String>,
    tax_id: Option<String>,
    contracted_amount: Option<String>,
    assigned_operator: Option<String>,
    follow_up_at: Option<Option<DateTime<Utc>>>,
}

impl CaseEdit {
    /// Creates an edit that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the customer name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the tax identifier.
    #[must_use]
    pub fn with_tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = Some(tax_id.into());
        self
    }

    /// Sets the contracted amount from locale-formatted text.
    #[must_use]
    pub fn with_contracted_amount(mut self, amount_text: impl Into<String>) -> Self {
        self.contracted_amount = Some(amount_text.into());
        self
    }

    /// Sets the assigned handler.
    #[must_use]
    pub fn with_assigned_operator(mut self, operator: impl Into<String>) -> Self {
        self.assigned_operator = Some(operator.into());
        self
    }

    /// Sets (`Some`) or clears (`None`) the follow-up reminder.
    #[must_use]
    pub const fn with_follow_up_at(mut self, follow_up_at: Option<DateTime<Utc>>) -> Self {
        self.follow_up_at = Some(follow_up_at);
        self
    }

    /// Returns `true` when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.tax_id.is_none()
            && self.contracted_amount.is_none()
            && self.assigned_operator.is_none()
            && self.follow_up_at.is_none()
    }
}

/// Report of an applied [`CaseEdit`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppliedEdit {
    /// Amount text that failed to parse and was ignored, keeping the prior
    /// amount.
    pub ignored_amount: Option<String>,
}

impl Case {
    /// Applies the fields set in `edit`.
    ///
    /// An unparseable amount is skipped and reported in
    /// [`AppliedEdit::ignored_amount`]; the remaining fields still apply.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyCaseName`] when the edit sets a
    /// blank name. The case is left unchanged in that event.
    pub fn apply_edit(
        &mut self,
        edit: &CaseEdit,
        clock: &impl Clock,
    ) -> Result<AppliedEdit, PipelineDomainError> {
        if edit.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(PipelineDomainError::EmptyCaseName);
        }

        let mut applied = AppliedEdit::default();
        if let Some(name) = &edit.name {
            self.rename(name.as_str(), clock)?;
        }
        if let Some(tax_id) = &edit.tax_id {
            self.set_tax_id(tax_id.as_str(), clock);
        }
        if let Some(amount_text) = &edit.contracted_amount {
            let parsed = ContractedAmount::parse_locale(amount_text).ok();
            applied.ignored_amount = parsed.is_none().then(|| amount_text.clone());
            if let Some(amount) = parsed {
                self.set_contracted_amount(amount, clock);
            }
        }
        if let Some(operator) = &edit.assigned_operator {
            self.set_assigned_operator(operator.as_str(), clock);
        }
        if let Some(follow_up_at) = edit.follow_up_at {
            self.set_follow_up_at(follow_up_at, clock);
        }
        Ok(applied)
    }
}
