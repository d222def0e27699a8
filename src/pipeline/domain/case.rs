//! Case aggregate root and its stage state machine.

use super::{CaseId, ColorTag, ContractedAmount, PipelineDomainError, Stage};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// Fields supplied when a case is opened for a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCase {
    /// Customer name.
    pub name: String,
    /// CPF-like tax identifier.
    pub tax_id: String,
    /// Amount contracted with the customer.
    pub contracted_amount: ContractedAmount,
    /// Handler responsible for the case.
    pub assigned_operator: String,
}

/// Case aggregate root.
///
/// A case always occupies exactly one [`Stage`]. Stage changes go through
/// [`Case::advance`], [`Case::cancel`] or [`Case::move_to`]; all other
/// mutators leave the stage untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    id: CaseId,
    name: String,
    tax_id: String,
    stage: Stage,
    contracted_amount: ContractedAmount,
    assigned_operator: String,
    color_tag: ColorTag,
    attached_documents: Vec<String>,
    follow_up_at: Option<DateTime<Utc>>,
    stage_entered_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted case aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCaseData {
    /// Persisted case identifier.
    pub id: CaseId,
    /// Persisted customer name.
    pub name: String,
    /// Persisted tax identifier.
    pub tax_id: String,
    /// Persisted pipeline stage.
    pub stage: Stage,
    /// Persisted contracted amount.
    pub contracted_amount: ContractedAmount,
    /// Persisted handler name or id.
    pub assigned_operator: String,
    /// Persisted card color.
    pub color_tag: ColorTag,
    /// Persisted document names, in attachment order.
    pub attached_documents: Vec<String>,
    /// Persisted follow-up reminder, if any.
    pub follow_up_at: Option<DateTime<Utc>>,
    /// Persisted timestamp of the latest stage change.
    pub stage_entered_at: DateTime<Utc>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Case {
    /// Opens a new case in [`Stage::ContractPending`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyCaseName`] when the name is blank.
    pub fn new(details: NewCase, clock: &impl Clock) -> Result<Self, PipelineDomainError> {
        let name = validated_name(&details.name)?;
        let timestamp = clock.utc();

        Ok(Self {
            id: CaseId::new(),
            name,
            tax_id: details.tax_id.trim().to_owned(),
            stage: Stage::ContractPending,
            contracted_amount: details.contracted_amount,
            assigned_operator: details.assigned_operator.trim().to_owned(),
            color_tag: ColorTag::default(),
            attached_documents: Vec::new(),
            follow_up_at: None,
            stage_entered_at: timestamp,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a case from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedCaseData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            tax_id: data.tax_id,
            stage: data.stage,
            contracted_amount: data.contracted_amount,
            assigned_operator: data.assigned_operator,
            color_tag: data.color_tag,
            attached_documents: data.attached_documents,
            follow_up_at: data.follow_up_at,
            stage_entered_at: data.stage_entered_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns a persistence parameter object describing this case.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedCaseData {
        PersistedCaseData {
            id: self.id.clone(),
            name: self.name.clone(),
            tax_id: self.tax_id.clone(),
            stage: self.stage,
            contracted_amount: self.contracted_amount,
            assigned_operator: self.assigned_operator.clone(),
            color_tag: self.color_tag,
            attached_documents: self.attached_documents.clone(),
            follow_up_at: self.follow_up_at,
            stage_entered_at: self.stage_entered_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Returns the case identifier.
    #[must_use]
    pub const fn id(&self) -> &CaseId {
        &self.id
    }

    /// Returns the customer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tax identifier.
    #[must_use]
    pub fn tax_id(&self) -> &str {
        &self.tax_id
    }

    /// Returns the current stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the contracted amount.
    #[must_use]
    pub const fn contracted_amount(&self) -> ContractedAmount {
        self.contracted_amount
    }

    /// Returns the assigned handler, empty when unassigned.
    #[must_use]
    pub fn assigned_operator(&self) -> &str {
        &self.assigned_operator
    }

    /// Returns the card color.
    #[must_use]
    pub const fn color_tag(&self) -> ColorTag {
        self.color_tag
    }

    /// Returns attached document names in attachment order.
    #[must_use]
    pub fn attached_documents(&self) -> &[String] {
        &self.attached_documents
    }

    /// Returns the follow-up reminder, if any.
    #[must_use]
    pub const fn follow_up_at(&self) -> Option<DateTime<Utc>> {
        self.follow_up_at
    }

    /// Returns when the case entered its current stage.
    #[must_use]
    pub const fn stage_entered_at(&self) -> DateTime<Utc> {
        self.stage_entered_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the case exactly one stage forward.
    ///
    /// Returns `false` and leaves the case unchanged when the case is already
    /// in a terminal stage.
    pub fn advance(&mut self, clock: &impl Clock) -> bool {
        let Some(next) = self.stage.next() else {
            return false;
        };
        self.enter_stage(next, clock);
        true
    }

    /// Cancels a case that has not reached a terminal stage.
    ///
    /// Returns `false` and leaves the case unchanged when the case is already
    /// done or cancelled.
    pub fn cancel(&mut self, clock: &impl Clock) -> bool {
        if self.stage.is_terminal() {
            return false;
        }
        self.enter_stage(Stage::Cancelled, clock);
        true
    }

    /// Places the case in `target` regardless of pipeline ordering.
    ///
    /// This is the direct-manipulation path used by drag and drop; it also
    /// reopens terminal cases. Returns `false` when the case already occupies
    /// `target`.
    pub fn move_to(&mut self, target: Stage, clock: &impl Clock) -> bool {
        if self.stage == target {
            return false;
        }
        self.enter_stage(target, clock);
        true
    }

    /// Renames the customer.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyCaseName`] when the name is blank.
    pub fn rename(
        &mut self,
        name: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), PipelineDomainError> {
        self.name = validated_name(&name.into())?;
        self.touch(clock);
        Ok(())
    }

    /// Replaces the tax identifier.
    pub fn set_tax_id(&mut self, tax_id: impl Into<String>, clock: &impl Clock) {
        self.tax_id = tax_id.into().trim().to_owned();
        self.touch(clock);
    }

    /// Replaces the contracted amount.
    pub fn set_contracted_amount(&mut self, amount: ContractedAmount, clock: &impl Clock) {
        self.contracted_amount = amount;
        self.touch(clock);
    }

    /// Reassigns the handler.
    pub fn set_assigned_operator(&mut self, operator: impl Into<String>, clock: &impl Clock) {
        self.assigned_operator = operator.into().trim().to_owned();
        self.touch(clock);
    }

    /// Sets or clears the follow-up reminder.
    pub fn set_follow_up_at(&mut self, follow_up_at: Option<DateTime<Utc>>, clock: &impl Clock) {
        self.follow_up_at = follow_up_at;
        self.touch(clock);
    }

    /// Recolors the card.
    pub fn set_color_tag(&mut self, color_tag: ColorTag, clock: &impl Clock) {
        self.color_tag = color_tag;
        self.touch(clock);
    }

    /// Appends a document name. Duplicate names are kept.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyDocumentName`] when the name is
    /// blank.
    pub fn attach_document(
        &mut self,
        document_name: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), PipelineDomainError> {
        let raw = document_name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PipelineDomainError::EmptyDocumentName);
        }
        self.attached_documents.push(trimmed.to_owned());
        self.touch(clock);
        Ok(())
    }

    fn enter_stage(&mut self, stage: Stage, clock: &impl Clock) {
        let timestamp = clock.utc();
        self.stage = stage;
        self.stage_entered_at = timestamp;
        self.updated_at = timestamp;
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn validated_name(raw: &str) -> Result<String, PipelineDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PipelineDomainError::EmptyCaseName);
    }
    Ok(trimmed.to_owned())
}
