//! Repository port for case persistence and stage changes.

use crate::pipeline::domain::{Case, CaseId, Stage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for case repository operations.
pub type CaseRepositoryResult<T> = Result<T, CaseRepositoryError>;

/// Case record store contract.
///
/// The repository owns the authoritative case list. Board services read
/// snapshots from it and request every mutation through it.
#[async_trait]
pub trait CaseRepository: Send + Sync {
    /// Returns every case, newest first by creation time.
    async fn list_cases(&self) -> CaseRepositoryResult<Vec<Case>>;

    /// Finds a case by identifier.
    ///
    /// Returns `None` when the case does not exist.
    async fn find_by_id(&self, id: &CaseId) -> CaseRepositoryResult<Option<Case>>;

    /// Stores a newly opened case together with its customer identity.
    ///
    /// # Errors
    ///
    /// Returns [`CaseRepositoryError::DuplicateCase`] when the identifier is
    /// already in use.
    async fn create_case(&self, case: &Case) -> CaseRepositoryResult<()>;

    /// Records a stage change.
    ///
    /// # Errors
    ///
    /// Returns [`CaseRepositoryError::NotFound`] when the case does not exist.
    async fn set_stage(
        &self,
        id: &CaseId,
        stage: Stage,
        entered_at: DateTime<Utc>,
    ) -> CaseRepositoryResult<()>;

    /// Persists the descriptive fields of a case (name, tax id, amount,
    /// operator, color, follow-up, update timestamp).
    ///
    /// Stage and attached documents are not written by this call.
    ///
    /// # Errors
    ///
    /// Returns [`CaseRepositoryError::NotFound`] when the case does not exist.
    async fn update_fields(&self, case: &Case) -> CaseRepositoryResult<()>;

    /// Appends a document name to the case.
    ///
    /// # Errors
    ///
    /// Returns [`CaseRepositoryError::NotFound`] when the case does not exist.
    async fn append_document(
        &self,
        id: &CaseId,
        document_name: &str,
        attached_at: DateTime<Utc>,
    ) -> CaseRepositoryResult<()>;

    /// Removes a case unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`CaseRepositoryError::NotFound`] when the case does not exist.
    async fn delete_case(&self, id: &CaseId) -> CaseRepositoryResult<()>;
}

/// Errors returned by case repository implementations.
#[derive(Debug, Clone, Error)]
pub enum CaseRepositoryError {
    /// A case with the same identifier already exists.
    #[error("duplicate case identifier: {0}")]
    DuplicateCase(CaseId),

    /// The case was not found.
    #[error("case not found: {0}")]
    NotFound(CaseId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CaseRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` for failures worth retrying (the storage itself
    /// failed, as opposed to the request being wrong).
    #[must_use]
    pub const fn is_storage_failure(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}
