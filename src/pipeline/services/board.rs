//! Board orchestration: the move controller and the card detail editor.

use super::policy::{MutationPolicy, StoreCall, call_store};
use super::requests::{CreateCaseRequest, DropEvent, DropOutcome, IgnoredDrop};
use crate::pipeline::{
    board::{BoardSnapshot, BoardStore},
    domain::{Case, CaseEdit, CaseId, ColorTag, ParseStageError, PipelineDomainError, Stage},
    ports::{CaseRepository, CaseRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// Case list reads attempted before a reload gives up on a list that keeps
/// being overtaken by confirmed changes.
const RELOAD_ATTEMPTS: u32 = 3;

/// Service-level errors for board operations.
#[derive(Debug, Error)]
pub enum BoardError {
    /// A column or stage name is not one of the pipeline stages.
    #[error(transparent)]
    InvalidStage(#[from] ParseStageError),
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] PipelineDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] CaseRepositoryError),
    /// The case store did not answer in time.
    #[error("case store call timed out after {0:?}")]
    Timeout(Duration),
}

impl BoardError {
    /// Returns `true` when the store could not complete the call, as opposed
    /// to rejecting the request.
    #[must_use]
    pub const fn is_storage_failure(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Repository(err) => err.is_storage_failure(),
            Self::InvalidStage(_) | Self::Domain(_) => false,
        }
    }
}

/// Result type for board service operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Case board orchestration service.
///
/// Stage changes and field edits are applied to the [`BoardStore`] as
/// tentative changes, persisted, then confirmed. A failed call rolls the
/// tentative change back, records the failure on the snapshot and reloads
/// the list from the repository. Creation and deletion are applied locally
/// only once the repository has accepted them.
///
/// Clones share the repository, clock and board store.
pub struct BoardService<R, C>
where
    R: CaseRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    store: Arc<BoardStore>,
    policy: MutationPolicy,
}

impl<R, C> Clone for BoardService<R, C>
where
    R: CaseRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            store: Arc::clone(&self.store),
            policy: self.policy,
        }
    }
}

impl<R, C> BoardService<R, C>
where
    R: CaseRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service with an empty board and the default policy.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self::with_policy(repository, clock, MutationPolicy::default())
    }

    /// Creates a service with an empty board and the given policy.
    #[must_use]
    pub fn with_policy(repository: Arc<R>, clock: Arc<C>, policy: MutationPolicy) -> Self {
        Self {
            repository,
            clock,
            store: Arc::new(BoardStore::new()),
            policy,
        }
    }

    /// Returns the board store backing this service.
    #[must_use]
    pub const fn store(&self) -> &Arc<BoardStore> {
        &self.store
    }

    /// Subscribes to board snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.store.subscribe()
    }

    /// Returns the current board snapshot.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        self.store.snapshot()
    }

    /// Reloads the confirmed case list from the repository.
    ///
    /// A list read while another call confirmed a change may predate that
    /// change, so it is discarded and read again.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the repository cannot list cases; the
    /// previous snapshot is kept.
    pub async fn refresh(&self) -> BoardResult<BoardSnapshot> {
        let repository = &*self.repository;
        for attempt in 1..=RELOAD_ATTEMPTS {
            let seen = self.store.confirmations();
            let cases =
                call_store(self.policy, StoreCall::ListCases, || repository.list_cases()).await?;
            let count = cases.len();
            if self
                .store
                .update(|board| board.replace_confirmed_since(cases, seen))
            {
                tracing::debug!(count, "reloaded case list");
                return Ok(self.store.snapshot());
            }
            tracing::debug!(attempt, "case list overtaken by a confirmed change");
        }
        tracing::warn!(
            attempts = RELOAD_ATTEMPTS,
            "keeping current board; every case list read was overtaken"
        );
        Ok(self.store.snapshot())
    }

    /// Opens a case in the first stage and places it at the front of the
    /// board once stored.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Domain`] for a blank name, or a repository or
    /// timeout error when the case could not be stored.
    pub async fn create_case(&self, request: CreateCaseRequest) -> BoardResult<Case> {
        let case = Case::new(request.into_new_case(), &*self.clock)?;
        let repository = &*self.repository;
        let stored = &case;
        let outcome = call_store(self.policy, StoreCall::CreateCase, || {
            repository.create_case(stored)
        })
        .await;
        if let Err(err) = outcome {
            self.report_failure(StoreCall::CreateCase, case.id(), &err);
            return Err(err);
        }

        self.store.update(|board| board.insert_confirmed(case.clone()));
        self.store.set_last_error(None);
        tracing::info!(case_id = %case.id(), "opened case");
        Ok(case)
    }

    /// Moves a case one stage forward. Terminal cases are returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the case does not exist or the stage
    /// change could not be stored.
    pub async fn advance(&self, id: &CaseId) -> BoardResult<Case> {
        let change = self.change_stage(id, |case, clock| case.advance(clock)).await?;
        Ok(change.case)
    }

    /// Cancels a case. Terminal cases are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the case does not exist or the stage
    /// change could not be stored.
    pub async fn cancel(&self, id: &CaseId) -> BoardResult<Case> {
        let change = self.change_stage(id, |case, clock| case.cancel(clock)).await?;
        Ok(change.case)
    }

    /// Places a case in the named stage regardless of pipeline ordering.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidStage`] when `target` names no stage,
    /// otherwise as for [`Self::advance`].
    pub async fn move_to(&self, id: &CaseId, target: &str) -> BoardResult<Case> {
        let stage = Stage::try_from(target)?;
        let change = self
            .change_stage(id, |case, clock| case.move_to(stage, clock))
            .await?;
        Ok(change.case)
    }

    /// Handles a card released by a drag gesture.
    ///
    /// A drop outside every column or back onto its own column changes
    /// nothing. Both column names are validated before they are compared
    /// and before any case is touched.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidStage`] when either column names no
    /// stage, otherwise as for [`Self::advance`].
    pub async fn drop_card(&self, event: &DropEvent) -> BoardResult<DropOutcome> {
        let Some(target_column) = event.target_column.as_deref() else {
            return Ok(DropOutcome::Ignored(IgnoredDrop::OutsideColumns));
        };

        let source = Stage::try_from(event.source_column.as_str())?;
        let target = Stage::try_from(target_column)?;
        if source == target {
            return Ok(DropOutcome::Ignored(IgnoredDrop::SameColumn));
        }

        let change = self
            .change_stage(&event.case_id, |case, clock| case.move_to(target, clock))
            .await?;
        if change.changed {
            Ok(DropOutcome::Moved(change.case))
        } else {
            Ok(DropOutcome::Ignored(IgnoredDrop::AlreadyInStage))
        }
    }

    /// Applies a partial edit of a case's descriptive fields.
    ///
    /// An amount that does not parse is skipped with a warning; the other
    /// fields still apply. An edit that sets nothing returns the case as
    /// rendered without calling the store.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Domain`] for a blank name, or a repository or
    /// timeout error when the edit could not be stored.
    pub async fn update_fields(&self, id: &CaseId, edit: &CaseEdit) -> BoardResult<Case> {
        let _guard = self.store.lock_case(id).await;
        let mut case = self.current_case(id).await?;
        if edit.is_empty() {
            return Ok(case);
        }
        let applied = case.apply_edit(edit, &*self.clock)?;
        if let Some(ignored) = applied.ignored_amount {
            tracing::warn!(
                case_id = %id,
                amount = %ignored,
                "ignoring unparseable contracted amount"
            );
        }
        self.persist_fields(case, StoreCall::UpdateFields).await
    }

    /// Recolors a card.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Domain`] when `color` is not a known tag, or a
    /// repository or timeout error when the change could not be stored.
    pub async fn set_color_tag(&self, id: &CaseId, color: &str) -> BoardResult<Case> {
        let color_tag = ColorTag::try_from(color)?;
        let _guard = self.store.lock_case(id).await;
        let mut case = self.current_case(id).await?;
        case.set_color_tag(color_tag, &*self.clock);
        self.persist_fields(case, StoreCall::UpdateFields).await
    }

    /// Appends a document name to a case.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Domain`] for a blank name, or a repository or
    /// timeout error when the document could not be stored.
    pub async fn attach_document(&self, id: &CaseId, document_name: &str) -> BoardResult<Case> {
        let _guard = self.store.lock_case(id).await;
        let mut case = self.current_case(id).await?;
        case.attach_document(document_name, &*self.clock)?;
        let Some(attached) = case.attached_documents().last().cloned() else {
            return Ok(case);
        };

        self.store.update(|board| board.begin(case.clone()));
        let repository = &*self.repository;
        let attached_at = case.updated_at();
        let outcome = call_store(self.policy, StoreCall::AppendDocument, || {
            repository.append_document(id, &attached, attached_at)
        })
        .await;
        self.settle(StoreCall::AppendDocument, case, outcome).await
    }

    /// Removes a case once the repository has deleted it.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the case does not exist or could not be
    /// deleted.
    pub async fn delete_case(&self, id: &CaseId) -> BoardResult<()> {
        let guard = self.store.lock_case(id).await;
        let repository = &*self.repository;
        let outcome =
            call_store(self.policy, StoreCall::DeleteCase, || repository.delete_case(id)).await;
        if let Err(err) = outcome {
            self.report_failure(StoreCall::DeleteCase, id, &err);
            self.reload_after_failure().await;
            return Err(err);
        }

        self.store.update(|board| board.remove_confirmed(id));
        self.store.set_last_error(None);
        drop(guard);
        self.store.forget_case(id);
        tracing::info!(case_id = %id, "deleted case");
        Ok(())
    }

    async fn change_stage(
        &self,
        id: &CaseId,
        transition: impl FnOnce(&mut Case, &C) -> bool + Send,
    ) -> BoardResult<StageChange> {
        let _guard = self.store.lock_case(id).await;
        let mut case = self.current_case(id).await?;
        let from = case.stage();
        if !transition(&mut case, &*self.clock) {
            tracing::debug!(case_id = %id, stage = %from, "stage change is a no-op");
            return Ok(StageChange {
                case,
                changed: false,
            });
        }

        self.store.update(|board| board.begin(case.clone()));
        let repository = &*self.repository;
        let stage = case.stage();
        let entered_at = case.stage_entered_at();
        let outcome = call_store(self.policy, StoreCall::SetStage, || {
            repository.set_stage(id, stage, entered_at)
        })
        .await;
        let confirmed = self.settle(StoreCall::SetStage, case, outcome).await?;
        tracing::info!(case_id = %id, %from, to = %stage, "moved case");
        Ok(StageChange {
            case: confirmed,
            changed: true,
        })
    }

    async fn persist_fields(&self, case: Case, call: StoreCall) -> BoardResult<Case> {
        self.store.update(|board| board.begin(case.clone()));
        let repository = &*self.repository;
        let edited = &case;
        let outcome = call_store(self.policy, call, || repository.update_fields(edited)).await;
        self.settle(call, case, outcome).await
    }

    /// Confirms the tentative `case` or rolls it back and reloads.
    async fn settle(
        &self,
        call: StoreCall,
        case: Case,
        outcome: BoardResult<()>,
    ) -> BoardResult<Case> {
        match outcome {
            Ok(()) => {
                self.store.update(|board| board.confirm(case.clone()));
                self.store.set_last_error(None);
                tracing::debug!(
                    call = call.as_str(),
                    case_id = %case.id(),
                    "confirmed case change"
                );
                Ok(case)
            }
            Err(err) => {
                self.store.update(|board| board.rollback(case.id()));
                self.report_failure(call, case.id(), &err);
                self.reload_after_failure().await;
                Err(err)
            }
        }
    }

    fn report_failure(&self, call: StoreCall, id: &CaseId, err: &BoardError) {
        tracing::warn!(call = call.as_str(), case_id = %id, error = %err, "case change failed");
        self.store.set_last_error(Some(err.to_string()));
    }

    async fn reload_after_failure(&self) {
        if let Err(err) = self.refresh().await {
            tracing::warn!(error = %err, "reload after failed change did not complete");
        }
    }

    /// Returns the case as currently rendered, falling back to the
    /// repository for cases the board has not loaded.
    async fn current_case(&self, id: &CaseId) -> BoardResult<Case> {
        if let Some(case) = self.store.find(id) {
            return Ok(case);
        }
        let repository = &*self.repository;
        call_store(self.policy, StoreCall::FindCase, || repository.find_by_id(id))
            .await?
            .ok_or_else(|| CaseRepositoryError::NotFound(id.clone()).into())
    }
}

struct StageChange {
    case: Case,
    changed: bool,
}
