//! In-memory case repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

use crate::pipeline::{
    domain::{Case, CaseId, PersistedCaseData, Stage},
    ports::{CaseRepository, CaseRepositoryError, CaseRepositoryResult},
};

/// Thread-safe in-memory case repository.
///
/// Cases are kept newest first, matching the order `list_cases` promises.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCaseRepository {
    state: Arc<RwLock<InMemoryCaseState>>,
}

#[derive(Debug, Default)]
struct InMemoryCaseState {
    cases: Vec<Case>,
}

impl InMemoryCaseState {
    fn position(&self, id: &CaseId) -> CaseRepositoryResult<usize> {
        self.cases
            .iter()
            .position(|case| case.id() == id)
            .ok_or_else(|| CaseRepositoryError::NotFound(id.clone()))
    }

    /// Rebuilds a stored case through its persisted form.
    fn rewrite(
        &mut self,
        id: &CaseId,
        apply: impl FnOnce(&mut PersistedCaseData),
    ) -> CaseRepositoryResult<()> {
        let stored = self
            .cases
            .iter_mut()
            .find(|case| case.id() == id)
            .ok_or_else(|| CaseRepositoryError::NotFound(id.clone()))?;
        let mut data = stored.to_persisted();
        apply(&mut data);
        *stored = Case::from_persisted(data);
        Ok(())
    }
}

impl InMemoryCaseRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with `cases`, kept in the given
    /// order.
    #[must_use]
    pub fn with_cases(cases: Vec<Case>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryCaseState { cases })),
        }
    }

    fn write_state(
        &self,
    ) -> CaseRepositoryResult<std::sync::RwLockWriteGuard<'_, InMemoryCaseState>> {
        self.state.write().map_err(|err| {
            CaseRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn read_state(
        &self,
    ) -> CaseRepositoryResult<std::sync::RwLockReadGuard<'_, InMemoryCaseState>> {
        self.state.read().map_err(|err| {
            CaseRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl CaseRepository for InMemoryCaseRepository {
    async fn list_cases(&self) -> CaseRepositoryResult<Vec<Case>> {
        let state = self.read_state()?;
        Ok(state.cases.clone())
    }

    async fn find_by_id(&self, id: &CaseId) -> CaseRepositoryResult<Option<Case>> {
        let state = self.read_state()?;
        Ok(state.cases.iter().find(|case| case.id() == id).cloned())
    }

    async fn create_case(&self, case: &Case) -> CaseRepositoryResult<()> {
        let mut state = self.write_state()?;
        if state.cases.iter().any(|stored| stored.id() == case.id()) {
            return Err(CaseRepositoryError::DuplicateCase(case.id().clone()));
        }
        state.cases.insert(0, case.clone());
        Ok(())
    }

    async fn set_stage(
        &self,
        id: &CaseId,
        stage: Stage,
        entered_at: DateTime<Utc>,
    ) -> CaseRepositoryResult<()> {
        let mut state = self.write_state()?;
        state.rewrite(id, |data| {
            data.stage = stage;
            data.stage_entered_at = entered_at;
            data.updated_at = entered_at;
        })
    }

    async fn update_fields(&self, case: &Case) -> CaseRepositoryResult<()> {
        let mut state = self.write_state()?;
        state.rewrite(case.id(), |data| {
            data.name = case.name().to_owned();
            data.tax_id = case.tax_id().to_owned();
            data.contracted_amount = case.contracted_amount();
            data.assigned_operator = case.assigned_operator().to_owned();
            data.color_tag = case.color_tag();
            data.follow_up_at = case.follow_up_at();
            data.updated_at = case.updated_at();
        })
    }

    async fn append_document(
        &self,
        id: &CaseId,
        document_name: &str,
        attached_at: DateTime<Utc>,
    ) -> CaseRepositoryResult<()> {
        let mut state = self.write_state()?;
        state.rewrite(id, |data| {
            data.attached_documents.push(document_name.to_owned());
            data.updated_at = attached_at;
        })
    }

    async fn delete_case(&self, id: &CaseId) -> CaseRepositoryResult<()> {
        let mut state = self.write_state()?;
        let index = state.position(id)?;
        state.cases.remove(index);
        Ok(())
    }
}
