//! Shared world state for case pipeline BDD scenarios.

use std::sync::Arc;

use esteira::pipeline::{
    adapters::memory::InMemoryCaseRepository,
    domain::{Case, CaseId},
    services::{BoardError, BoardService, DropOutcome},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestBoardService = BoardService<InMemoryCaseRepository, DefaultClock>;

/// Scenario world for case pipeline behaviour tests.
pub struct CasePipelineWorld {
    pub service: TestBoardService,
    pub current_case: Option<CaseId>,
    pub last_move_result: Option<Result<Case, BoardError>>,
    pub last_drop_result: Option<Result<DropOutcome, BoardError>>,
}

impl CasePipelineWorld {
    /// Creates a world backed by an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let service = BoardService::new(
            Arc::new(InMemoryCaseRepository::new()),
            Arc::new(DefaultClock),
        );

        Self {
            service,
            current_case: None,
            last_move_result: None,
            last_drop_result: None,
        }
    }

    /// Returns the identifier of the case created by the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error when no case has been created yet.
    pub fn case_id(&self) -> Result<CaseId, eyre::Report> {
        self.current_case
            .clone()
            .ok_or_else(|| eyre::eyre!("missing created case in scenario world"))
    }

    /// Returns the board's current view of the scenario case.
    ///
    /// # Errors
    ///
    /// Returns an error when the case is not on the board.
    pub fn case_on_board(&self) -> Result<Case, eyre::Report> {
        let id = self.case_id()?;
        self.service
            .snapshot()
            .find(&id)
            .cloned()
            .ok_or_else(|| eyre::eyre!("case {id} is not on the board"))
    }
}

impl Default for CasePipelineWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> CasePipelineWorld {
    CasePipelineWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
