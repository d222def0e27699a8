//! Session-owned board state with snapshot publication.

use super::{BoardProjection, OptimisticBoard};
use crate::pipeline::domain::{Case, CaseId};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{OwnedMutexGuard, watch};

/// Immutable copy of the board handed to renderers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    /// Cases as rendered, tentative changes applied, newest first.
    pub cases: Vec<Case>,
    /// Cases whose tentative change awaits the store.
    pub pending: BTreeSet<CaseId>,
    /// Board revision the snapshot was taken at.
    pub revision: u64,
    /// Transient message describing the latest failed mutation.
    pub last_error: Option<String>,
}

impl BoardSnapshot {
    /// Groups the snapshot's cases into columns.
    #[must_use]
    pub fn project(&self) -> BoardProjection {
        BoardProjection::project(&self.cases)
    }

    /// Returns `true` when the case is drawn from a tentative change.
    #[must_use]
    pub fn is_pending(&self, id: &CaseId) -> bool {
        self.pending.contains(id)
    }

    /// Finds a case by identifier.
    #[must_use]
    pub fn find(&self, id: &CaseId) -> Option<&Case> {
        self.cases.iter().find(|case| case.id() == id)
    }
}

#[derive(Debug, Default)]
struct StoreState {
    board: OptimisticBoard,
    last_error: Option<String>,
}

impl StoreState {
    fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            cases: self.board.view(),
            pending: self.board.pending_ids(),
            revision: self.board.revision(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Sole owner of the board's case list for one session.
///
/// Every change publishes a fresh [`BoardSnapshot`] to subscribers. Callers
/// mutating a case hold its lock from [`BoardStore::lock_case`] so that
/// changes to the same case apply one after another.
#[derive(Debug)]
pub struct BoardStore {
    state: Mutex<StoreState>,
    publisher: watch::Sender<BoardSnapshot>,
    case_locks: Mutex<HashMap<CaseId, Arc<tokio::sync::Mutex<()>>>>,
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (publisher, _) = watch::channel(BoardSnapshot::default());
        Self {
            state: Mutex::new(StoreState::default()),
            publisher,
            case_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribes to snapshot publications.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.publisher.subscribe()
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        self.lock_state().snapshot()
    }

    /// Returns a case as currently rendered.
    #[must_use]
    pub fn find(&self, id: &CaseId) -> Option<Case> {
        self.lock_state().board.find(id).cloned()
    }

    /// Returns the board's count of store-acknowledged changes.
    #[must_use]
    pub fn confirmations(&self) -> u64 {
        self.lock_state().board.confirmations()
    }

    /// Applies `change` to the board and publishes the result.
    pub fn update<T>(&self, change: impl FnOnce(&mut OptimisticBoard) -> T) -> T {
        let mut state = self.lock_state();
        let output = change(&mut state.board);
        self.publisher.send_replace(state.snapshot());
        output
    }

    /// Sets or clears the transient failure message and publishes it.
    pub fn set_last_error(&self, message: Option<String>) {
        let mut state = self.lock_state();
        if state.last_error == message {
            return;
        }
        state.last_error = message;
        self.publisher.send_replace(state.snapshot());
    }

    /// Waits for exclusive access to mutate one case.
    pub async fn lock_case(&self, id: &CaseId) -> OwnedMutexGuard<()> {
        let case_lock = {
            let mut locks = self
                .case_locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(id.clone()).or_default())
        };
        case_lock.lock_owned().await
    }

    /// Drops the lock entry of a deleted case.
    pub fn forget_case(&self, id: &CaseId) {
        self.case_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
