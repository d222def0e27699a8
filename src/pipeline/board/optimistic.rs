//! Confirmed case list with tentative changes layered on top.

use crate::pipeline::domain::{Case, CaseId};
use std::collections::{BTreeMap, BTreeSet};

/// Two-phase board state.
///
/// The confirmed list mirrors what the store last acknowledged, newest
/// first. A tentative change replaces a confirmed case in [`Self::view`]
/// until it is confirmed or rolled back. At most one tentative change exists
/// per case.
///
/// Every change the store acknowledges is counted, so a reload can tell
/// whether the list it read was overtaken while the read was in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimisticBoard {
    confirmed: Vec<Case>,
    tentative: BTreeMap<CaseId, Case>,
    revision: u64,
    confirmations: u64,
}

impl OptimisticBoard {
    /// Creates an empty board.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            confirmed: Vec::new(),
            tentative: BTreeMap::new(),
            revision: 0,
            confirmations: 0,
        }
    }

    /// Replaces the confirmed list with a fresh read from the store.
    ///
    /// Tentative changes still in flight are kept.
    pub fn replace_confirmed(&mut self, cases: Vec<Case>) {
        self.confirmed = cases;
        self.bump();
    }

    /// Replaces the confirmed list with `cases` unless a store-acknowledged
    /// change was applied after `seen` was taken from
    /// [`Self::confirmations`].
    ///
    /// Returns `false`, leaving the board untouched, when the read is stale.
    pub fn replace_confirmed_since(&mut self, cases: Vec<Case>, seen: u64) -> bool {
        if self.confirmations != seen {
            return false;
        }
        self.replace_confirmed(cases);
        true
    }

    /// Records a tentative change, replacing any earlier one for the case.
    pub fn begin(&mut self, tentative: Case) {
        self.tentative.insert(tentative.id().clone(), tentative);
        self.bump();
    }

    /// Promotes the store-acknowledged `case` to confirmed state and clears
    /// its tentative change.
    ///
    /// A case missing from the confirmed list is inserted at the front.
    pub fn confirm(&mut self, case: Case) {
        self.tentative.remove(case.id());
        let position = self
            .confirmed
            .iter()
            .position(|existing| existing.id() == case.id());
        if let Some(stale) = position {
            self.confirmed.remove(stale);
        }
        self.confirmed.insert(position.unwrap_or(0), case);
        self.acknowledge();
    }

    /// Discards the tentative change for `id`, returning it.
    pub fn rollback(&mut self, id: &CaseId) -> Option<Case> {
        let discarded = self.tentative.remove(id);
        if discarded.is_some() {
            self.bump();
        }
        discarded
    }

    /// Adds a newly stored case at the front of the confirmed list.
    pub fn insert_confirmed(&mut self, case: Case) {
        self.confirmed.insert(0, case);
        self.acknowledge();
    }

    /// Removes a case the store has deleted, returning it.
    pub fn remove_confirmed(&mut self, id: &CaseId) -> Option<Case> {
        self.confirmations = self.confirmations.wrapping_add(1);
        self.tentative.remove(id);
        let position = self
            .confirmed
            .iter()
            .position(|existing| existing.id() == id)?;
        self.bump();
        Some(self.confirmed.remove(position))
    }

    /// Returns the list as the board should render it: confirmed cases with
    /// tentative changes applied.
    #[must_use]
    pub fn view(&self) -> Vec<Case> {
        self.confirmed
            .iter()
            .map(|confirmed| {
                self.tentative
                    .get(confirmed.id())
                    .unwrap_or(confirmed)
                    .clone()
            })
            .collect()
    }

    /// Returns the confirmed list.
    #[must_use]
    pub fn confirmed(&self) -> &[Case] {
        &self.confirmed
    }

    /// Finds a case in the rendered view.
    #[must_use]
    pub fn find(&self, id: &CaseId) -> Option<&Case> {
        self.tentative.get(id).or_else(|| {
            self.confirmed
                .iter()
                .find(|confirmed| confirmed.id() == id)
        })
    }

    /// Returns `true` while a tentative change for `id` awaits the store.
    #[must_use]
    pub fn is_pending(&self, id: &CaseId) -> bool {
        self.tentative.contains_key(id)
    }

    /// Returns the ids of cases with tentative changes.
    #[must_use]
    pub fn pending_ids(&self) -> BTreeSet<CaseId> {
        self.tentative.keys().cloned().collect()
    }

    /// Returns a counter incremented on every change.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns how many store-acknowledged changes have been applied.
    #[must_use]
    pub const fn confirmations(&self) -> u64 {
        self.confirmations
    }

    const fn acknowledge(&mut self) {
        self.confirmations = self.confirmations.wrapping_add(1);
        self.bump();
    }

    const fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
