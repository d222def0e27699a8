//! Shared test helpers for in-memory repository integration tests.

use esteira::pipeline::{
    adapters::memory::InMemoryCaseRepository,
    domain::{Case, ContractedAmount},
    services::{BoardService, CreateCaseRequest},
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Board service type used by the integration tests.
pub type TestService = BoardService<InMemoryCaseRepository, DefaultClock>;

/// Provides a fresh in-memory repository for each test.
#[fixture]
pub fn repo() -> Arc<InMemoryCaseRepository> {
    Arc::new(InMemoryCaseRepository::new())
}

/// Builds a board service over `repo`.
pub fn service_over(repo: &Arc<InMemoryCaseRepository>) -> TestService {
    BoardService::new(Arc::clone(repo), Arc::new(DefaultClock))
}

/// Provides a board service over its own empty store.
#[fixture]
pub fn service() -> TestService {
    service_over(&repo())
}

/// Parses a pt-BR amount, panicking on malformed test input.
///
/// # Panics
///
/// Panics when `text` is not a valid amount.
#[must_use]
pub fn amount(text: &str) -> ContractedAmount {
    ContractedAmount::parse_locale(text).expect("valid test amount")
}

/// Opens a case through the service.
///
/// # Panics
///
/// Panics when the case cannot be created.
pub async fn open_case(service: &TestService, name: &str, tax_id: &str, value: &str) -> Case {
    let request = CreateCaseRequest::new(name, tax_id)
        .with_contracted_amount(amount(value))
        .with_assigned_operator("Bruna");
    service.create_case(request).await.expect("create case")
}
