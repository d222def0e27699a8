//! In-memory integration tests for boards sharing one case store.

use super::helpers::{open_case, repo, service_over};
use esteira::pipeline::{
    adapters::memory::InMemoryCaseRepository,
    domain::Stage,
    ports::CaseRepository,
};
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_picks_up_changes_made_by_another_board(repo: Arc<InMemoryCaseRepository>) {
    let first = service_over(&repo);
    let second = service_over(&repo);
    let ana = open_case(&first, "Ana", "11122233344", "0").await;

    second.refresh().await.expect("refresh second board");
    second.cancel(ana.id()).await.expect("cancel on second board");
    let before = first.snapshot();
    let after = first.refresh().await.expect("refresh first board");

    assert_eq!(
        before.find(ana.id()).map(|case| case.stage()),
        Some(Stage::ContractPending)
    );
    assert_eq!(
        after.find(ana.id()).map(|case| case.stage()),
        Some(Stage::Cancelled)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cases_deleted_elsewhere_disappear_on_refresh(repo: Arc<InMemoryCaseRepository>) {
    let board = service_over(&repo);
    let ana = open_case(&board, "Ana", "11122233344", "0").await;
    let bruno = open_case(&board, "Bruno", "22233344455", "0").await;

    repo.delete_case(ana.id()).await.expect("delete behind the board");
    let refreshed = board.refresh().await.expect("refresh");

    assert_eq!(refreshed.cases, vec![bruno]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moves_on_a_stale_board_still_target_the_stored_case(repo: Arc<InMemoryCaseRepository>) {
    let board = service_over(&repo);
    let ana = open_case(&board, "Ana", "11122233344", "0").await;
    let other = service_over(&repo);

    let moved = other.advance(ana.id()).await.expect("advance unseen case");

    assert_eq!(moved.stage(), Stage::Unlock);
    let stored = repo
        .find_by_id(ana.id())
        .await
        .expect("lookup")
        .expect("stored case");
    assert_eq!(stored.stage(), Stage::Unlock);
}
