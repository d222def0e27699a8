//! In-memory integration tests for the board lifecycle.

use super::helpers::{TestService, amount, open_case, service};
use esteira::pipeline::{
    board::operator_summaries,
    domain::{CaseEdit, ColumnLabels, Stage},
    services::{DropEvent, DropOutcome, IgnoredDrop},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cards_dropped_across_columns_update_column_totals(service: TestService) {
    let ana = open_case(&service, "Ana", "11122233344", "1.500,00").await;
    let bruno = open_case(&service, "Bruno", "22233344455", "500").await;
    open_case(&service, "Carla", "33344455566", "250,50").await;

    service
        .drop_card(&DropEvent::new(ana.id().clone(), "CONTRACT_PENDING", "PAYMENT"))
        .await
        .expect("drop Ana");
    service
        .drop_card(&DropEvent::new(bruno.id().clone(), "CONTRACT_PENDING", "PAYMENT"))
        .await
        .expect("drop Bruno");

    let summaries = service
        .snapshot()
        .project()
        .summaries(&ColumnLabels::default());
    let payment = summaries
        .iter()
        .find(|summary| summary.stage == Stage::Payment)
        .expect("payment column");
    let pending = summaries
        .iter()
        .find(|summary| summary.stage == Stage::ContractPending)
        .expect("contract pending column");
    assert_eq!(payment.count, 2);
    assert_eq!(payment.total_amount, amount("2.000"));
    assert_eq!(pending.count, 1);
    assert_eq!(pending.total_amount, amount("250,50"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn drops_outside_any_column_or_onto_the_current_stage_are_ignored(service: TestService) {
    let ana = open_case(&service, "Ana", "11122233344", "0").await;
    let revision = service.snapshot().revision;

    let outside = service
        .drop_card(&DropEvent::outside(ana.id().clone(), "CONTRACT_PENDING"))
        .await
        .expect("outside drop");
    let legacy_name = service
        .drop_card(&DropEvent::new(
            ana.id().clone(),
            "CONTRACT_PENDING",
            "CONTRATO_PENDENTE",
        ))
        .await
        .expect("same stage under its legacy name");

    assert_eq!(outside, DropOutcome::Ignored(IgnoredDrop::OutsideColumns));
    assert_eq!(legacy_name, DropOutcome::Ignored(IgnoredDrop::SameColumn));
    assert_eq!(service.snapshot().revision, revision);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_finds_cases_by_formatted_tax_id(service: TestService) {
    open_case(&service, "Ana", "111.222.333-44", "0").await;
    open_case(&service, "Bruno", "22233344455", "0").await;

    let filtered = service.snapshot().project().filter("222.333");

    let names: Vec<String> = filtered
        .concat()
        .iter()
        .map(|case| case.name().to_owned())
        .collect();
    assert_eq!(names, ["Bruno", "Ana"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reassigned_cases_move_between_operator_summaries(service: TestService) {
    let ana = open_case(&service, "Ana", "11122233344", "1.000").await;
    open_case(&service, "Bruno", "22233344455", "300").await;

    service
        .update_fields(ana.id(), &CaseEdit::new().with_assigned_operator("Carla"))
        .await
        .expect("reassign Ana");
    service.advance(ana.id()).await.expect("advance Ana");

    let snapshot = service.snapshot();
    let summaries = operator_summaries(&snapshot.cases);
    let operators: Vec<&str> = summaries
        .iter()
        .map(|summary| summary.operator.as_str())
        .collect();
    assert_eq!(operators, ["Bruna", "Carla"]);
    let carla = summaries.last().expect("Carla's summary");
    assert_eq!(carla.active_cases, 1);
    assert_eq!(carla.total_amount, amount("1.000"));
}
