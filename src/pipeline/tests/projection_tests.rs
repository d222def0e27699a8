//! Unit tests for the board projection and its read models.

use super::support::{case_in, reais};
use crate::pipeline::board::{BoardProjection, due_follow_ups, matches_query, operator_summaries};
use crate::pipeline::domain::{Case, ColumnLabels, Stage};
use chrono::{Duration, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::collections::BTreeSet;

#[fixture]
fn mixed_cases() -> Vec<Case> {
    vec![
        case_in("Ana", "111.222.333-44", Stage::Unlock),
        case_in("Bruno", "22233344455", Stage::ContractPending),
        case_in("Carla", "33344455566", Stage::Unlock),
        case_in("Diego", "44455566677", Stage::Cancelled),
        case_in("Elisa", "55566677788", Stage::Done),
    ]
}

#[rstest]
fn projection_always_has_six_columns() {
    let projection = BoardProjection::project(&[]);

    let stages: Vec<Stage> = projection.iter().map(|(stage, _)| stage).collect();
    assert_eq!(stages, Stage::ALL.to_vec());
    assert!(projection.is_empty());
}

#[rstest]
fn projection_partitions_and_concat_recovers_the_set(mixed_cases: Vec<Case>) {
    let projection = BoardProjection::project(&mixed_cases);

    for (stage, column) in projection.iter() {
        assert!(column.iter().all(|case| case.stage() == stage));
    }
    let recovered: BTreeSet<_> = projection
        .concat()
        .iter()
        .map(|case| case.id().clone())
        .collect();
    let original: BTreeSet<_> = mixed_cases.iter().map(|case| case.id().clone()).collect();
    assert_eq!(recovered, original);
    assert_eq!(projection.len(), mixed_cases.len());
}

#[rstest]
fn projection_keeps_source_order_within_a_column(mixed_cases: Vec<Case>) {
    let projection = BoardProjection::project(&mixed_cases);

    let names: Vec<&str> = projection
        .column(Stage::Unlock)
        .iter()
        .map(Case::name)
        .collect();
    assert_eq!(names, ["Ana", "Carla"]);
}

#[rstest]
fn projection_is_idempotent_and_leaves_input_untouched(mixed_cases: Vec<Case>) {
    let before = mixed_cases.clone();

    let first = BoardProjection::project(&mixed_cases);
    let second = BoardProjection::project(&mixed_cases);

    assert_eq!(first, second);
    assert_eq!(mixed_cases, before);
}

#[rstest]
#[case("ana", &["Ana"])]
#[case("AR", &["Carla"])]
#[case("111222", &["Ana"])]
#[case("333.444", &["Bruno", "Carla"])]
#[case("", &["Bruno", "Ana", "Carla", "Elisa", "Diego"])]
#[case("zzz", &[])]
fn filter_matches_name_or_tax_digits(
    mixed_cases: Vec<Case>,
    #[case] query: &str,
    #[case] expected: &[&str],
) {
    let filtered = BoardProjection::project(&mixed_cases).filter(query);

    let concatenated = filtered.concat();
    let names: Vec<&str> = concatenated.iter().map(Case::name).collect();
    assert_eq!(names, expected);
}

#[rstest]
fn punctuation_only_query_matches_no_tax_id() {
    let case = case_in("Ana", "11122233344", Stage::Unlock);

    assert!(!matches_query(&case, "..."));
}

#[rstest]
fn summaries_count_and_total_each_column() {
    let clock = DefaultClock;
    let mut first = case_in("Ana", "1", Stage::Payment);
    first.set_contracted_amount(reais(150_000), &clock);
    let mut second = case_in("Bruno", "2", Stage::Payment);
    second.set_contracted_amount(reais(50_050), &clock);
    let mut labels = ColumnLabels::default();
    labels.set_label(Stage::Payment, "Aguardando pagamento");

    let summaries = BoardProjection::project(&[first, second]).summaries(&labels);

    assert_eq!(summaries.len(), 6);
    let payment = summaries
        .iter()
        .find(|summary| summary.stage == Stage::Payment)
        .expect("payment column");
    assert_eq!(payment.label, "Aguardando pagamento");
    assert_eq!(payment.count, 2);
    assert_eq!(payment.total_amount, reais(200_050));
    let unlock = summaries
        .iter()
        .find(|summary| summary.stage == Stage::Unlock)
        .expect("unlock column");
    assert_eq!(unlock.label, "Desbloqueio");
    assert_eq!(unlock.count, 0);
}

#[rstest]
fn operator_summaries_split_active_from_total() {
    let clock = DefaultClock;
    let mut open = case_in("Ana", "1", Stage::Unlock);
    open.set_assigned_operator("Bruna", &clock);
    open.set_contracted_amount(reais(100_000), &clock);
    let mut done = case_in("Bruno", "2", Stage::Done);
    done.set_assigned_operator("Bruna", &clock);
    done.set_contracted_amount(reais(20_000), &clock);
    let unassigned = case_in("Carla", "3", Stage::Payment);

    let summaries = operator_summaries(&[open, done, unassigned]);

    assert_eq!(summaries.len(), 2);
    let bruna = summaries
        .iter()
        .find(|summary| summary.operator == "Bruna")
        .expect("Bruna's summary");
    assert_eq!(bruna.active_cases, 1);
    assert_eq!(bruna.total_cases, 2);
    assert_eq!(bruna.total_amount, reais(120_000));
    assert!(summaries.iter().any(|summary| summary.operator.is_empty()));
}

#[rstest]
fn due_follow_ups_skip_future_and_terminal_cases() {
    let clock = DefaultClock;
    let now = Utc::now();
    let mut overdue = case_in("Ana", "1", Stage::Unlock);
    overdue.set_follow_up_at(Some(now - Duration::days(2)), &clock);
    let mut due_today = case_in("Bruno", "2", Stage::Payment);
    due_today.set_follow_up_at(Some(now - Duration::hours(1)), &clock);
    let mut later = case_in("Carla", "3", Stage::Unlock);
    later.set_follow_up_at(Some(now + Duration::days(1)), &clock);
    let mut closed = case_in("Diego", "4", Stage::Done);
    closed.set_follow_up_at(Some(now - Duration::days(5)), &clock);
    let cases = [due_today, later, closed, overdue];

    let due: Vec<&str> = due_follow_ups(&cases, now).into_iter().map(Case::name).collect();

    assert_eq!(due, ["Ana", "Bruno"]);
}
