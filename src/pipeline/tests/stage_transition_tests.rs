//! Unit tests for stage parsing and the stage state machine.

use super::support::{case_in, reais};
use crate::pipeline::domain::{Case, NewCase, ParseStageError, Stage};
use eyre::ensure;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

#[rstest]
#[case("CONTRACT_PENDING", Stage::ContractPending)]
#[case("unlock", Stage::Unlock)]
#[case(" Value_Release ", Stage::ValueRelease)]
#[case("PAYMENT", Stage::Payment)]
#[case("DONE", Stage::Done)]
#[case("CANCELLED", Stage::Cancelled)]
#[case("CONTRATO_PENDENTE", Stage::ContractPending)]
#[case("DESBLOQUEIO", Stage::Unlock)]
#[case("LIBERACAO_VALOR", Stage::ValueRelease)]
#[case("PAGAMENTO", Stage::Payment)]
#[case("CONCLUIDO", Stage::Done)]
#[case("cancelado", Stage::Cancelled)]
fn stage_parses_canonical_and_legacy_names(#[case] raw: &str, #[case] expected: Stage) {
    assert_eq!(Stage::try_from(raw), Ok(expected));
}

#[rstest]
#[case("ARCHIVED")]
#[case("")]
#[case("DONE_")]
fn stage_rejects_unknown_names(#[case] raw: &str) {
    assert_eq!(Stage::try_from(raw), Err(ParseStageError(raw.to_owned())));
}

#[rstest]
fn stage_round_trips_through_its_storage_name() {
    for stage in Stage::ALL {
        assert_eq!(stage.as_str().parse::<Stage>(), Ok(stage));
    }
}

#[rstest]
fn new_case_starts_pending_without_documents(clock: DefaultClock) {
    let case = Case::new(
        NewCase {
            name: "  Ana  ".to_owned(),
            tax_id: "11122233344".to_owned(),
            contracted_amount: reais(150_000),
            assigned_operator: "Bruna".to_owned(),
        },
        &clock,
    )
    .expect("valid case");

    assert_eq!(case.name(), "Ana");
    assert_eq!(case.stage(), Stage::ContractPending);
    assert!(case.attached_documents().is_empty());
    assert_eq!(case.stage_entered_at(), case.created_at());
    assert_eq!(case.created_at(), case.updated_at());
}

#[rstest]
fn advancing_five_times_reaches_done_and_stops(clock: DefaultClock) -> eyre::Result<()> {
    let mut case = case_in("Ana", "11122233344", Stage::ContractPending);
    let expected = [
        Stage::Unlock,
        Stage::ValueRelease,
        Stage::Payment,
        Stage::Done,
    ];

    for stage in expected {
        ensure!(case.advance(&clock), "advance from non-terminal stage");
        ensure!(case.stage() == stage, "expected {stage}, got {}", case.stage());
    }
    let before = case.clone();
    ensure!(!case.advance(&clock), "advance from DONE must be a no-op");
    ensure!(case == before, "case must be unchanged");
    Ok(())
}

#[rstest]
fn advance_never_enters_cancelled() {
    for stage in Stage::ALL {
        assert_ne!(stage.next(), Some(Stage::Cancelled));
    }
}

#[rstest]
#[case(Stage::Done)]
#[case(Stage::Cancelled)]
fn terminal_stages_ignore_advance_and_cancel(#[case] terminal: Stage, clock: DefaultClock) {
    let mut case = case_in("Ana", "11122233344", terminal);
    let before = case.clone();

    assert!(!case.advance(&clock));
    assert!(!case.cancel(&clock));
    assert_eq!(case, before);
}

#[rstest]
#[case(Stage::ContractPending)]
#[case(Stage::Unlock)]
#[case(Stage::ValueRelease)]
#[case(Stage::Payment)]
fn cancel_exits_any_open_stage(#[case] open: Stage, clock: DefaultClock) {
    let mut case = case_in("Ana", "11122233344", open);

    assert!(case.cancel(&clock));
    assert_eq!(case.stage(), Stage::Cancelled);
}

#[rstest]
fn move_to_then_move_to_yields_the_last_target(clock: DefaultClock) {
    for first in Stage::ALL {
        for second in Stage::ALL {
            let mut case = case_in("Ana", "11122233344", Stage::Payment);
            case.move_to(first, &clock);
            case.move_to(second, &clock);
            assert_eq!(case.stage(), second, "move to {first} then {second}");
        }
    }
}

#[rstest]
fn move_to_reopens_terminal_cases(clock: DefaultClock) {
    let mut case = case_in("Ana", "11122233344", Stage::Cancelled);

    assert!(case.move_to(Stage::Unlock, &clock));
    assert_eq!(case.stage(), Stage::Unlock);
}

#[rstest]
fn move_to_current_stage_reports_no_change(clock: DefaultClock) {
    let mut case = case_in("Ana", "11122233344", Stage::Unlock);
    let before = case.clone();

    assert!(!case.move_to(Stage::Unlock, &clock));
    assert_eq!(case, before);
}

#[rstest]
fn stage_change_refreshes_stage_entry_time(clock: DefaultClock) {
    let mut case = case_in("Ana", "11122233344", Stage::ContractPending);
    let created_at = case.created_at();

    case.advance(&clock);

    assert!(case.stage_entered_at() >= created_at);
    assert_eq!(case.stage_entered_at(), case.updated_at());
    assert_eq!(case.created_at(), created_at);
}

#[rstest]
fn ana_walkthrough_ends_cancelled(clock: DefaultClock) {
    let mut case = Case::new(
        NewCase {
            name: "Ana".to_owned(),
            tax_id: "11122233344".to_owned(),
            contracted_amount: reais(150_000),
            assigned_operator: "Bruna".to_owned(),
        },
        &clock,
    )
    .expect("valid case");

    case.advance(&clock);
    assert_eq!(case.stage(), Stage::Unlock);
    case.move_to(Stage::Cancelled, &clock);
    case.advance(&clock);

    assert_eq!(case.stage(), Stage::Cancelled);
}
