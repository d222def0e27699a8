//! Then steps for case pipeline BDD scenarios.

use super::world::CasePipelineWorld;
use esteira::pipeline::{
    domain::Stage,
    services::{BoardError, DropOutcome},
};
use rstest_bdd_macros::then;

#[then(r#"the case is in stage "{stage}""#)]
fn case_is_in_stage(world: &CasePipelineWorld, stage: String) -> Result<(), eyre::Report> {
    let expected_stage: Stage = stage
        .parse()
        .map_err(|err| eyre::eyre!("invalid expected stage in scenario: {err}"))?;

    let case = world.case_on_board()?;
    eyre::ensure!(
        case.stage() == expected_stage,
        "expected stage {expected_stage}, found {}",
        case.stage()
    );
    eyre::ensure!(
        !world.service.snapshot().is_pending(case.id()),
        "case {} still has a change in flight",
        case.id()
    );
    Ok(())
}

#[then("the case has no attached documents")]
fn case_has_no_documents(world: &CasePipelineWorld) -> Result<(), eyre::Report> {
    let case = world.case_on_board()?;
    eyre::ensure!(
        case.attached_documents().is_empty(),
        "expected no documents, found {:?}",
        case.attached_documents()
    );
    Ok(())
}

#[then("the drop moved the case")]
fn drop_moved_case(world: &CasePipelineWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_drop_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing drop result"))?;

    if !matches!(result, Ok(DropOutcome::Moved(_))) {
        return Err(eyre::eyre!("expected a moved case, got {result:?}"));
    }
    Ok(())
}

#[then("the drop is ignored")]
fn drop_is_ignored(world: &CasePipelineWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_drop_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing drop result"))?;

    if !matches!(result, Ok(DropOutcome::Ignored(_))) {
        return Err(eyre::eyre!("expected an ignored drop, got {result:?}"));
    }
    Ok(())
}

#[then("the move fails with an invalid stage error")]
fn move_fails_with_invalid_stage(world: &CasePipelineWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_move_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing move result"))?;

    if !matches!(result, Err(BoardError::InvalidStage(_))) {
        return Err(eyre::eyre!("expected InvalidStage error, got {result:?}"));
    }
    Ok(())
}
