//! When steps for case pipeline BDD scenarios.

use super::world::{CasePipelineWorld, run_async};
use esteira::pipeline::services::DropEvent;
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when("the case is advanced")]
fn case_is_advanced(world: &mut CasePipelineWorld) -> Result<(), eyre::Report> {
    let id = world.case_id()?;
    run_async(world.service.advance(&id)).wrap_err("advance case")?;
    Ok(())
}

#[when("the case is advanced {times:u32} times")]
fn case_is_advanced_repeatedly(
    world: &mut CasePipelineWorld,
    times: u32,
) -> Result<(), eyre::Report> {
    let id = world.case_id()?;
    for _ in 0..times {
        run_async(world.service.advance(&id)).wrap_err("advance case")?;
    }
    Ok(())
}

#[when(r#"the case is moved to "{target}""#)]
fn case_is_moved(world: &mut CasePipelineWorld, target: String) -> Result<(), eyre::Report> {
    let id = world.case_id()?;
    let result = run_async(world.service.move_to(&id, &target));
    world.last_move_result = Some(result);
    Ok(())
}

#[when(r#"the card is dropped from "{source}" onto "{target}""#)]
fn card_is_dropped(
    world: &mut CasePipelineWorld,
    source: String,
    target: String,
) -> Result<(), eyre::Report> {
    let id = world.case_id()?;
    let event = DropEvent::new(id, source, target);
    let result = run_async(world.service.drop_card(&event));
    world.last_drop_result = Some(result);
    Ok(())
}
