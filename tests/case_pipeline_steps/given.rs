//! Given steps for case pipeline BDD scenarios.

use super::world::{CasePipelineWorld, run_async};
use esteira::pipeline::{domain::ContractedAmount, services::CreateCaseRequest};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a case for "{name}" with tax id "{tax_id}" worth "{amount}" handled by "{operator}""#)]
fn case_exists(
    world: &mut CasePipelineWorld,
    name: String,
    tax_id: String,
    amount: String,
    operator: String,
) -> Result<(), eyre::Report> {
    let contracted_amount = ContractedAmount::parse_locale(&amount)
        .map_err(|err| eyre::eyre!("invalid amount in scenario: {err}"))?;
    let request = CreateCaseRequest::new(name, tax_id)
        .with_contracted_amount(contracted_amount)
        .with_assigned_operator(operator);

    let created = run_async(world.service.create_case(request))
        .wrap_err("create case for pipeline scenario")?;
    world.current_case = Some(created.id().clone());
    Ok(())
}
