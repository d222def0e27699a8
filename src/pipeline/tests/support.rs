//! Builders shared by pipeline unit tests.

use crate::pipeline::domain::{Case, ContractedAmount, NewCase, Stage};
use mockable::DefaultClock;
use rust_decimal::Decimal;

/// Opens a case and moves it straight to `stage`.
pub(super) fn case_in(name: &str, tax_id: &str, stage: Stage) -> Case {
    let mut case = Case::new(
        NewCase {
            name: name.to_owned(),
            tax_id: tax_id.to_owned(),
            contracted_amount: ContractedAmount::ZERO,
            assigned_operator: String::new(),
        },
        &DefaultClock,
    )
    .expect("valid case");
    case.move_to(stage, &DefaultClock);
    case
}

/// Builds an amount from integer cents.
pub(super) fn reais(cents: i64) -> ContractedAmount {
    ContractedAmount::new(Decimal::new(cents, 2)).expect("non-negative amount")
}
