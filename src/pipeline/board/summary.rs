//! Operator workload and follow-up read models.

use crate::pipeline::domain::{Case, ContractedAmount};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Workload of one handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorSummary {
    /// Handler name, empty for unassigned cases.
    pub operator: String,
    /// Cases not yet done or cancelled.
    pub active_cases: usize,
    /// All cases assigned to the handler.
    pub total_cases: usize,
    /// Sum of contracted amounts over all assigned cases.
    pub total_amount: ContractedAmount,
}

/// Summarizes cases per assigned handler, ordered by handler name.
#[must_use]
pub fn operator_summaries(cases: &[Case]) -> Vec<OperatorSummary> {
    let mut by_operator: BTreeMap<&str, OperatorSummary> = BTreeMap::new();
    for case in cases {
        let summary = by_operator
            .entry(case.assigned_operator())
            .or_insert_with(|| OperatorSummary {
                operator: case.assigned_operator().to_owned(),
                active_cases: 0,
                total_cases: 0,
                total_amount: ContractedAmount::ZERO,
            });
        summary.total_cases += 1;
        if !case.stage().is_terminal() {
            summary.active_cases += 1;
        }
        summary.total_amount = summary
            .total_amount
            .saturating_add(case.contracted_amount());
    }
    by_operator.into_values().collect()
}

/// Returns open cases whose follow-up reminder is due at `now`, oldest
/// reminder first.
#[must_use]
pub fn due_follow_ups(cases: &[Case], now: DateTime<Utc>) -> Vec<&Case> {
    let mut due: Vec<&Case> = cases
        .iter()
        .filter(|case| !case.stage().is_terminal())
        .filter(|case| case.follow_up_at().is_some_and(|at| at <= now))
        .collect();
    due.sort_by_key(|case| case.follow_up_at());
    due
}
