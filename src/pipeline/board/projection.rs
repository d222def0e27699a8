//! Per-column grouping of cases.

use crate::pipeline::domain::{Case, ColumnLabels, ContractedAmount, Stage};
use std::collections::BTreeMap;

/// Cases grouped by stage, one column per stage.
///
/// Every stage has a column, possibly empty. Within a column cases keep the
/// relative order of the list they were projected from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardProjection {
    columns: BTreeMap<Stage, Vec<Case>>,
}

/// Header figures for one board column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSummary {
    /// Column stage.
    pub stage: Stage,
    /// Column heading.
    pub label: String,
    /// Number of cards in the column.
    pub count: usize,
    /// Sum of the contracted amounts of the column's cards.
    pub total_amount: ContractedAmount,
}

impl BoardProjection {
    /// Groups `cases` by stage without modifying the input.
    #[must_use]
    pub fn project(cases: &[Case]) -> Self {
        let mut columns: BTreeMap<Stage, Vec<Case>> = Stage::ALL
            .into_iter()
            .map(|stage| (stage, Vec::new()))
            .collect();
        for case in cases {
            columns.entry(case.stage()).or_default().push(case.clone());
        }
        Self { columns }
    }

    /// Returns the cards in a column.
    #[must_use]
    pub fn column(&self, stage: Stage) -> &[Case] {
        self.columns
            .get(&stage)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterates columns left to right.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, &[Case])> {
        self.columns
            .iter()
            .map(|(stage, cases)| (*stage, cases.as_slice()))
    }

    /// Concatenates the columns in stage order.
    #[must_use]
    pub fn concat(&self) -> Vec<Case> {
        self.columns.values().flatten().cloned().collect()
    }

    /// Total number of cards on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    /// Returns `true` when no column holds a card.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.values().all(Vec::is_empty)
    }

    /// Keeps only the cards matching `query`; see [`matches_query`].
    #[must_use]
    pub fn filter(&self, query: &str) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|(stage, cases)| {
                let kept = cases
                    .iter()
                    .filter(|case| matches_query(case, query))
                    .cloned()
                    .collect();
                (*stage, kept)
            })
            .collect();
        Self { columns }
    }

    /// Computes the header figures of every column.
    #[must_use]
    pub fn summaries(&self, labels: &ColumnLabels) -> Vec<ColumnSummary> {
        self.iter()
            .map(|(stage, cases)| ColumnSummary {
                stage,
                label: labels.label(stage).to_owned(),
                count: cases.len(),
                total_amount: cases
                    .iter()
                    .map(Case::contracted_amount)
                    .fold(ContractedAmount::ZERO, ContractedAmount::saturating_add),
            })
            .collect()
    }
}

/// Returns `true` when `case` matches a board search.
///
/// The name matches on a case-insensitive substring. The tax id matches when
/// the query contains digits and they appear, in order, as a substring of
/// the tax id's digits, so `111.222` finds `11122233344`. A blank query
/// matches everything.
#[must_use]
pub fn matches_query(case: &Case, query: &str) -> bool {
    let needle = query.trim();
    if needle.is_empty() {
        return true;
    }
    if case.name().to_lowercase().contains(&needle.to_lowercase()) {
        return true;
    }

    let digits: String = needle.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return false;
    }
    let tax_digits: String = case.tax_id().chars().filter(char::is_ascii_digit).collect();
    tax_digits.contains(&digits)
}
