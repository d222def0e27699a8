//! Serialized layout of the board snapshot file.
//!
//! The layout accepts documents written by the earlier browser front-end
//! (`cols`, `clientes`, `nome`, `cpf`, `status`, `documentos`) and backfills
//! fields that did not exist yet.

use crate::pipeline::domain::{
    Case, CaseId, ColorTag, ColumnLabels, ContractedAmount, PersistedCaseData, Stage,
};
use crate::pipeline::ports::{CaseRepositoryError, CaseRepositoryResult};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whole-board document stored in the snapshot file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SnapshotDocument {
    #[serde(default, alias = "cols")]
    pub column_labels: BTreeMap<String, String>,
    #[serde(default, alias = "clientes")]
    pub cases: Vec<SnapshotCase>,
}

/// One case as stored in the snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SnapshotCase {
    pub id: String,
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(default, alias = "cpf")]
    pub tax_id: String,
    #[serde(alias = "status")]
    pub stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contracted_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_tag: Option<String>,
    #[serde(default, alias = "documentos", skip_serializing_if = "Option::is_none")]
    pub attached_documents: Option<Vec<String>>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub follow_up_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub stage_entered_at: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SnapshotDocument {
    /// Creates an empty board with default column labels.
    pub fn empty(labels: &ColumnLabels) -> Self {
        Self {
            column_labels: labels_to_document(labels),
            cases: Vec::new(),
        }
    }

    /// Creates a board with two demonstration cases.
    pub fn demo(labels: &ColumnLabels, now: DateTime<Utc>) -> Self {
        let first_created = now - Duration::days(2);
        let second_created = now - Duration::days(1);
        Self {
            column_labels: labels_to_document(labels),
            cases: vec![
                SnapshotCase::demo(
                    "c1",
                    "Tânia Priscila Godoi",
                    "14311497997",
                    Stage::ContractPending,
                    Vec::new(),
                    first_created,
                ),
                SnapshotCase::demo(
                    "c2",
                    "Cliente Teste",
                    "12345678901",
                    Stage::ValueRelease,
                    vec!["RG.pdf".to_owned()],
                    second_created,
                ),
            ],
        }
    }

    /// Resolves stored labels, ignoring keys that name no stage.
    pub fn labels(&self) -> ColumnLabels {
        let overrides = self
            .column_labels
            .iter()
            .filter_map(|(key, label)| {
                Stage::try_from(key.as_str())
                    .inspect_err(|err| tracing::warn!(%err, "ignoring snapshot column label"))
                    .ok()
                    .map(|stage| (stage, label.clone()))
            })
            .collect();
        ColumnLabels::new(overrides)
    }

    /// Converts every stored case into a domain case.
    pub fn to_cases(&self) -> CaseRepositoryResult<Vec<Case>> {
        self.cases.iter().map(SnapshotCase::to_case).collect()
    }
}

impl SnapshotCase {
    fn demo(
        id: &str,
        name: &str,
        tax_id: &str,
        stage: Stage,
        attached_documents: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            tax_id: tax_id.to_owned(),
            stage: stage.as_str().to_owned(),
            contracted_amount: None,
            assigned_operator: None,
            color_tag: None,
            attached_documents: Some(attached_documents),
            follow_up_at: None,
            stage_entered_at: None,
            created_at,
            updated_at: None,
        }
    }

    /// Converts a domain case into its stored form.
    pub fn from_case(case: &Case) -> Self {
        Self {
            id: case.id().as_str().to_owned(),
            name: case.name().to_owned(),
            tax_id: case.tax_id().to_owned(),
            stage: case.stage().as_str().to_owned(),
            contracted_amount: Some(case.contracted_amount().value()),
            assigned_operator: Some(case.assigned_operator().to_owned()),
            color_tag: Some(case.color_tag().as_str().to_owned()),
            attached_documents: Some(case.attached_documents().to_vec()),
            follow_up_at: case.follow_up_at(),
            stage_entered_at: Some(case.stage_entered_at()),
            created_at: case.created_at(),
            updated_at: Some(case.updated_at()),
        }
    }

    /// Converts the stored form into a domain case, backfilling absent
    /// fields with their defaults.
    pub fn to_case(&self) -> CaseRepositoryResult<Case> {
        let stage =
            Stage::try_from(self.stage.as_str()).map_err(CaseRepositoryError::persistence)?;
        let contracted_amount = self
            .contracted_amount
            .map(ContractedAmount::new)
            .transpose()
            .map_err(CaseRepositoryError::persistence)?
            .unwrap_or(ContractedAmount::ZERO);
        let color_tag = self
            .color_tag
            .as_deref()
            .map(ColorTag::try_from)
            .transpose()
            .map_err(CaseRepositoryError::persistence)?
            .unwrap_or_default();

        Ok(Case::from_persisted(PersistedCaseData {
            id: CaseId::from_persisted(self.id.clone()),
            name: self.name.clone(),
            tax_id: self.tax_id.clone(),
            stage,
            contracted_amount,
            assigned_operator: self.assigned_operator.clone().unwrap_or_default(),
            color_tag,
            attached_documents: self.attached_documents.clone().unwrap_or_default(),
            follow_up_at: self.follow_up_at,
            stage_entered_at: self.stage_entered_at.unwrap_or(self.created_at),
            created_at: self.created_at,
            updated_at: self.updated_at.unwrap_or(self.created_at),
        }))
    }
}

/// Writes labels for every stage under their canonical keys.
pub(super) fn labels_to_document(labels: &ColumnLabels) -> BTreeMap<String, String> {
    labels
        .resolved()
        .into_iter()
        .map(|(stage, label)| (stage.as_str().to_owned(), label))
        .collect()
}
