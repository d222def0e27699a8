//! Diesel row models for case persistence.

use super::schema::cases;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for case records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CaseRow {
    /// Case identifier.
    pub id: String,
    /// Customer name.
    pub name: String,
    /// Tax identifier.
    pub tax_id: String,
    /// Pipeline stage.
    pub stage: String,
    /// Contracted amount in cents.
    pub contracted_amount_cents: i64,
    /// Assigned handler.
    pub assigned_operator: String,
    /// Card color tag.
    pub color_tag: String,
    /// Attached document names.
    pub attached_documents: Value,
    /// Follow-up reminder.
    pub follow_up_at: Option<DateTime<Utc>>,
    /// Latest stage change timestamp.
    pub stage_entered_at: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for case records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cases)]
pub struct NewCaseRow {
    /// Case identifier.
    pub id: String,
    /// Customer name.
    pub name: String,
    /// Tax identifier.
    pub tax_id: String,
    /// Pipeline stage.
    pub stage: String,
    /// Contracted amount in cents.
    pub contracted_amount_cents: i64,
    /// Assigned handler.
    pub assigned_operator: String,
    /// Card color tag.
    pub color_tag: String,
    /// Attached document names.
    pub attached_documents: Value,
    /// Follow-up reminder.
    pub follow_up_at: Option<DateTime<Utc>>,
    /// Latest stage change timestamp.
    pub stage_entered_at: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset for the descriptive fields written by the card editor.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = cases)]
#[diesel(treat_none_as_null = true)]
pub struct CaseFieldsChangeset {
    /// Customer name.
    pub name: String,
    /// Tax identifier.
    pub tax_id: String,
    /// Contracted amount in cents.
    pub contracted_amount_cents: i64,
    /// Assigned handler.
    pub assigned_operator: String,
    /// Card color tag.
    pub color_tag: String,
    /// Follow-up reminder; `None` clears it.
    pub follow_up_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
