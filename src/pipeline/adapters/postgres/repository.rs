//! `PostgreSQL` repository implementation for case storage.

use super::{
    models::{CaseFieldsChangeset, CaseRow, NewCaseRow},
    schema::cases,
};
use crate::pipeline::{
    domain::{Case, CaseId, ColorTag, ContractedAmount, PersistedCaseData, Stage},
    ports::{CaseRepository, CaseRepositoryError, CaseRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::io;

/// `PostgreSQL` connection pool type used by case adapters.
pub type CasePgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed case repository.
#[derive(Debug, Clone)]
pub struct PostgresCaseRepository {
    pool: CasePgPool,
}

impl PostgresCaseRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: CasePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> CaseRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> CaseRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(CaseRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(CaseRepositoryError::persistence)?
    }
}

#[async_trait]
impl CaseRepository for PostgresCaseRepository {
    async fn list_cases(&self) -> CaseRepositoryResult<Vec<Case>> {
        self.run_blocking(|connection| {
            let rows = cases::table
                .order(cases::created_at.desc())
                .select(CaseRow::as_select())
                .load::<CaseRow>(connection)
                .map_err(CaseRepositoryError::persistence)?;
            rows.into_iter().map(row_to_case).collect()
        })
        .await
    }

    async fn find_by_id(&self, id: &CaseId) -> CaseRepositoryResult<Option<Case>> {
        let lookup = id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = cases::table
                .filter(cases::id.eq(lookup))
                .select(CaseRow::as_select())
                .first::<CaseRow>(connection)
                .optional()
                .map_err(CaseRepositoryError::persistence)?;
            row.map(row_to_case).transpose()
        })
        .await
    }

    async fn create_case(&self, case: &Case) -> CaseRepositoryResult<()> {
        let case_id = case.id().clone();
        let new_row = to_new_row(case)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(cases::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        CaseRepositoryError::DuplicateCase(case_id.clone())
                    }
                    _ => CaseRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn set_stage(
        &self,
        id: &CaseId,
        stage: Stage,
        entered_at: DateTime<Utc>,
    ) -> CaseRepositoryResult<()> {
        let case_id = id.clone();
        self.run_blocking(move |connection| {
            let updated = diesel::update(cases::table.filter(cases::id.eq(case_id.as_str())))
                .set((
                    cases::stage.eq(stage.as_str()),
                    cases::stage_entered_at.eq(entered_at),
                    cases::updated_at.eq(entered_at),
                ))
                .execute(connection)
                .map_err(CaseRepositoryError::persistence)?;
            ensure_row_touched(updated, case_id)
        })
        .await
    }

    async fn update_fields(&self, case: &Case) -> CaseRepositoryResult<()> {
        let case_id = case.id().clone();
        let changeset = to_fields_changeset(case)?;
        self.run_blocking(move |connection| {
            let updated = diesel::update(cases::table.filter(cases::id.eq(case_id.as_str())))
                .set(&changeset)
                .execute(connection)
                .map_err(CaseRepositoryError::persistence)?;
            ensure_row_touched(updated, case_id)
        })
        .await
    }

    async fn append_document(
        &self,
        id: &CaseId,
        document_name: &str,
        attached_at: DateTime<Utc>,
    ) -> CaseRepositoryResult<()> {
        let case_id = id.clone();
        let name = document_name.to_owned();
        self.run_blocking(move |connection| {
            let updated = diesel::sql_query(concat!(
                "UPDATE cases SET attached_documents = ",
                "attached_documents || jsonb_build_array($2::text), ",
                "updated_at = $3 WHERE id = $1",
            ))
            .bind::<diesel::sql_types::Varchar, _>(case_id.as_str())
            .bind::<diesel::sql_types::Text, _>(name)
            .bind::<diesel::sql_types::Timestamptz, _>(attached_at)
            .execute(connection)
            .map_err(CaseRepositoryError::persistence)?;
            ensure_row_touched(updated, case_id)
        })
        .await
    }

    async fn delete_case(&self, id: &CaseId) -> CaseRepositoryResult<()> {
        let case_id = id.clone();
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(cases::table.filter(cases::id.eq(case_id.as_str())))
                .execute(connection)
                .map_err(CaseRepositoryError::persistence)?;
            ensure_row_touched(deleted, case_id)
        })
        .await
    }
}

fn ensure_row_touched(rows: usize, case_id: CaseId) -> CaseRepositoryResult<()> {
    if rows == 0 {
        return Err(CaseRepositoryError::NotFound(case_id));
    }
    Ok(())
}

fn amount_to_cents(amount: ContractedAmount) -> CaseRepositoryResult<i64> {
    amount.cents().ok_or_else(|| {
        CaseRepositoryError::persistence(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("contracted amount {amount} does not fit in cents column"),
        ))
    })
}

fn to_new_row(case: &Case) -> CaseRepositoryResult<NewCaseRow> {
    let attached_documents = serde_json::to_value(case.attached_documents())
        .map_err(CaseRepositoryError::persistence)?;

    Ok(NewCaseRow {
        id: case.id().as_str().to_owned(),
        name: case.name().to_owned(),
        tax_id: case.tax_id().to_owned(),
        stage: case.stage().as_str().to_owned(),
        contracted_amount_cents: amount_to_cents(case.contracted_amount())?,
        assigned_operator: case.assigned_operator().to_owned(),
        color_tag: case.color_tag().as_str().to_owned(),
        attached_documents,
        follow_up_at: case.follow_up_at(),
        stage_entered_at: case.stage_entered_at(),
        created_at: case.created_at(),
        updated_at: case.updated_at(),
    })
}

fn to_fields_changeset(case: &Case) -> CaseRepositoryResult<CaseFieldsChangeset> {
    Ok(CaseFieldsChangeset {
        name: case.name().to_owned(),
        tax_id: case.tax_id().to_owned(),
        contracted_amount_cents: amount_to_cents(case.contracted_amount())?,
        assigned_operator: case.assigned_operator().to_owned(),
        color_tag: case.color_tag().as_str().to_owned(),
        follow_up_at: case.follow_up_at(),
        updated_at: case.updated_at(),
    })
}

fn row_to_case(row: CaseRow) -> CaseRepositoryResult<Case> {
    let CaseRow {
        id,
        name,
        tax_id,
        stage: persisted_stage,
        contracted_amount_cents,
        assigned_operator,
        color_tag: persisted_color,
        attached_documents: persisted_documents,
        follow_up_at,
        stage_entered_at,
        created_at,
        updated_at,
    } = row;

    let stage =
        Stage::try_from(persisted_stage.as_str()).map_err(CaseRepositoryError::persistence)?;
    let color_tag =
        ColorTag::try_from(persisted_color.as_str()).map_err(CaseRepositoryError::persistence)?;
    let contracted_amount = ContractedAmount::from_cents(contracted_amount_cents)
        .map_err(CaseRepositoryError::persistence)?;
    let attached_documents = serde_json::from_value::<Vec<String>>(persisted_documents)
        .map_err(CaseRepositoryError::persistence)?;

    Ok(Case::from_persisted(PersistedCaseData {
        id: CaseId::from_persisted(id),
        name,
        tax_id,
        stage,
        contracted_amount,
        assigned_operator,
        color_tag,
        attached_documents,
        follow_up_at,
        stage_entered_at,
        created_at,
        updated_at,
    }))
}
