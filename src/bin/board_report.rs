//! Logs a summary of the case board stored in the local snapshot.
//!
//! Usage:
//!
//! ```text
//! board_report [search]
//! ```
//!
//! Settings come from `esteira.toml` (or the file named by `ESTEIRA_CONFIG`)
//! and `ESTEIRA_*` environment overrides. When `search` is given only cases
//! whose name or CPF matches it are counted in the column summary.

use esteira::config::BoardSettings;
use esteira::pipeline::adapters::snapshot::SnapshotCaseRepository;
use esteira::pipeline::board::{due_follow_ups, operator_summaries};
use esteira::pipeline::services::BoardService;
use mockable::{Clock, DefaultClock};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .compact()
        .init();

    let settings = BoardSettings::from_environment()?;
    let repository = Arc::new(SnapshotCaseRepository::open(
        &settings.snapshot_path,
        settings.snapshot_seed(),
    )?);
    let labels = repository.column_labels().await?;
    let clock = Arc::new(DefaultClock);
    let service = BoardService::with_policy(
        Arc::clone(&repository),
        Arc::clone(&clock),
        settings.mutation_policy(),
    );

    let snapshot = service.refresh().await?;
    let query = std::env::args().nth(1).unwrap_or_default();
    let projection = snapshot.project().filter(&query);
    tracing::info!(
        snapshot = %settings.snapshot_path,
        cases = snapshot.cases.len(),
        matching = projection.len(),
        "loaded case board"
    );

    for column in projection.summaries(&labels) {
        tracing::info!(
            stage = %column.stage,
            label = %column.label,
            count = column.count,
            total = %column.total_amount,
            "column"
        );
    }
    for operator in operator_summaries(&snapshot.cases) {
        let name = if operator.operator.is_empty() {
            "(unassigned)"
        } else {
            operator.operator.as_str()
        };
        tracing::info!(
            operator = name,
            active = operator.active_cases,
            total = operator.total_cases,
            amount = %operator.total_amount,
            "operator"
        );
    }
    for case in due_follow_ups(&snapshot.cases, clock.utc()) {
        tracing::info!(
            case_id = %case.id(),
            name = case.name(),
            stage = %case.stage(),
            "follow-up due"
        );
    }
    Ok(())
}
