//! Timeout and retry policy for case store calls.

use super::board::{BoardError, BoardResult};
use crate::pipeline::ports::CaseRepositoryResult;
use std::future::Future;
use std::time::Duration;

/// Bounds applied to every case store call made by the board service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationPolicy {
    /// Time allowed for one attempt.
    pub timeout: Duration,
    /// Extra attempts allowed for idempotent calls after a storage failure
    /// or timeout.
    pub retries: u32,
}

impl MutationPolicy {
    /// Default time allowed for one attempt.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default number of retries.
    pub const DEFAULT_RETRIES: u32 = 1;

    /// Creates a policy.
    #[must_use]
    pub const fn new(timeout: Duration, retries: u32) -> Self {
        Self { timeout, retries }
    }
}

impl Default for MutationPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT, Self::DEFAULT_RETRIES)
    }
}

/// Case store operations, as far as retry rules care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StoreCall {
    ListCases,
    FindCase,
    CreateCase,
    SetStage,
    UpdateFields,
    AppendDocument,
    DeleteCase,
}

impl StoreCall {
    pub(super) const fn as_str(self) -> &'static str {
        match self {
            Self::ListCases => "list_cases",
            Self::FindCase => "find_by_id",
            Self::CreateCase => "create_case",
            Self::SetStage => "set_stage",
            Self::UpdateFields => "update_fields",
            Self::AppendDocument => "append_document",
            Self::DeleteCase => "delete_case",
        }
    }

    /// Calls that leave the store in the same state when repeated.
    const fn is_idempotent(self) -> bool {
        matches!(
            self,
            Self::ListCases | Self::FindCase | Self::SetStage | Self::UpdateFields
        )
    }
}

/// Runs a store call under `policy`.
///
/// Each attempt is bounded by the policy timeout. Idempotent calls are
/// retried after a storage failure or timeout; request errors such as
/// `NotFound` are returned at once.
pub(super) async fn call_store<T, F, Fut>(
    policy: MutationPolicy,
    call: StoreCall,
    operation: F,
) -> BoardResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = CaseRepositoryResult<T>>,
{
    let attempts = if call.is_idempotent() {
        policy.retries.saturating_add(1)
    } else {
        1
    };

    let mut attempt = 1;
    loop {
        let failure = match tokio::time::timeout(policy.timeout, operation()).await {
            Ok(Ok(output)) => return Ok(output),
            Ok(Err(err)) if !err.is_storage_failure() => return Err(err.into()),
            Ok(Err(err)) => BoardError::Repository(err),
            Err(_) => BoardError::Timeout(policy.timeout),
        };
        if attempt >= attempts {
            return Err(failure);
        }
        tracing::warn!(
            call = call.as_str(),
            attempt,
            error = %failure,
            "retrying case store call"
        );
        attempt += 1;
    }
}
