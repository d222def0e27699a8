//! Pipeline stages, their forward ordering and column labels.

use super::ParseStageError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Pipeline stage a case occupies.
///
/// Variants are declared in pipeline order, so the derived `Ord` sorts board
/// columns left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Contract signed, paperwork pending.
    ContractPending,
    /// Benefit unlock requested.
    Unlock,
    /// Contracted value is being released.
    ValueRelease,
    /// Awaiting customer payment.
    Payment,
    /// Case completed.
    Done,
    /// Case abandoned before completion.
    Cancelled,
}

impl Stage {
    /// Every stage, in board column order.
    pub const ALL: [Self; 6] = [
        Self::ContractPending,
        Self::Unlock,
        Self::ValueRelease,
        Self::Payment,
        Self::Done,
        Self::Cancelled,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ContractPending => "CONTRACT_PENDING",
            Self::Unlock => "UNLOCK",
            Self::ValueRelease => "VALUE_RELEASE",
            Self::Payment => "PAYMENT",
            Self::Done => "DONE",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Returns the pt-BR column heading used when no custom label is stored.
    #[must_use]
    pub const fn default_label(self) -> &'static str {
        match self {
            Self::ContractPending => "Contrato Pendente",
            Self::Unlock => "Desbloqueio",
            Self::ValueRelease => "Liberação Valor",
            Self::Payment => "Pagamento",
            Self::Done => "Concluído",
            Self::Cancelled => "Cancelado",
        }
    }

    /// Returns `true` for stages that admit no further transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }

    /// Returns the stage `advance` moves to, or `None` from a terminal stage.
    ///
    /// `Cancelled` is never a successor: it is reached only by an explicit
    /// cancel or a direct move.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::ContractPending => Some(Self::Unlock),
            Self::Unlock => Some(Self::ValueRelease),
            Self::ValueRelease => Some(Self::Payment),
            Self::Payment => Some(Self::Done),
            Self::Done | Self::Cancelled => None,
        }
    }
}

impl TryFrom<&str> for Stage {
    type Error = ParseStageError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "CONTRACT_PENDING" | "CONTRATO_PENDENTE" => Ok(Self::ContractPending),
            "UNLOCK" | "DESBLOQUEIO" => Ok(Self::Unlock),
            "VALUE_RELEASE" | "LIBERACAO_VALOR" => Ok(Self::ValueRelease),
            "PAYMENT" | "PAGAMENTO" => Ok(Self::Payment),
            "DONE" | "CONCLUIDO" => Ok(Self::Done),
            "CANCELLED" | "CANCELADO" => Ok(Self::Cancelled),
            _ => Err(ParseStageError(value.to_owned())),
        }
    }
}

impl FromStr for Stage {
    type Err = ParseStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column headings keyed by stage.
///
/// Every stage always resolves to a label; stages without a stored override
/// fall back to [`Stage::default_label`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnLabels {
    overrides: BTreeMap<Stage, String>,
}

impl ColumnLabels {
    /// Creates labels from stored overrides.
    #[must_use]
    pub const fn new(overrides: BTreeMap<Stage, String>) -> Self {
        Self { overrides }
    }

    /// Returns the heading for a stage.
    #[must_use]
    pub fn label(&self, stage: Stage) -> &str {
        self.overrides
            .get(&stage)
            .map_or_else(|| stage.default_label(), String::as_str)
    }

    /// Replaces the heading for a stage.
    pub fn set_label(&mut self, stage: Stage, label: impl Into<String>) {
        self.overrides.insert(stage, label.into());
    }

    /// Returns the resolved heading for every stage, in column order.
    #[must_use]
    pub fn resolved(&self) -> BTreeMap<Stage, String> {
        Stage::ALL
            .into_iter()
            .map(|stage| (stage, self.label(stage).to_owned()))
            .collect()
    }
}
