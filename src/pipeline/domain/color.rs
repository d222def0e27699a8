//! Display color tags for board cards.

use super::PipelineDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cosmetic color attached to a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    /// Neutral card color, used when none was chosen.
    #[default]
    Gray,
    /// Blue card.
    Blue,
    /// Green card.
    Green,
    /// Yellow card.
    Yellow,
    /// Orange card.
    Orange,
    /// Red card.
    Red,
    /// Purple card.
    Purple,
}

impl ColorTag {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::Purple => "purple",
        }
    }
}

impl TryFrom<&str> for ColorTag {
    type Error = PipelineDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "gray" | "grey" => Ok(Self::Gray),
            "blue" => Ok(Self::Blue),
            "green" => Ok(Self::Green),
            "yellow" => Ok(Self::Yellow),
            "orange" => Ok(Self::Orange),
            "red" => Ok(Self::Red),
            "purple" => Ok(Self::Purple),
            _ => Err(PipelineDomainError::InvalidColorTag(value.to_owned())),
        }
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
