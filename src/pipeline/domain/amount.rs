//! Contracted amount value type and pt-BR currency parsing.

use super::PipelineDomainError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits kept for currency values.
const CURRENCY_SCALE: u32 = 2;

/// Non-negative currency amount contracted for a case, in reais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct ContractedAmount(Decimal);

impl ContractedAmount {
    /// The zero amount, used for cases stored before amounts existed.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a validated amount, rounded to cents.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::InvalidAmount`] when the value is
    /// negative.
    pub fn new(value: Decimal) -> Result<Self, PipelineDomainError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(PipelineDomainError::InvalidAmount(value.to_string()));
        }
        let rounded =
            value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        Ok(Self(rounded.abs()))
    }

    /// Parses locale-formatted input such as `1.500,00` or `R$ 2.000`.
    ///
    /// The comma is the decimal separator and dots group thousands. Grouping
    /// must be well formed (`1.500` is accepted, `15.00` is not) and at most
    /// two fractional digits are allowed.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::InvalidAmount`] when the text is empty,
    /// negative, badly grouped or not numeric.
    pub fn parse_locale(input: &str) -> Result<Self, PipelineDomainError> {
        let invalid = || PipelineDomainError::InvalidAmount(input.to_owned());
        let trimmed = input.trim();
        let unprefixed = trimmed
            .strip_prefix("R$")
            .map_or(trimmed, str::trim_start);

        let (integer_part, fraction_part) = unprefixed
            .split_once(',')
            .map_or((unprefixed, None), |(integer, fraction)| {
                (integer, Some(fraction))
            });

        let mut canonical = strip_thousands(integer_part).ok_or_else(invalid)?;
        if let Some(fraction) = fraction_part {
            let is_valid_fraction = !fraction.is_empty()
                && fraction.len() <= 2
                && fraction.chars().all(|c| c.is_ascii_digit());
            if !is_valid_fraction {
                return Err(invalid());
            }
            canonical.push('.');
            canonical.push_str(fraction);
        }

        let value = Decimal::from_str(&canonical).map_err(|_| invalid())?;
        Self::new(value)
    }

    /// Rebuilds an amount stored as integer cents.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::InvalidAmount`] when `cents` is
    /// negative.
    pub fn from_cents(cents: i64) -> Result<Self, PipelineDomainError> {
        Self::new(Decimal::new(cents, CURRENCY_SCALE))
    }

    /// Returns the amount as integer cents, or `None` if it does not fit.
    #[must_use]
    pub fn cents(self) -> Option<i64> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.round().to_i64())
    }

    /// Returns the underlying decimal value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Adds two amounts, saturating at the decimal maximum.
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl TryFrom<Decimal> for ContractedAmount {
    type Error = PipelineDomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContractedAmount> for Decimal {
    fn from(amount: ContractedAmount) -> Self {
        amount.0
    }
}

/// Formats as Brazilian currency, for example `R$ 1.500,00`.
impl fmt::Display for ContractedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rescaled = self.0;
        rescaled.rescale(CURRENCY_SCALE);
        let text = rescaled.to_string();
        let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
        write!(f, "R$ {},{fraction}", group_thousands(integer))
    }
}

/// Removes dot thousand separators, validating three-digit grouping.
fn strip_thousands(integer_part: &str) -> Option<String> {
    let is_digits_and_dots = !integer_part.is_empty()
        && integer_part.chars().all(|c| c.is_ascii_digit() || c == '.');
    if !is_digits_and_dots {
        return None;
    }

    let mut groups = integer_part.split('.');
    let leading = groups.next()?;
    if leading.is_empty() || (integer_part.contains('.') && leading.len() > 3) {
        return None;
    }

    let mut digits = leading.to_owned();
    for group in groups {
        if group.len() != 3 {
            return None;
        }
        digits.push_str(group);
    }
    Some(digits)
}

fn group_thousands(digits: &str) -> String {
    let mut groups: Vec<&str> = digits
        .as_bytes()
        .rchunks(3)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect();
    groups.reverse();
    groups.join(".")
}
