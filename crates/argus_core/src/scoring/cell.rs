//! Display cell for a score that may be absent.

use crate::scoring::aggregate::round_for_display;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// A displayed score, or the explicit `Missing` marker.
///
/// `Missing` is a normal value, never `0`. It serializes as `null`; a score
/// serializes as a decimal string rounded half-up to two places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreCell {
    Scored(Decimal),
    Missing,
}

impl ScoreCell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Exact (unrounded) score, if any.
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Self::Scored(score) => Some(*score),
            Self::Missing => None,
        }
    }

    /// Score rounded for display, if any.
    pub fn display_value(&self) -> Option<Decimal> {
        self.value().map(round_for_display)
    }
}

impl From<Option<Decimal>> for ScoreCell {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(Self::Missing, Self::Scored)
    }
}

impl Display for ScoreCell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.display_value() {
            Some(score) => write!(f, "{score}"),
            None => write!(f, "-"),
        }
    }
}

impl Serialize for ScoreCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.display_value() {
            Some(score) => serializer.serialize_str(&score.to_string()),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ScoreCell;
    use rust_decimal::Decimal;

    #[test]
    fn missing_renders_distinctly_from_zero() {
        assert_eq!(ScoreCell::from(None).to_string(), "-");
        assert_eq!(
            ScoreCell::from(Some(Decimal::ZERO)).to_string(),
            "0.00"
        );
        assert!(ScoreCell::Missing.is_missing());
    }

    #[test]
    fn display_value_rounds_but_value_stays_exact() {
        let exact = Decimal::new(41666, 4);
        let cell = ScoreCell::Scored(exact);
        assert_eq!(cell.value(), Some(exact));
        assert_eq!(cell.display_value(), Some(Decimal::new(417, 2)));
    }
}
