//! Write-time validation shared by catalog, project and scoring models.
//!
//! # Invariants
//! - Slugs are lowercase ASCII words joined by single hyphens.
//! - Locales are normalized (trimmed, lowercase, `_` -> `-`) before matching.
//! - Validation is pure and never touches storage.

use crate::model::project::ProjectState;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));
static LOCALE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2,3}(?:-[a-z0-9]{2,8})*$").expect("valid locale regex"));

/// Validation errors raised before any persistence mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    InvalidSlug(String),
    InvalidLocale(String),
    /// A required display name is blank after trim.
    BlankName,
    /// A metric value source label is blank after trim.
    BlankSource,
    /// Analysis score outside `[1.00, 5.00]`.
    ScoreOutOfRange(Decimal),
    /// Analysis score with more than two fractional digits.
    ScorePrecision(Decimal),
    /// Metric value with more than 20 integer digits.
    ValueOutOfRange(Decimal),
    /// Metric value with more than 4 fractional digits.
    ValuePrecision(Decimal),
    /// Analysis periodicity must be at least one day.
    InvalidPeriodicity(u32),
    InvalidTransition {
        from: ProjectState,
        to: ProjectState,
    },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSlug(value) => write!(f, "invalid slug `{value}`"),
            Self::InvalidLocale(value) => write!(f, "invalid locale `{value}`"),
            Self::BlankName => write!(f, "name must not be blank"),
            Self::BlankSource => write!(f, "metric value source must not be blank"),
            Self::ScoreOutOfRange(score) => {
                write!(f, "score {score} is outside the range 1.00..=5.00")
            }
            Self::ScorePrecision(score) => {
                write!(f, "score {score} has more than 2 fractional digits")
            }
            Self::ValueOutOfRange(value) => {
                write!(f, "metric value {value} has more than 20 integer digits")
            }
            Self::ValuePrecision(value) => {
                write!(f, "metric value {value} has more than 4 fractional digits")
            }
            Self::InvalidPeriodicity(days) => {
                write!(f, "analysis periodicity must be positive, got {days}")
            }
            Self::InvalidTransition { from, to } => write!(
                f,
                "project state cannot move from `{}` to `{}`",
                from.as_str(),
                to.as_str()
            ),
        }
    }
}

impl Error for ModelValidationError {}

pub type ValidationResult<T> = Result<T, ModelValidationError>;

/// Checks slug format and returns it unchanged.
pub fn validate_slug(slug: &str) -> ValidationResult<&str> {
    if SLUG_RE.is_match(slug) {
        Ok(slug)
    } else {
        Err(ModelValidationError::InvalidSlug(slug.to_string()))
    }
}

/// Normalizes a locale tag for storage and matching.
///
/// `" pt_BR "` becomes `"pt-br"`. No validation is applied.
pub fn normalize_locale(locale: &str) -> String {
    locale.trim().to_ascii_lowercase().replace('_', "-")
}

/// Normalizes and validates a locale tag for storage.
pub fn validate_locale(locale: &str) -> ValidationResult<String> {
    let normalized = normalize_locale(locale);
    if LOCALE_RE.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(ModelValidationError::InvalidLocale(locale.to_string()))
    }
}

/// Trims a display name and rejects blank values.
pub fn validate_name(name: &str) -> ValidationResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(ModelValidationError::BlankName)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Number of digits left of the decimal point, ignoring sign.
pub(crate) fn integer_digits(value: Decimal) -> u32 {
    let integral = value.trunc().abs();
    if integral.is_zero() {
        return 0;
    }
    integral.normalize().to_string().len() as u32
}
