//! Analysis results and raw metric observations.
//!
//! # Invariants
//! - `AnalysisResult.score` is within `[1.00, 5.00]` with at most 2 decimals.
//! - `MetricValue.value` fits fixed-point (20 integer, 4 fractional digits).
//! - Metric values are append-only; nothing here mutates a stored value.

use crate::model::catalog::{FieldId, MetricId};
use crate::model::project::ProjectId;
use crate::model::validation::{integer_digits, ModelValidationError, ValidationResult};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

pub type AnalysisResultId = i64;

/// Stable identifier handed back to metric collectors.
pub type MetricValueId = Uuid;

pub const MIN_SCORE: Decimal = Decimal::from_parts(100, 0, 0, false, 2);
pub const MAX_SCORE: Decimal = Decimal::from_parts(500, 0, 0, false, 2);
const SCORE_SCALE: u32 = 2;
const VALUE_SCALE: u32 = 4;
const VALUE_INTEGER_DIGITS: u32 = 20;

/// Externally produced score of one project on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub id: AnalysisResultId,
    pub project_id: ProjectId,
    pub field_id: FieldId,
    pub score: Decimal,
    pub is_published: bool,
    /// Entered by hand rather than by the analysis tool.
    pub is_manual: bool,
    /// Epoch ms.
    pub created_at: i64,
}

/// Write model for an analysis result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnalysisResult {
    pub project_id: ProjectId,
    pub field_id: FieldId,
    pub score: Decimal,
    pub is_published: bool,
    pub is_manual: bool,
}

impl NewAnalysisResult {
    pub fn published(project_id: ProjectId, field_id: FieldId, score: Decimal) -> Self {
        Self {
            project_id,
            field_id,
            score,
            is_published: true,
            is_manual: false,
        }
    }

    pub fn unpublished(project_id: ProjectId, field_id: FieldId, score: Decimal) -> Self {
        Self {
            is_published: false,
            ..Self::published(project_id, field_id, score)
        }
    }

    /// Marks the result as entered by hand.
    pub fn manual(self) -> Self {
        Self {
            is_manual: true,
            ..self
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_score(self.score)
    }
}

/// Checks score range and precision.
pub fn validate_score(score: Decimal) -> ValidationResult<()> {
    if score < MIN_SCORE || score > MAX_SCORE {
        return Err(ModelValidationError::ScoreOutOfRange(score));
    }
    if score.normalize().scale() > SCORE_SCALE {
        return Err(ModelValidationError::ScorePrecision(score));
    }
    Ok(())
}

/// One timestamped raw observation of a metric for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricValue {
    pub uuid: MetricValueId,
    pub metric_id: MetricId,
    pub project_id: ProjectId,
    pub value: Decimal,
    /// Epoch ms of the observation, as reported by the collector.
    pub collected_at: i64,
    pub source: String,
    /// Insertion sequence; later rows have larger values.
    #[serde(skip)]
    pub sequence: i64,
}

/// Write model for appending one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMetricValue {
    pub metric_id: MetricId,
    pub project_id: ProjectId,
    pub value: Decimal,
    pub source: String,
    pub collected_at: i64,
}

impl NewMetricValue {
    /// Validates value precision and returns the trimmed source label.
    pub fn validate(&self) -> ValidationResult<String> {
        validate_metric_value(self.value)?;
        let source = self.source.trim();
        if source.is_empty() {
            return Err(ModelValidationError::BlankSource);
        }
        Ok(source.to_string())
    }
}

/// Checks fixed-point bounds for raw metric values.
pub fn validate_metric_value(value: Decimal) -> ValidationResult<()> {
    if value.normalize().scale() > VALUE_SCALE {
        return Err(ModelValidationError::ValuePrecision(value));
    }
    if integer_digits(value) > VALUE_INTEGER_DIGITS {
        return Err(ModelValidationError::ValueOutOfRange(value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_metric_value, validate_score, MAX_SCORE, MIN_SCORE};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn score_bounds_are_inclusive() {
        assert_eq!(MIN_SCORE.to_string(), "1.00");
        assert_eq!(MAX_SCORE.to_string(), "5.00");
        assert!(validate_score(MIN_SCORE).is_ok());
        assert!(validate_score(MAX_SCORE).is_ok());
        assert!(validate_score(Decimal::new(99, 2)).is_err());
        assert!(validate_score(Decimal::new(501, 2)).is_err());
    }

    #[test]
    fn score_rejects_sub_cent_precision() {
        assert!(validate_score(Decimal::new(4125, 3)).is_err());
        assert!(validate_score(Decimal::new(41200, 4)).is_ok());
    }

    #[test]
    fn metric_value_enforces_fixed_point_shape() {
        assert!(validate_metric_value(Decimal::from_str("12345.6789").unwrap()).is_ok());
        assert!(validate_metric_value(Decimal::from_str("1.23456").unwrap()).is_err());
        assert!(
            validate_metric_value(Decimal::from_str("99999999999999999999.9999").unwrap()).is_ok()
        );
        assert!(validate_metric_value(Decimal::from_str("100000000000000000000").unwrap()).is_err());
        assert!(validate_metric_value(Decimal::from_str("-42").unwrap()).is_ok());
    }
}
