//! Category → Field → Metric hierarchy.
//!
//! # Responsibility
//! - Define the structural scoring hierarchy and its weights.
//! - Provide the declared structural ordering used by every listing.
//!
//! # Invariants
//! - Weights are non-negative (`u32`), enforced again by storage `CHECK`s.
//! - Category slugs are global; field slugs are unique per category and
//!   metric slugs unique per field.
//! - Categories and fields are ordered by `(weight, id)`.

use crate::model::translation::{NewTranslation, Translation};
use crate::model::validation::{validate_slug, ModelValidationError, ValidationResult};
use serde::Serialize;

pub type CategoryId = i64;
pub type FieldId = i64;
pub type MetricId = i64;

/// Default weight applied when callers do not provide one.
pub const DEFAULT_WEIGHT: u32 = 1;

/// Top-level grouping of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    /// Globally unique; used by collectors to address the hierarchy.
    pub slug: String,
    pub weight: u32,
    /// Insertion-ordered translation set.
    pub translations: Vec<Translation>,
}

/// Scored dimension inside a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub id: FieldId,
    pub category_id: CategoryId,
    pub slug: String,
    pub weight: u32,
    /// Expected re-analysis cadence; `None` means manual analysis.
    pub analysis_periodicity_days: Option<u32>,
    pub translations: Vec<Translation>,
}

/// Raw-data definition collected for a field. Carries no value itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub id: MetricId,
    pub field_id: FieldId,
    pub slug: String,
    pub weight: u32,
    pub collection_enabled: bool,
    pub translations: Vec<Translation>,
}

/// Write model for a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub slug: String,
    pub weight: u32,
    pub translations: Vec<NewTranslation>,
}

impl NewCategory {
    pub fn new(slug: impl Into<String>, weight: u32) -> Self {
        Self {
            slug: slug.into(),
            weight,
            translations: Vec::new(),
        }
    }

    pub fn translated(mut self, locale: &str, name: &str) -> Self {
        self.translations.push(NewTranslation::new(locale, name));
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_slug(&self.slug)?;
        Ok(())
    }
}

/// Write model for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewField {
    pub category_id: CategoryId,
    pub slug: String,
    pub weight: u32,
    pub analysis_periodicity_days: Option<u32>,
    pub translations: Vec<NewTranslation>,
}

impl NewField {
    pub fn new(category_id: CategoryId, slug: impl Into<String>, weight: u32) -> Self {
        Self {
            category_id,
            slug: slug.into(),
            weight,
            analysis_periodicity_days: None,
            translations: Vec::new(),
        }
    }

    pub fn translated(mut self, locale: &str, name: &str) -> Self {
        self.translations.push(NewTranslation::new(locale, name));
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_slug(&self.slug)?;
        if let Some(0) = self.analysis_periodicity_days {
            return Err(ModelValidationError::InvalidPeriodicity(0));
        }
        Ok(())
    }
}

/// Write model for a metric definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMetric {
    pub field_id: FieldId,
    pub slug: String,
    pub weight: u32,
    pub collection_enabled: bool,
    pub translations: Vec<NewTranslation>,
}

impl NewMetric {
    pub fn new(field_id: FieldId, slug: impl Into<String>) -> Self {
        Self {
            field_id,
            slug: slug.into(),
            weight: DEFAULT_WEIGHT,
            collection_enabled: true,
            translations: Vec::new(),
        }
    }

    pub fn translated(mut self, translation: NewTranslation) -> Self {
        self.translations.push(translation);
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_slug(&self.slug)?;
        Ok(())
    }
}

/// One category with its fields, both in structural order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    pub category: Category,
    pub fields: Vec<Field>,
}

/// Fully pre-loaded scoring hierarchy.
///
/// Built in one pass so aggregation never traverses relations lazily.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub categories: Vec<CategoryNode>,
}

impl Catalog {
    /// Iterates every field of the catalog in structural order.
    pub fn fields(&self) -> impl Iterator<Item = (&Category, &Field)> {
        self.categories
            .iter()
            .flat_map(|node| node.fields.iter().map(move |field| (&node.category, field)))
    }
}
