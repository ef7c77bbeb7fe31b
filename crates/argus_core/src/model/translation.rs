//! Localized strings attached to catalog entities.
//!
//! # Invariants
//! - At most one translation per (entity, locale).
//! - `id` order is insertion order and is the "earliest" fallback order.

use serde::Serialize;

/// Row id of a translation in its concrete per-entity table.
pub type TranslationId = i64;

/// One localized name (and optional description) of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub id: TranslationId,
    /// Normalized locale tag (`en`, `fr`, `pt-br`).
    pub locale: String,
    pub name: String,
    /// Optional longer text, mostly used by metrics.
    pub description: Option<String>,
}

/// Write model for adding one translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTranslation {
    pub locale: String,
    pub name: String,
    pub description: Option<String>,
}

impl NewTranslation {
    pub fn new(locale: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
