//! Deterministic translation fallback chain.
//!
//! # Responsibility
//! - Resolve `(entity, locale)` to a display name without I/O.
//!
//! # Invariants
//! - Fallback order: exact locale, then `en`, then earliest-inserted
//!   translation, then a structural label derived from the entity.
//! - Resolution never fails and never returns an empty name.
//! - The result does not depend on the order of the translation slice.

use crate::model::catalog::{Category, Field, Metric};
use crate::model::translation::Translation;
use crate::model::validation::normalize_locale;
use serde::Serialize;

/// Locale used when the requested one has no translation.
pub const FALLBACK_LOCALE: &str = "en";

/// Entity exposing an insertion-ordered translation set.
pub trait Translatable {
    fn translations(&self) -> &[Translation];
    /// Label used when the entity has no translation at all.
    fn structural_label(&self) -> String;
}

/// Which rule of the fallback chain produced a [`DisplayName`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Exact,
    English,
    Earliest,
    Structural,
}

/// Resolved, display-ready name of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayName {
    pub name: String,
    pub description: Option<String>,
    /// Locale of the translation used, `None` for structural labels.
    pub locale: Option<String>,
    pub resolution: Resolution,
}

impl DisplayName {
    fn from_translation(translation: &Translation, resolution: Resolution) -> Self {
        Self {
            name: translation.name.clone(),
            description: translation.description.clone(),
            locale: Some(translation.locale.clone()),
            resolution,
        }
    }
}

/// Resolves the display name of `entity` for `locale`.
pub fn resolve<T: Translatable + ?Sized>(entity: &T, locale: &str) -> DisplayName {
    resolve_translations(entity.translations(), locale, || entity.structural_label())
}

/// Applies the fallback chain to a bare translation set.
pub fn resolve_translations(
    translations: &[Translation],
    locale: &str,
    structural_label: impl FnOnce() -> String,
) -> DisplayName {
    let requested = normalize_locale(locale);

    if let Some(exact) = translations.iter().find(|t| t.locale == requested) {
        return DisplayName::from_translation(exact, Resolution::Exact);
    }

    if let Some(english) = translations.iter().find(|t| t.locale == FALLBACK_LOCALE) {
        return DisplayName::from_translation(english, Resolution::English);
    }

    if let Some(earliest) = translations.iter().min_by_key(|t| t.id) {
        return DisplayName::from_translation(earliest, Resolution::Earliest);
    }

    DisplayName {
        name: structural_label(),
        description: None,
        locale: None,
        resolution: Resolution::Structural,
    }
}

impl Translatable for Category {
    fn translations(&self) -> &[Translation] {
        &self.translations
    }

    fn structural_label(&self) -> String {
        self.slug.clone()
    }
}

impl Translatable for Field {
    fn translations(&self) -> &[Translation] {
        &self.translations
    }

    fn structural_label(&self) -> String {
        self.slug.clone()
    }
}

impl Translatable for Metric {
    fn translations(&self) -> &[Translation] {
        &self.translations
    }

    fn structural_label(&self) -> String {
        self.slug.clone()
    }
}
