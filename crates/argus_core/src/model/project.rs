//! Project, tag and content block models.
//!
//! # Responsibility
//! - Define the catalog entry being scored and its publication workflow.
//! - Keep localized free-text blocks as raw markdown.
//!
//! # Invariants
//! - Only `ProjectState::Published` projects are publicly visible.
//! - Workflow only moves forward: draft -> in_review -> published, with
//!   draft -> published allowed as a skip.
//! - One block per (project, kind, locale).

use crate::model::validation::{
    validate_locale, validate_name, validate_slug, ModelValidationError, ValidationResult,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub type ProjectId = i64;
pub type TagId = i64;
pub type BlockId = i64;

/// Publication workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectState {
    Draft,
    InReview,
    Published,
}

impl ProjectState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InReview => "in_review",
            Self::Published => "published",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "in_review" => Some(Self::InReview),
            "published" => Some(Self::Published),
            _ => None,
        }
    }

    /// Returns whether moving to `next` is a declared transition.
    ///
    /// Staying in the current state is accepted as a no-op.
    pub fn can_transition_to(self, next: Self) -> bool {
        self <= next
    }

    /// Validates a transition and returns the target state.
    pub fn transition_to(self, next: Self) -> ValidationResult<Self> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ModelValidationError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

/// Catalog entry for one free-software project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: ProjectId,
    pub slug: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub repository_url: Option<String>,
    pub website_url: Option<String>,
    pub state: ProjectState,
    /// Epoch ms. `None` means the project was never featured.
    pub featured_at: Option<i64>,
    /// Epoch ms.
    pub created_at: i64,
    /// Epoch ms.
    pub updated_at: i64,
}

impl Project {
    pub fn is_published(&self) -> bool {
        self.state == ProjectState::Published
    }
}

/// Public listing order: `featured_at DESC` with never-featured projects
/// last, then `created_at DESC`, then `id DESC`.
pub fn cmp_public_order(a: &Project, b: &Project) -> Ordering {
    match (a.featured_at, b.featured_at) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| b.created_at.cmp(&a.created_at))
    .then_with(|| b.id.cmp(&a.id))
}

/// Write model for a project. New projects always start as drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub slug: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub repository_url: Option<String>,
    pub website_url: Option<String>,
}

impl NewProject {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            logo_url: None,
            repository_url: None,
            website_url: None,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_slug(&self.slug)?;
        validate_name(&self.name)?;
        Ok(())
    }
}

/// Free-form label grouping projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub slug: String,
}

/// Kind of localized content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Overview,
    UseCase,
    Features,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::UseCase => "use_case",
            Self::Features => "features",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "overview" => Some(Self::Overview),
            "use_case" => Some(Self::UseCase),
            "features" => Some(Self::Features),
            _ => None,
        }
    }
}

/// Localized markdown block of a project. Content is never rendered here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub id: BlockId,
    pub project_id: ProjectId,
    pub kind: BlockKind,
    pub locale: String,
    pub content: String,
}

/// Write model for inserting or replacing one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlock {
    pub kind: BlockKind,
    pub locale: String,
    pub content: String,
}

impl NewBlock {
    pub fn new(kind: BlockKind, locale: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind,
            locale: locale.into(),
            content: content.into(),
        }
    }

    /// Returns the normalized locale after validation.
    pub fn validate(&self) -> ValidationResult<String> {
        validate_locale(&self.locale)
    }
}
