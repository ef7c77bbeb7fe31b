//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Compose scoring and translation resolution into display-ready shapes.
//!
//! # Invariants
//! - Read use-cases run inside one read snapshot.
//! - "No score" is a value (`ScoreCell::Missing`), never an error.

use crate::model::validation::ModelValidationError;
use crate::repo::RepoError;
use crate::search::project_search::SearchError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod compare_service;
pub mod metric_service;
pub mod scores_service;

pub use compare_service::ComparisonValidationError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Use-case level error.
#[derive(Debug)]
pub enum ServiceError {
    /// Requested entity does not exist or is not publicly visible.
    NotFound { entity: &'static str, key: String },
    /// Input rejected by model validation.
    Validation(ModelValidationError),
    /// Comparison request rejected before any scoring happened.
    Comparison(ComparisonValidationError),
    Repo(RepoError),
}

impl ServiceError {
    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "invalid_input",
            Self::Comparison(err) => err.reason(),
            Self::Repo(_) => "storage_error",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Comparison(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound { .. } => None,
            Self::Validation(err) => Some(err),
            Self::Comparison(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, key } => Self::NotFound { entity, key },
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<SearchError> for ServiceError {
    fn from(value: SearchError) -> Self {
        match value {
            SearchError::TagNotFound(slug) => Self::not_found("tag", slug),
            SearchError::Repo(err) => err.into(),
        }
    }
}

impl From<ModelValidationError> for ServiceError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ComparisonValidationError> for ServiceError {
    fn from(value: ComparisonValidationError) -> Self {
        Self::Comparison(value)
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}
