//! Core engine of the Argus free-software catalog.
//!
//! Scores published projects over a weighted Category → Field hierarchy,
//! resolves localized names with a deterministic fallback chain and records
//! raw metric observations. This crate is the single source of truth for
//! those invariants.

pub mod db;
pub mod i18n;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scoring;
pub mod search;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use i18n::resolver::{resolve, DisplayName, Resolution, Translatable};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::catalog::{Catalog, Category, Field, Metric, NewCategory, NewField, NewMetric};
pub use model::project::{Block, BlockKind, NewBlock, NewProject, Project, ProjectState, Tag};
pub use model::scoring::{MetricValue, MetricValueId, NewAnalysisResult, NewMetricValue};
pub use model::translation::{NewTranslation, Translation};
pub use model::validation::ModelValidationError;
pub use repo::{RepoError, RepoResult};
pub use scoring::aggregate::{category_score, overall_score, round_for_display, Contribution};
pub use scoring::cell::ScoreCell;
pub use search::project_search::{
    featured_projects, projects_by_tag, search_projects, ProjectSummary, SearchError,
    TagListing, DEFAULT_FEATURED_LIMIT,
};
pub use service::compare_service::{compare_projects, ComparisonTable};
pub use service::metric_service::{
    append_metric_value, field_metric_series, AppendMetricValueRequest, FieldMetricSeries,
    MetricService,
};
pub use service::scores_service::{project_overview, project_scores, ProjectScores};
pub use service::{ComparisonValidationError, ServiceError, ServiceResult};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
