//! Side-by-side comparison of published projects.
//!
//! # Responsibility
//! - Validate a comparison request before any scoring happens.
//! - Build the (category, field) × project score table.
//!
//! # Invariants
//! - Between 2 and 5 distinct, existing, published projects.
//! - Columns keep the caller's project order.
//! - Rows cover the whole catalog in structural order; unscored cells are
//!   `ScoreCell::Missing`.

use crate::db::with_read_snapshot;
use crate::i18n::resolver::resolve;
use crate::model::project::Project;
use crate::repo::analysis_repo::{AnalysisRepository, SqliteAnalysisRepository};
use crate::repo::catalog_repo::{CatalogRepository, SqliteCatalogRepository};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::scoring::cell::ScoreCell;
use crate::scoring::rollup::{rollup_project, ProjectRollup};
use crate::search::project_search::ProjectSummary;
use crate::service::{ServiceError, ServiceResult};
use log::{info, warn};
use rusqlite::Connection;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Fewest projects a comparison accepts.
pub const MIN_COMPARED_PROJECTS: usize = 2;
/// Most projects a comparison accepts.
pub const MAX_COMPARED_PROJECTS: usize = 5;

/// Rejected comparison request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonValidationError {
    /// Number of requested projects is outside the accepted range.
    Count(usize),
    /// The same slug was requested more than once.
    DuplicateSlug(String),
    /// Slugs with no matching project, in request order.
    SlugNotFound(Vec<String>),
    /// Slugs of existing but unpublished projects, in request order.
    NotPublished(Vec<String>),
}

impl ComparisonValidationError {
    /// Machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Count(_) => "count",
            Self::DuplicateSlug(_) => "duplicate_slug",
            Self::SlugNotFound(_) => "slug_not_found",
            Self::NotPublished(_) => "not_published",
        }
    }

    /// Offending count or slug list.
    pub fn detail(&self) -> String {
        match self {
            Self::Count(count) => count.to_string(),
            Self::DuplicateSlug(slug) => slug.clone(),
            Self::SlugNotFound(slugs) | Self::NotPublished(slugs) => slugs.join(","),
        }
    }
}

impl Display for ComparisonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(count) => write!(
                f,
                "comparison needs {MIN_COMPARED_PROJECTS} to {MAX_COMPARED_PROJECTS} projects, got {count}"
            ),
            Self::DuplicateSlug(slug) => write!(f, "project `{slug}` requested twice"),
            Self::SlugNotFound(slugs) => write!(f, "unknown projects: {}", slugs.join(", ")),
            Self::NotPublished(slugs) => {
                write!(f, "projects not published: {}", slugs.join(", "))
            }
        }
    }
}

impl Error for ComparisonValidationError {}

impl Serialize for ComparisonValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ComparisonValidationError", 2)?;
        state.serialize_field("reason", self.reason())?;
        state.serialize_field("detail", &self.detail())?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonFieldRow {
    pub slug: String,
    pub name: String,
    /// One cell per compared project, in column order.
    pub scores: Vec<ScoreCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonCategoryRow {
    pub slug: String,
    pub name: String,
    pub scores: Vec<ScoreCell>,
    pub fields: Vec<ComparisonFieldRow>,
}

/// Localized comparison table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonTable {
    /// Column headers in request order.
    pub projects: Vec<ProjectSummary>,
    pub categories: Vec<ComparisonCategoryRow>,
    pub overall: Vec<ScoreCell>,
}

/// Checks slug count and uniqueness without touching storage.
pub fn validate_request(slugs: &[String]) -> Result<(), ComparisonValidationError> {
    if !(MIN_COMPARED_PROJECTS..=MAX_COMPARED_PROJECTS).contains(&slugs.len()) {
        return Err(ComparisonValidationError::Count(slugs.len()));
    }

    let mut seen = HashSet::with_capacity(slugs.len());
    for slug in slugs {
        if !seen.insert(slug.as_str()) {
            return Err(ComparisonValidationError::DuplicateSlug(slug.clone()));
        }
    }
    Ok(())
}

/// Compares 2..=5 published projects across the whole catalog.
pub fn compare_projects(
    conn: &Connection,
    slugs: &[String],
    locale: &str,
) -> ServiceResult<ComparisonTable> {
    let started_at = Instant::now();
    if let Err(err) = validate_request(slugs) {
        warn!(
            "event=compare module=service status=rejected reason={} projects={}",
            err.reason(),
            slugs.len()
        );
        return Err(err.into());
    }

    let loaded = with_read_snapshot(conn, |conn| {
        let projects = load_compared_projects(conn, slugs)?;
        let catalog = SqliteCatalogRepository::try_new(conn)?.load_catalog()?;
        let ids: Vec<_> = projects.iter().map(|project| project.id).collect();
        let scores = SqliteAnalysisRepository::try_new(conn)?.current_published_scores(&ids)?;
        Ok::<_, ServiceError>((projects, catalog, scores))
    });
    let (projects, catalog, scores) = match loaded {
        Ok(loaded) => loaded,
        Err(err) => {
            warn!(
                "event=compare module=service status=rejected reason={} projects={}",
                err.code(),
                slugs.len()
            );
            return Err(err);
        }
    };

    let rollups: Vec<ProjectRollup<'_>> = projects
        .iter()
        .map(|project| rollup_project(&catalog, project.id, &scores))
        .collect();
    let table = build_table(&projects, &rollups, locale);

    info!(
        "event=compare module=service status=ok projects={} categories={} duration_ms={}",
        projects.len(),
        table.categories.len(),
        started_at.elapsed().as_millis()
    );
    Ok(table)
}

fn load_compared_projects(conn: &Connection, slugs: &[String]) -> ServiceResult<Vec<Project>> {
    let mut found = SqliteProjectRepository::try_new(conn)?.get_projects_by_slugs(slugs)?;

    let missing: Vec<String> = slugs
        .iter()
        .filter(|slug| !found.iter().any(|project| &project.slug == *slug))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(ComparisonValidationError::SlugNotFound(missing).into());
    }

    let unpublished: Vec<String> = slugs
        .iter()
        .filter(|slug| {
            found
                .iter()
                .any(|project| &project.slug == *slug && !project.is_published())
        })
        .cloned()
        .collect();
    if !unpublished.is_empty() {
        return Err(ComparisonValidationError::NotPublished(unpublished).into());
    }

    let mut ordered = Vec::with_capacity(slugs.len());
    for slug in slugs {
        if let Some(index) = found.iter().position(|project| &project.slug == slug) {
            ordered.push(found.swap_remove(index));
        }
    }
    Ok(ordered)
}

fn build_table(
    projects: &[Project],
    rollups: &[ProjectRollup<'_>],
    locale: &str,
) -> ComparisonTable {
    let categories = match rollups.first() {
        Some(first) => first
            .categories
            .iter()
            .enumerate()
            .map(|(category_index, category)| ComparisonCategoryRow {
                slug: category.category.slug.clone(),
                name: resolve(category.category, locale).name,
                scores: rollups
                    .iter()
                    .map(|rollup| rollup.categories[category_index].score.into())
                    .collect(),
                fields: category
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(field_index, field)| ComparisonFieldRow {
                        slug: field.field.slug.clone(),
                        name: resolve(field.field, locale).name,
                        scores: rollups
                            .iter()
                            .map(|rollup| {
                                rollup.categories[category_index].fields[field_index]
                                    .score
                                    .into()
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect(),
        None => Vec::new(),
    };

    ComparisonTable {
        projects: projects.iter().map(ProjectSummary::from).collect(),
        categories,
        overall: rollups.iter().map(|rollup| rollup.overall.into()).collect(),
    }
}
