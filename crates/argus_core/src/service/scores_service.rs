//! Per-project score and overview use-cases.
//!
//! # Responsibility
//! - Build the localized score tree of one published project.
//! - Serve the project's overview block.
//!
//! # Invariants
//! - Draft and in-review projects are reported as not found.
//! - The score tree always covers the full catalog hierarchy.

use crate::db::with_read_snapshot;
use crate::i18n::resolver::resolve;
use crate::model::project::{Block, BlockKind, Project};
use crate::repo::analysis_repo::{AnalysisRepository, SqliteAnalysisRepository};
use crate::repo::catalog_repo::{CatalogRepository, SqliteCatalogRepository};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::scoring::cell::ScoreCell;
use crate::scoring::rollup::{rollup_project, ProjectRollup};
use crate::service::{ServiceError, ServiceResult};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldScoreView {
    pub slug: String,
    pub name: String,
    pub score: ScoreCell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryScoreView {
    pub slug: String,
    pub name: String,
    pub score: ScoreCell,
    pub fields: Vec<FieldScoreView>,
}

/// Localized score tree of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectScores {
    pub slug: String,
    pub name: String,
    pub overall: ScoreCell,
    pub categories: Vec<CategoryScoreView>,
}

/// Returns overall, category and field scores of a published project.
pub fn project_scores(conn: &Connection, slug: &str, locale: &str) -> ServiceResult<ProjectScores> {
    let started_at = Instant::now();
    let (project, catalog, scores) = with_read_snapshot(conn, |conn| {
        let project = load_published_project(conn, slug)?;
        let catalog = SqliteCatalogRepository::try_new(conn)?.load_catalog()?;
        let scores =
            SqliteAnalysisRepository::try_new(conn)?.current_published_scores(&[project.id])?;
        Ok::<_, ServiceError>((project, catalog, scores))
    })?;

    let rollup = rollup_project(&catalog, project.id, &scores);
    let view = score_tree(&project, &rollup, locale);

    info!(
        "event=project_scores module=service status=ok categories={} duration_ms={}",
        view.categories.len(),
        started_at.elapsed().as_millis()
    );
    Ok(view)
}

/// Returns the overview block of a published project in exactly `locale`.
///
/// A locale with no stored block, well-formed or not, yields `None`.
pub fn project_overview(
    conn: &Connection,
    slug: &str,
    locale: &str,
) -> ServiceResult<Option<Block>> {
    with_read_snapshot(conn, |conn| {
        let project = load_published_project(conn, slug)?;
        let block = SqliteProjectRepository::try_new(conn)?.get_block(
            project.id,
            BlockKind::Overview,
            locale,
        )?;
        Ok(block)
    })
}

/// Loads a project by slug, hiding anything that is not published.
pub(crate) fn load_published_project(conn: &Connection, slug: &str) -> ServiceResult<Project> {
    let repo = SqliteProjectRepository::try_new(conn)?;
    match repo.get_project_by_slug(slug)? {
        Some(project) if project.is_published() => Ok(project),
        _ => Err(ServiceError::not_found("project", slug)),
    }
}

fn score_tree(project: &Project, rollup: &ProjectRollup<'_>, locale: &str) -> ProjectScores {
    let categories = rollup
        .categories
        .iter()
        .map(|category| CategoryScoreView {
            slug: category.category.slug.clone(),
            name: resolve(category.category, locale).name,
            score: category.score.into(),
            fields: category
                .fields
                .iter()
                .map(|field| FieldScoreView {
                    slug: field.field.slug.clone(),
                    name: resolve(field.field, locale).name,
                    score: field.score.into(),
                })
                .collect(),
        })
        .collect();

    ProjectScores {
        slug: project.slug.clone(),
        name: project.name.clone(),
        overall: rollup.overall.into(),
        categories,
    }
}
