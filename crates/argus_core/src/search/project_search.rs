//! Public project discovery: text search, featured list and tag listing.
//!
//! # Responsibility
//! - Find published projects by name or localized block content.
//! - Serve the featured and per-tag listings.
//!
//! # Invariants
//! - Only published projects are ever returned.
//! - Every listing is ordered by `cmp_public_order` and holds each project
//!   at most once.
//! - Each call reads one database snapshot.

use crate::db::{with_read_snapshot, DbError};
use crate::model::project::{cmp_public_order, Project, ProjectId, Tag};
use crate::model::validation::normalize_locale;
use crate::repo::project_repo::{parse_project_row, parse_tag_row, PROJECT_SELECT_SQL};
use crate::repo::RepoError;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Default size of the featured listing.
pub const DEFAULT_FEATURED_LIMIT: u32 = 20;

pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug)]
pub enum SearchError {
    /// No tag carries the requested slug.
    TagNotFound(String),
    Repo(RepoError),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TagNotFound(slug) => write!(f, "tag not found: {slug}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TagNotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SearchError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::Db(DbError::Sqlite(value)))
    }
}

/// Slug and name of a listed project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub slug: String,
    pub name: String,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            slug: project.slug.clone(),
            name: project.name.clone(),
        }
    }
}

/// A tag with its published projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagListing {
    pub tag: Tag,
    pub projects: Vec<Project>,
}

/// Searches published projects by name or by their block in `locale`.
///
/// Matching is a case-insensitive substring test on Unicode lowercase.
/// Returns an empty list for blank queries.
pub fn search_projects(conn: &Connection, query: &str, locale: &str) -> SearchResult<Vec<Project>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(Vec::new());
    }

    let started_at = Instant::now();
    let locale = normalize_locale(locale);
    let projects = with_read_snapshot(conn, |conn| {
        let published = load_published(conn)?;
        let block_hits = projects_with_matching_block(conn, &locale, &needle)?;
        Ok::<_, SearchError>(
            published
                .into_iter()
                .filter(|project| {
                    block_hits.contains(&project.id)
                        || project.name.to_lowercase().contains(&needle)
                })
                .collect::<Vec<_>>(),
        )
    })?;
    let projects = sorted_public(projects);

    info!(
        "event=project_search module=search status=ok query_len={} hits={} duration_ms={}",
        needle.chars().count(),
        projects.len(),
        started_at.elapsed().as_millis()
    );
    Ok(projects)
}

/// Lists featured published projects, most recently featured first.
pub fn featured_projects(conn: &Connection, limit: u32) -> SearchResult<Vec<Project>> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(&format!(
        "{PROJECT_SELECT_SQL}
         WHERE projects.state = 'published'
           AND projects.featured_at IS NOT NULL
         ORDER BY projects.featured_at DESC, projects.created_at DESC, projects.id DESC
         LIMIT ?1;"
    ))?;
    let mut rows = stmt.query([i64::from(limit)])?;
    let mut projects = Vec::new();
    while let Some(row) = rows.next()? {
        projects.push(parse_project_row(row)?);
    }
    Ok(projects)
}

/// Returns a tag and its published projects.
pub fn projects_by_tag(conn: &Connection, tag_slug: &str) -> SearchResult<TagListing> {
    with_read_snapshot(conn, |conn| {
        let tag = conn
            .query_row(
                "SELECT id, name, slug FROM tags WHERE slug = ?1;",
                [tag_slug],
                parse_tag_row,
            )
            .optional()?
            .ok_or_else(|| SearchError::TagNotFound(tag_slug.to_string()))?;

        let mut stmt = conn.prepare(&format!(
            "{PROJECT_SELECT_SQL}
             INNER JOIN project_tags ON project_tags.project_id = projects.id
             WHERE project_tags.tag_id = ?1
               AND projects.state = 'published';"
        ))?;
        let mut rows = stmt.query(params![tag.id])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }

        Ok(TagListing {
            tag,
            projects: sorted_public(projects),
        })
    })
}

fn load_published(conn: &Connection) -> SearchResult<Vec<Project>> {
    let mut stmt = conn.prepare(&format!(
        "{PROJECT_SELECT_SQL} WHERE projects.state = 'published';"
    ))?;
    let mut rows = stmt.query([])?;
    let mut projects = Vec::new();
    while let Some(row) = rows.next()? {
        projects.push(parse_project_row(row)?);
    }
    Ok(projects)
}

fn projects_with_matching_block(
    conn: &Connection,
    locale: &str,
    needle: &str,
) -> SearchResult<HashSet<ProjectId>> {
    let mut stmt = conn.prepare(
        "SELECT blocks.project_id AS project_id, blocks.content AS content
         FROM blocks
         INNER JOIN projects ON projects.id = blocks.project_id
         WHERE blocks.locale = ?1
           AND projects.state = 'published';",
    )?;
    let mut rows = stmt.query([locale])?;
    let mut hits = HashSet::new();
    while let Some(row) = rows.next()? {
        let content: String = row.get("content")?;
        if content.to_lowercase().contains(needle) {
            hits.insert(row.get("project_id")?);
        }
    }
    Ok(hits)
}

fn sorted_public(mut projects: Vec<Project>) -> Vec<Project> {
    projects.sort_by(cmp_public_order);
    projects.dedup_by_key(|project| project.id);
    projects
}
