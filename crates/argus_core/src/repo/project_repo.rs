//! Project, tag and block repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist projects and drive their publication workflow.
//! - Maintain the project tag set and localized content blocks.
//!
//! # Invariants
//! - State changes go through `ProjectState::transition_to`.
//! - Tag replacement is atomic and leaves no partial tag set behind.
//! - Block upserts keep one row per (project, kind, locale).

use crate::model::project::{
    Block, BlockId, BlockKind, NewBlock, NewProject, Project, ProjectId, ProjectState, Tag, TagId,
};
use crate::model::validation::{normalize_locale, validate_name, validate_slug};
use crate::repo::support::{ensure_schema_current, placeholders};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};

pub(crate) const PROJECT_SELECT_SQL: &str = "SELECT
    projects.id AS id,
    projects.slug AS slug,
    projects.name AS name,
    projects.logo_url AS logo_url,
    projects.repository_url AS repository_url,
    projects.website_url AS website_url,
    projects.state AS state,
    projects.featured_at AS featured_at,
    projects.created_at AS created_at,
    projects.updated_at AS updated_at
FROM projects";

/// Repository interface for projects and their satellites.
pub trait ProjectRepository {
    /// Inserts a new draft project.
    fn create_project(&self, project: &NewProject) -> RepoResult<ProjectId>;
    fn get_project(&self, project_id: ProjectId) -> RepoResult<Option<Project>>;
    fn get_project_by_slug(&self, slug: &str) -> RepoResult<Option<Project>>;
    /// Loads every project whose slug is listed. Unknown slugs are skipped.
    fn get_projects_by_slugs(&self, slugs: &[String]) -> RepoResult<Vec<Project>>;
    /// Moves a project forward in its workflow and returns the new state.
    fn transition_state(&self, project_id: ProjectId, next: ProjectState)
        -> RepoResult<ProjectState>;
    /// Sets or clears the featured timestamp (epoch ms).
    fn set_featured_at(&self, project_id: ProjectId, featured_at: Option<i64>) -> RepoResult<()>;
    fn create_tag(&self, name: &str, slug: &str) -> RepoResult<TagId>;
    fn get_tag_by_slug(&self, slug: &str) -> RepoResult<Option<Tag>>;
    /// Replaces the full tag set of one project.
    fn set_project_tags(&self, project_id: ProjectId, tag_ids: &[TagId]) -> RepoResult<()>;
    /// Lists project tags sorted by name.
    fn list_project_tags(&self, project_id: ProjectId) -> RepoResult<Vec<Tag>>;
    /// Inserts or replaces the block for (project, kind, locale).
    fn upsert_block(&self, project_id: ProjectId, block: &NewBlock) -> RepoResult<BlockId>;
    fn get_block(
        &self,
        project_id: ProjectId,
        kind: BlockKind,
        locale: &str,
    ) -> RepoResult<Option<Block>>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_current(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &NewProject) -> RepoResult<ProjectId> {
        project.validate()?;
        self.conn.execute(
            "INSERT INTO projects (slug, name, logo_url, repository_url, website_url, state)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                project.slug,
                project.name.trim(),
                project.logo_url,
                project.repository_url,
                project.website_url,
                ProjectState::Draft.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_project(&self, project_id: ProjectId) -> RepoResult<Option<Project>> {
        self.conn
            .query_row(
                &format!("{PROJECT_SELECT_SQL} WHERE projects.id = ?1;"),
                [project_id],
                |row| Ok(parse_project_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn get_project_by_slug(&self, slug: &str) -> RepoResult<Option<Project>> {
        self.conn
            .query_row(
                &format!("{PROJECT_SELECT_SQL} WHERE projects.slug = ?1;"),
                [slug],
                |row| Ok(parse_project_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn get_projects_by_slugs(&self, slugs: &[String]) -> RepoResult<Vec<Project>> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "{PROJECT_SELECT_SQL} WHERE projects.slug IN ({}) ORDER BY projects.id ASC;",
            placeholders(slugs.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(slugs.iter()))?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn transition_state(
        &self,
        project_id: ProjectId,
        next: ProjectState,
    ) -> RepoResult<ProjectState> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current: Option<String> = tx
            .query_row(
                "SELECT state FROM projects WHERE id = ?1;",
                [project_id],
                |row| row.get(0),
            )
            .optional()?;
        let current = match current {
            Some(value) => parse_state(&value)?,
            None => return Err(RepoError::not_found("project", project_id)),
        };

        let target = current.transition_to(next)?;
        if target != current {
            tx.execute(
                "UPDATE projects
                 SET state = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![project_id, target.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(target)
    }

    fn set_featured_at(&self, project_id: ProjectId, featured_at: Option<i64>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET featured_at = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![project_id, featured_at],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("project", project_id));
        }
        Ok(())
    }

    fn create_tag(&self, name: &str, slug: &str) -> RepoResult<TagId> {
        let name = validate_name(name)?;
        let slug = validate_slug(slug)?;
        self.conn.execute(
            "INSERT INTO tags (name, slug) VALUES (?1, ?2);",
            params![name, slug],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_tag_by_slug(&self, slug: &str) -> RepoResult<Option<Tag>> {
        let tag = self
            .conn
            .query_row(
                "SELECT id, name, slug FROM tags WHERE slug = ?1;",
                [slug],
                parse_tag_row,
            )
            .optional()?;
        Ok(tag)
    }

    fn set_project_tags(&self, project_id: ProjectId, tag_ids: &[TagId]) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !project_exists(&tx, project_id)? {
            return Err(RepoError::not_found("project", project_id));
        }

        tx.execute(
            "DELETE FROM project_tags WHERE project_id = ?1;",
            [project_id],
        )?;
        for tag_id in tag_ids {
            tx.execute(
                "INSERT OR IGNORE INTO project_tags (project_id, tag_id) VALUES (?1, ?2);",
                params![project_id, tag_id],
            )?;
        }
        tx.execute(
            "UPDATE projects
             SET updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [project_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn list_project_tags(&self, project_id: ProjectId) -> RepoResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT tags.id AS id, tags.name AS name, tags.slug AS slug
             FROM tags
             INNER JOIN project_tags ON project_tags.tag_id = tags.id
             WHERE project_tags.project_id = ?1
             ORDER BY tags.name COLLATE NOCASE ASC, tags.id ASC;",
        )?;
        let tags = stmt
            .query_map([project_id], parse_tag_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    fn upsert_block(&self, project_id: ProjectId, block: &NewBlock) -> RepoResult<BlockId> {
        let locale = block.validate()?;
        let block_id = self.conn.query_row(
            "INSERT INTO blocks (project_id, kind, locale, content)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (project_id, kind, locale) DO UPDATE
             SET content = excluded.content,
                 updated_at = (strftime('%s', 'now') * 1000)
             RETURNING id;",
            params![project_id, block.kind.as_str(), locale, block.content],
            |row| row.get(0),
        )?;
        Ok(block_id)
    }

    fn get_block(
        &self,
        project_id: ProjectId,
        kind: BlockKind,
        locale: &str,
    ) -> RepoResult<Option<Block>> {
        let locale = normalize_locale(locale);
        self.conn
            .query_row(
                "SELECT id, project_id, kind, locale, content
                 FROM blocks
                 WHERE project_id = ?1
                   AND kind = ?2
                   AND locale = ?3;",
                params![project_id, kind.as_str(), locale],
                |row| Ok(parse_block_row(row)),
            )
            .optional()?
            .transpose()
    }
}

pub(crate) fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let state: String = row.get("state")?;
    Ok(Project {
        id: row.get("id")?,
        slug: row.get("slug")?,
        name: row.get("name")?,
        logo_url: row.get("logo_url")?,
        repository_url: row.get("repository_url")?,
        website_url: row.get("website_url")?,
        state: parse_state(&state)?,
        featured_at: row.get("featured_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn parse_tag_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get("id")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
    })
}

fn parse_block_row(row: &Row<'_>) -> RepoResult<Block> {
    let kind: String = row.get("kind")?;
    Ok(Block {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        kind: BlockKind::parse(&kind).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid block kind `{kind}` in blocks.kind"))
        })?,
        locale: row.get("locale")?,
        content: row.get("content")?,
    })
}

fn parse_state(value: &str) -> RepoResult<ProjectState> {
    ProjectState::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid project state `{value}` in projects.state"))
    })
}

fn project_exists(conn: &Connection, project_id: ProjectId) -> RepoResult<bool> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM projects WHERE id = ?1 LIMIT 1;",
            [project_id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    Ok(exists)
}
