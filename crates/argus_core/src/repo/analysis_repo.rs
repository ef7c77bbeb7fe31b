//! Analysis result storage.
//!
//! Results are historical: re-analysis inserts a new row. The current score
//! of a (project, field) pair is its latest published row, by
//! `created_at DESC, id DESC`.

use crate::model::catalog::FieldId;
use crate::model::project::ProjectId;
use crate::model::scoring::{AnalysisResult, AnalysisResultId, NewAnalysisResult};
use crate::repo::support::{
    bool_to_int, ensure_schema_current, int_to_bool, parse_decimal, placeholders,
};
use crate::repo::{RepoError, RepoResult};
use rust_decimal::Decimal;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::HashMap;

pub trait AnalysisRepository {
    fn record_result(&self, result: &NewAnalysisResult) -> RepoResult<AnalysisResultId>;
    fn set_published(&self, result_id: AnalysisResultId, published: bool) -> RepoResult<()>;
    fn get_result(&self, result_id: AnalysisResultId) -> RepoResult<Option<AnalysisResult>>;
    /// Returns current published scores for every listed project in one query.
    ///
    /// Pairs without any published result are absent from the map.
    fn current_published_scores(
        &self,
        project_ids: &[ProjectId],
    ) -> RepoResult<HashMap<(ProjectId, FieldId), Decimal>>;
}

pub struct SqliteAnalysisRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAnalysisRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_current(conn)?;
        Ok(Self { conn })
    }
}

impl AnalysisRepository for SqliteAnalysisRepository<'_> {
    fn record_result(&self, result: &NewAnalysisResult) -> RepoResult<AnalysisResultId> {
        result.validate()?;
        self.conn.execute(
            "INSERT INTO analysis_results (project_id, field_id, score, is_published, is_manual)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                result.project_id,
                result.field_id,
                result.score.normalize().to_string(),
                bool_to_int(result.is_published),
                bool_to_int(result.is_manual),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn set_published(&self, result_id: AnalysisResultId, published: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE analysis_results SET is_published = ?2 WHERE id = ?1;",
            params![result_id, bool_to_int(published)],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("analysis result", result_id));
        }
        Ok(())
    }

    fn get_result(&self, result_id: AnalysisResultId) -> RepoResult<Option<AnalysisResult>> {
        self.conn
            .query_row(
                "SELECT id, project_id, field_id, score, is_published, is_manual, created_at
                 FROM analysis_results
                 WHERE id = ?1;",
                [result_id],
                |row| Ok(parse_result_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn current_published_scores(
        &self,
        project_ids: &[ProjectId],
    ) -> RepoResult<HashMap<(ProjectId, FieldId), Decimal>> {
        let mut scores = HashMap::new();
        if project_ids.is_empty() {
            return Ok(scores);
        }

        let sql = format!(
            "SELECT ar.project_id AS project_id, ar.field_id AS field_id, ar.score AS score
             FROM analysis_results ar
             WHERE ar.project_id IN ({})
               AND ar.is_published = 1
               AND ar.id = (
                   SELECT latest.id
                   FROM analysis_results latest
                   WHERE latest.project_id = ar.project_id
                     AND latest.field_id = ar.field_id
                     AND latest.is_published = 1
                   ORDER BY latest.created_at DESC, latest.id DESC
                   LIMIT 1
               );",
            placeholders(project_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(project_ids.iter()))?;
        while let Some(row) = rows.next()? {
            let score: String = row.get("score")?;
            scores.insert(
                (row.get("project_id")?, row.get("field_id")?),
                parse_decimal(&score, "analysis_results.score")?,
            );
        }
        Ok(scores)
    }
}

fn parse_result_row(row: &Row<'_>) -> RepoResult<AnalysisResult> {
    let score: String = row.get("score")?;
    Ok(AnalysisResult {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        field_id: row.get("field_id")?,
        score: parse_decimal(&score, "analysis_results.score")?,
        is_published: int_to_bool(row.get("is_published")?, "analysis_results.is_published")?,
        is_manual: int_to_bool(row.get("is_manual")?, "analysis_results.is_manual")?,
        created_at: row.get("created_at")?,
    })
}
