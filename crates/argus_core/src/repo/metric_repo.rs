//! Append-only metric value storage.
//!
//! # Responsibility
//! - Record raw observations pushed by external collectors.
//! - Answer latest-value and full-series reads.
//!
//! # Invariants
//! - Rows are never updated or deleted by this repository.
//! - Identical observations are accepted as distinct rows.
//! - Ties on `collected_at` are broken by insertion order (row id).

use crate::model::catalog::MetricId;
use crate::model::project::ProjectId;
use crate::model::scoring::{MetricValue, NewMetricValue};
use crate::repo::support::{ensure_schema_current, parse_decimal};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const VALUE_SELECT_SQL: &str = "SELECT
    id,
    uuid,
    metric_id,
    project_id,
    value,
    collected_at,
    source
FROM metric_values";

/// Repository interface for metric time series.
pub trait MetricValueRepository {
    /// Appends one observation; never mutates existing rows.
    fn append_value(&self, value: &NewMetricValue) -> RepoResult<MetricValue>;
    /// Returns the observation with the greatest `collected_at`.
    fn latest_value(
        &self,
        metric_id: MetricId,
        project_id: ProjectId,
    ) -> RepoResult<Option<MetricValue>>;
    /// Returns the full series ordered by `collected_at ASC`.
    fn list_values(&self, metric_id: MetricId, project_id: ProjectId)
        -> RepoResult<Vec<MetricValue>>;
}

/// SQLite-backed metric value repository.
pub struct SqliteMetricValueRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMetricValueRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_current(conn)?;
        Ok(Self { conn })
    }
}

impl MetricValueRepository for SqliteMetricValueRepository<'_> {
    fn append_value(&self, value: &NewMetricValue) -> RepoResult<MetricValue> {
        let source = value.validate()?;
        let uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO metric_values (uuid, metric_id, project_id, value, collected_at, source)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                uuid.to_string(),
                value.metric_id,
                value.project_id,
                value.value.normalize().to_string(),
                value.collected_at,
                source,
            ],
        )?;

        Ok(MetricValue {
            uuid,
            metric_id: value.metric_id,
            project_id: value.project_id,
            value: value.value.normalize(),
            collected_at: value.collected_at,
            source,
            sequence: self.conn.last_insert_rowid(),
        })
    }

    fn latest_value(
        &self,
        metric_id: MetricId,
        project_id: ProjectId,
    ) -> RepoResult<Option<MetricValue>> {
        self.conn
            .query_row(
                &format!(
                    "{VALUE_SELECT_SQL}
                     WHERE metric_id = ?1
                       AND project_id = ?2
                     ORDER BY collected_at DESC, id DESC
                     LIMIT 1;"
                ),
                params![metric_id, project_id],
                |row| Ok(parse_value_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_values(
        &self,
        metric_id: MetricId,
        project_id: ProjectId,
    ) -> RepoResult<Vec<MetricValue>> {
        let mut stmt = self.conn.prepare(&format!(
            "{VALUE_SELECT_SQL}
             WHERE metric_id = ?1
               AND project_id = ?2
             ORDER BY collected_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![metric_id, project_id])?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            values.push(parse_value_row(row)?);
        }
        Ok(values)
    }
}

fn parse_value_row(row: &Row<'_>) -> RepoResult<MetricValue> {
    let uuid: String = row.get("uuid")?;
    let value: String = row.get("value")?;
    Ok(MetricValue {
        uuid: Uuid::parse_str(&uuid).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid `{uuid}` in metric_values.uuid"))
        })?,
        metric_id: row.get("metric_id")?,
        project_id: row.get("project_id")?,
        value: parse_decimal(&value, "metric_values.value")?,
        collected_at: row.get("collected_at")?,
        source: row.get("source")?,
        sequence: row.get("id")?,
    })
}
