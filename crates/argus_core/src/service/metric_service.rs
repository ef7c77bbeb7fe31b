//! Metric ingestion and series use-cases.
//!
//! # Responsibility
//! - Accept raw observations addressed by slugs from external collectors.
//! - Serve the localized metric series of one field for a published project.
//!
//! # Invariants
//! - Ingestion only appends; identical requests create distinct rows.
//! - Unknown category, field, metric or project slugs are `NotFound`.
//! - Series only list collection-enabled metrics that have data.

use crate::db::with_read_snapshot;
use crate::i18n::resolver::{resolve, DisplayName};
use crate::model::catalog::MetricId;
use crate::model::project::ProjectId;
use crate::model::scoring::{MetricValue, MetricValueId, NewMetricValue};
use crate::repo::catalog_repo::{CatalogRepository, SqliteCatalogRepository};
use crate::repo::metric_repo::{MetricValueRepository, SqliteMetricValueRepository};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::RepoResult;
use crate::search::project_search::ProjectSummary;
use crate::service::scores_service::load_published_project;
use crate::service::{ServiceError, ServiceResult};
use log::{error, info};
use rust_decimal::Decimal;
use rusqlite::Connection;
use serde::Serialize;
use std::time::Instant;

/// Use-case service wrapper for metric time series.
pub struct MetricService<R: MetricValueRepository> {
    repo: R,
}

impl<R: MetricValueRepository> MetricService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends one observation by ids.
    pub fn append_value(&self, value: &NewMetricValue) -> RepoResult<MetricValue> {
        self.repo.append_value(value)
    }

    /// Returns the most recent observation; ties go to the later insertion.
    pub fn latest_value(
        &self,
        metric_id: MetricId,
        project_id: ProjectId,
    ) -> RepoResult<Option<MetricValue>> {
        self.repo.latest_value(metric_id, project_id)
    }

    pub fn list_values(
        &self,
        metric_id: MetricId,
        project_id: ProjectId,
    ) -> RepoResult<Vec<MetricValue>> {
        self.repo.list_values(metric_id, project_id)
    }
}

/// Slug-addressed observation pushed by a collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendMetricValueRequest {
    pub category_slug: String,
    pub field_slug: String,
    pub metric_slug: String,
    pub project_slug: String,
    pub value: Decimal,
    pub source: String,
    /// Epoch ms of the observation.
    pub collected_at: i64,
}

/// Resolves slugs and appends one observation, returning its id.
pub fn append_metric_value(
    conn: &Connection,
    request: &AppendMetricValueRequest,
) -> ServiceResult<MetricValueId> {
    let started_at = Instant::now();
    match append_resolved(conn, request) {
        Ok(value) => {
            info!(
                "event=metric_append module=service status=ok metric_id={} project_id={} duration_ms={}",
                value.metric_id,
                value.project_id,
                started_at.elapsed().as_millis()
            );
            Ok(value.uuid)
        }
        Err(err) => {
            error!(
                "event=metric_append module=service status=error error_code={} duration_ms={}",
                err.code(),
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn append_resolved(
    conn: &Connection,
    request: &AppendMetricValueRequest,
) -> ServiceResult<MetricValue> {
    let catalog = SqliteCatalogRepository::try_new(conn)?;
    if catalog.find_category(&request.category_slug)?.is_none() {
        return Err(ServiceError::not_found("category", &request.category_slug));
    }
    if catalog
        .find_field(&request.category_slug, &request.field_slug)?
        .is_none()
    {
        return Err(ServiceError::not_found(
            "field",
            format!("{}/{}", request.category_slug, request.field_slug),
        ));
    }
    let metric = catalog
        .find_metric(
            &request.category_slug,
            &request.field_slug,
            &request.metric_slug,
        )?
        .ok_or_else(|| {
            ServiceError::not_found(
                "metric",
                format!(
                    "{}/{}/{}",
                    request.category_slug, request.field_slug, request.metric_slug
                ),
            )
        })?;
    let project = SqliteProjectRepository::try_new(conn)?
        .get_project_by_slug(&request.project_slug)?
        .ok_or_else(|| ServiceError::not_found("project", &request.project_slug))?;

    let service = MetricService::new(SqliteMetricValueRepository::try_new(conn)?);
    let value = service.append_value(&NewMetricValue {
        metric_id: metric.id,
        project_id: project.id,
        value: request.value,
        source: request.source.clone(),
        collected_at: request.collected_at,
    })?;
    Ok(value)
}

/// Ordered observations of one metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricSeries {
    pub slug: String,
    pub name: DisplayName,
    pub values: Vec<MetricValue>,
}

/// Localized metric series of one field for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMetricSeries {
    pub project: ProjectSummary,
    pub category: DisplayName,
    pub field: DisplayName,
    pub metrics: Vec<MetricSeries>,
}

/// Returns every enabled metric series of a field for a published project.
pub fn field_metric_series(
    conn: &Connection,
    project_slug: &str,
    category_slug: &str,
    field_slug: &str,
    locale: &str,
) -> ServiceResult<FieldMetricSeries> {
    with_read_snapshot(conn, |conn| {
        let project = load_published_project(conn, project_slug)?;
        let catalog = SqliteCatalogRepository::try_new(conn)?;
        let category = catalog
            .find_category(category_slug)?
            .ok_or_else(|| ServiceError::not_found("category", category_slug))?;
        let field = catalog
            .find_field(category_slug, field_slug)?
            .ok_or_else(|| {
                ServiceError::not_found("field", format!("{category_slug}/{field_slug}"))
            })?;

        let service = MetricService::new(SqliteMetricValueRepository::try_new(conn)?);
        let mut metrics = Vec::new();
        for metric in catalog.list_metrics(field.id)? {
            if !metric.collection_enabled {
                continue;
            }
            let values = service.list_values(metric.id, project.id)?;
            if values.is_empty() {
                continue;
            }
            metrics.push(MetricSeries {
                name: resolve(&metric, locale),
                slug: metric.slug,
                values,
            });
        }

        Ok(FieldMetricSeries {
            project: ProjectSummary::from(&project),
            category: resolve(&category, locale),
            field: resolve(&field, locale),
            metrics,
        })
    })
}
