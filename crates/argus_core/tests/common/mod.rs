#![allow(dead_code)]

use argus_core::db::open_db_in_memory;
use argus_core::model::catalog::{CategoryId, FieldId, MetricId};
use argus_core::model::project::ProjectId;
use argus_core::repo::analysis_repo::{AnalysisRepository, SqliteAnalysisRepository};
use argus_core::repo::catalog_repo::{CatalogRepository, SqliteCatalogRepository};
use argus_core::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use argus_core::{NewAnalysisResult, NewCategory, NewField, NewMetric, NewProject, NewTranslation};
use argus_core::ProjectState;
use rust_decimal::Decimal;
use rusqlite::{params, Connection};
use std::str::FromStr;

/// Two-category catalog:
///
/// - `security` (weight 2): `vulnerabilities` (weight 2), `audits` (weight 1,
///   no translation)
/// - `community` (weight 1): `activity` (weight 1) with metrics `commits`
///   and `stars` (collection disabled)
pub struct Fixture {
    pub conn: Connection,
    pub security: CategoryId,
    pub vulnerabilities: FieldId,
    pub audits: FieldId,
    pub community: CategoryId,
    pub activity: FieldId,
    pub commits: MetricId,
    pub stars: MetricId,
}

pub fn seeded() -> Fixture {
    let conn = open_db_in_memory().unwrap();
    let (security, vulnerabilities, audits, community, activity, commits, stars) = {
        let repo = SqliteCatalogRepository::try_new(&conn).unwrap();
        let security = repo
            .create_category(
                &NewCategory::new("security", 2)
                    .translated("en", "Security")
                    .translated("fr", "Sécurité"),
            )
            .unwrap();
        let vulnerabilities = repo
            .create_field(
                &NewField::new(security, "vulnerabilities", 2)
                    .translated("en", "Vulnerabilities")
                    .translated("fr", "Vulnérabilités"),
            )
            .unwrap();
        let audits = repo
            .create_field(&NewField::new(security, "audits", 1))
            .unwrap();
        let community = repo
            .create_category(&NewCategory::new("community", 1).translated("en", "Community"))
            .unwrap();
        let activity = repo
            .create_field(&NewField::new(community, "activity", 1).translated("en", "Activity"))
            .unwrap();
        let commits = repo
            .create_metric(
                &NewMetric::new(activity, "commits").translated(
                    NewTranslation::new("en", "Commits")
                        .with_description("Commits over the last 30 days"),
                ),
            )
            .unwrap();
        let mut stars_metric = NewMetric::new(activity, "stars");
        stars_metric.collection_enabled = false;
        let stars = repo.create_metric(&stars_metric).unwrap();
        (
            security,
            vulnerabilities,
            audits,
            community,
            activity,
            commits,
            stars,
        )
    };

    Fixture {
        conn,
        security,
        vulnerabilities,
        audits,
        community,
        activity,
        commits,
        stars,
    }
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub fn draft_project(conn: &Connection, slug: &str, name: &str) -> ProjectId {
    let repo = SqliteProjectRepository::try_new(conn).unwrap();
    repo.create_project(&NewProject::new(slug, name)).unwrap()
}

pub fn published_project(conn: &Connection, slug: &str, name: &str) -> ProjectId {
    let project_id = draft_project(conn, slug, name);
    let repo = SqliteProjectRepository::try_new(conn).unwrap();
    repo.transition_state(project_id, ProjectState::Published)
        .unwrap();
    project_id
}

pub fn publish_score(conn: &Connection, project_id: ProjectId, field_id: FieldId, score: &str) {
    let repo = SqliteAnalysisRepository::try_new(conn).unwrap();
    repo.record_result(&NewAnalysisResult::published(
        project_id,
        field_id,
        dec(score),
    ))
    .unwrap();
}

/// Pins `created_at` so ordering tests do not depend on the clock.
pub fn set_created_at(conn: &Connection, project_id: ProjectId, created_at: i64) {
    conn.execute(
        "UPDATE projects SET created_at = ?2 WHERE id = ?1;",
        params![project_id, created_at],
    )
    .unwrap();
}
