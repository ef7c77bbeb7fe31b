mod common;

use argus_core::repo::metric_repo::{MetricValueRepository, SqliteMetricValueRepository};
use argus_core::{
    append_metric_value, field_metric_series, AppendMetricValueRequest, MetricService,
    ModelValidationError, NewMetricValue, Resolution, ServiceError,
};
use common::{dec, draft_project, published_project, seeded};
use std::collections::HashSet;

fn request(project: &str, value: &str, collected_at: i64) -> AppendMetricValueRequest {
    AppendMetricValueRequest {
        category_slug: "community".to_string(),
        field_slug: "activity".to_string(),
        metric_slug: "commits".to_string(),
        project_slug: project.to_string(),
        value: dec(value),
        source: "github".to_string(),
        collected_at,
    }
}

#[test]
fn identical_observations_are_kept_as_distinct_rows() {
    let fixture = seeded();
    let project = published_project(&fixture.conn, "django", "Django");

    let first = append_metric_value(&fixture.conn, &request("django", "42", 1_000)).unwrap();
    let second = append_metric_value(&fixture.conn, &request("django", "42", 1_000)).unwrap();
    assert_ne!(first, second);

    let repo = SqliteMetricValueRepository::try_new(&fixture.conn).unwrap();
    let values = repo.list_values(fixture.commits, project).unwrap();
    assert_eq!(values.len(), 2);
    let ids: HashSet<_> = values.iter().map(|value| value.uuid).collect();
    assert!(ids.contains(&first) && ids.contains(&second));
}

#[test]
fn latest_value_prefers_collected_at_then_insertion() {
    let fixture = seeded();
    let project = published_project(&fixture.conn, "django", "Django");
    let service = MetricService::new(SqliteMetricValueRepository::try_new(&fixture.conn).unwrap());
    let observe = |value: &str, collected_at: i64| NewMetricValue {
        metric_id: fixture.commits,
        project_id: project,
        value: dec(value),
        source: "github".to_string(),
        collected_at,
    };

    assert!(service
        .latest_value(fixture.commits, project)
        .unwrap()
        .is_none());

    service.append_value(&observe("10", 3_000)).unwrap();
    service.append_value(&observe("99", 1_000)).unwrap();
    assert_eq!(
        service
            .latest_value(fixture.commits, project)
            .unwrap()
            .unwrap()
            .value,
        dec("10")
    );

    let tie = service.append_value(&observe("11", 3_000)).unwrap();
    let latest = service
        .latest_value(fixture.commits, project)
        .unwrap()
        .unwrap();
    assert_eq!(latest.uuid, tie.uuid);
    assert_eq!(latest.value, dec("11"));

    let series: Vec<_> = service
        .list_values(fixture.commits, project)
        .unwrap()
        .into_iter()
        .map(|value| value.value)
        .collect();
    assert_eq!(series, vec![dec("99"), dec("10"), dec("11")]);
}

#[test]
fn unknown_slugs_are_not_found_per_level() {
    let fixture = seeded();
    published_project(&fixture.conn, "django", "Django");

    let cases = [
        ("category", {
            let mut req = request("django", "1", 1);
            req.category_slug = "nope".to_string();
            req
        }),
        ("field", {
            let mut req = request("django", "1", 1);
            req.field_slug = "nope".to_string();
            req
        }),
        ("metric", {
            let mut req = request("django", "1", 1);
            req.metric_slug = "nope".to_string();
            req
        }),
        ("project", request("ghost", "1", 1)),
    ];

    for (expected, req) in cases {
        let err = append_metric_value(&fixture.conn, &req).unwrap_err();
        match err {
            ServiceError::NotFound { entity, .. } => assert_eq!(entity, expected),
            other => panic!("expected not found for {expected}, got {other}"),
        }
    }
}

#[test]
fn invalid_values_and_sources_are_rejected() {
    let fixture = seeded();
    published_project(&fixture.conn, "django", "Django");

    let err = append_metric_value(&fixture.conn, &request("django", "1.23456", 1)).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ModelValidationError::ValuePrecision(_))
    ));

    let err = append_metric_value(
        &fixture.conn,
        &request("django", "123456789012345678901", 1),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ModelValidationError::ValueOutOfRange(_))
    ));

    let mut blank = request("django", "1", 1);
    blank.source = "  ".to_string();
    let err = append_metric_value(&fixture.conn, &blank).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ModelValidationError::BlankSource)
    ));

    // Negative values and four fractional digits are fine.
    append_metric_value(&fixture.conn, &request("django", "-0.1234", 1)).unwrap();
}

#[test]
fn ingestion_accepts_unpublished_projects() {
    let fixture = seeded();
    let project = draft_project(&fixture.conn, "drafty", "Drafty");

    append_metric_value(&fixture.conn, &request("drafty", "7", 1)).unwrap();
    let repo = SqliteMetricValueRepository::try_new(&fixture.conn).unwrap();
    assert_eq!(repo.list_values(fixture.commits, project).unwrap().len(), 1);
}

#[test]
fn field_series_lists_enabled_metrics_with_data() {
    let fixture = seeded();
    let project = published_project(&fixture.conn, "django", "Django");
    append_metric_value(&fixture.conn, &request("django", "5", 2_000)).unwrap();
    append_metric_value(&fixture.conn, &request("django", "3", 1_000)).unwrap();

    // Disabled metrics stay hidden even when they hold data.
    SqliteMetricValueRepository::try_new(&fixture.conn)
        .unwrap()
        .append_value(&NewMetricValue {
            metric_id: fixture.stars,
            project_id: project,
            value: dec("1000"),
            source: "github".to_string(),
            collected_at: 1_000,
        })
        .unwrap();

    let series =
        field_metric_series(&fixture.conn, "django", "community", "activity", "de").unwrap();
    assert_eq!(series.project.slug, "django");
    assert_eq!(series.field.name, "Activity");
    assert_eq!(series.field.resolution, Resolution::English);
    assert_eq!(series.metrics.len(), 1);

    let commits = &series.metrics[0];
    assert_eq!(commits.slug, "commits");
    assert_eq!(
        commits.name.description.as_deref(),
        Some("Commits over the last 30 days")
    );
    let values: Vec<_> = commits.values.iter().map(|value| value.value).collect();
    assert_eq!(values, vec![dec("3"), dec("5")]);

    let json = serde_json::to_value(&series).unwrap();
    assert_eq!(json["metrics"][0]["values"][0]["value"], "3");
    assert_eq!(json["metrics"][0]["values"][0]["source"], "github");
}

#[test]
fn field_series_requires_a_published_project() {
    let fixture = seeded();
    draft_project(&fixture.conn, "drafty", "Drafty");

    let err =
        field_metric_series(&fixture.conn, "drafty", "community", "activity", "en").unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "project", .. }));
}
