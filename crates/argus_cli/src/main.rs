//! `argus` command line entry point.
//!
//! Every subcommand prints its result as pretty JSON on stdout.

mod cli;

use anyhow::{Context, Result};
use argus_core::{
    append_metric_value, compare_projects, default_log_level, featured_projects,
    field_metric_series, init_logging, open_db, project_scores, projects_by_tag,
    search_projects, AppendMetricValueRequest, ProjectSummary, ServiceError,
};
use cli::{Cli, Commands};
use log::error;
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database {}", cli.db.display()))?;

    let output = match cli.command {
        Commands::Scores { slug, locale } => {
            serde_json::to_value(project_scores(&conn, &slug, &locale)?)?
        }

        Commands::Compare { slugs, locale } => match compare_projects(&conn, &slugs, &locale) {
            Ok(table) => serde_json::to_value(table)?,
            Err(ServiceError::Comparison(err)) => {
                println!("{}", serde_json::to_string_pretty(&json!({ "error": err }))?);
                std::process::exit(2);
            }
            Err(err) => return Err(err.into()),
        },

        Commands::Search { query, locale } => {
            let hits = search_projects(&conn, &query, &locale)?;
            serde_json::to_value(hits.iter().map(ProjectSummary::from).collect::<Vec<_>>())?
        }

        Commands::Featured { limit } => serde_json::to_value(featured_projects(&conn, limit)?)?,

        Commands::Tag { slug } => serde_json::to_value(projects_by_tag(&conn, &slug)?)?,

        Commands::Metrics {
            project,
            category,
            field,
            locale,
        } => serde_json::to_value(field_metric_series(
            &conn, &project, &category, &field, &locale,
        )?)?,

        Commands::AppendMetric {
            category,
            field,
            metric,
            project,
            value,
            source,
            collected_at,
        } => {
            let collected_at = match collected_at {
                Some(value) => value,
                None => now_epoch_ms()?,
            };
            let request = AppendMetricValueRequest {
                category_slug: category,
                field_slug: field,
                metric_slug: metric,
                project_slug: project,
                value,
                source,
                collected_at,
            };
            let id = append_metric_value(&conn, &request).map_err(|err| {
                error!("event=cli_append module=cli status=error error_code={}", err.code());
                err
            })?;
            json!({ "id": id })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn now_epoch_ms() -> Result<i64> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the unix epoch")?;
    i64::try_from(elapsed.as_millis()).context("timestamp does not fit in i64")
}
