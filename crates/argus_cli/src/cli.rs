use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "argus")]
#[command(version, about = "Query and feed the Argus free-software catalog")]
pub struct Cli {
    /// SQLite database path
    #[arg(long, env = "ARGUS_DB", global = true, default_value = "argus.sqlite3")]
    pub db: PathBuf,

    /// Log level (trace|debug|info|warn|error); defaults by build mode
    #[arg(long, env = "ARGUS_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Directory for rotated log files; logging is off when unset
    #[arg(long, env = "ARGUS_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Overall, category and field scores of one published project
    Scores {
        slug: String,

        #[arg(short, long, default_value = "en")]
        locale: String,
    },

    /// Compare 2 to 5 published projects side by side
    Compare {
        /// Project slugs, in column order
        #[arg(required = true, num_args = 1..)]
        slugs: Vec<String>,

        #[arg(short, long, default_value = "en")]
        locale: String,
    },

    /// Search published projects by name or localized content
    Search {
        query: String,

        #[arg(short, long, default_value = "en")]
        locale: String,
    },

    /// List featured published projects
    Featured {
        #[arg(short = 'n', long, default_value_t = argus_core::DEFAULT_FEATURED_LIMIT)]
        limit: u32,
    },

    /// List the published projects of a tag
    Tag { slug: String },

    /// Metric series of one field for a published project
    Metrics {
        project: String,
        category: String,
        field: String,

        #[arg(short, long, default_value = "en")]
        locale: String,
    },

    /// Append one raw metric observation
    AppendMetric {
        #[arg(long)]
        category: String,

        #[arg(long)]
        field: String,

        #[arg(long)]
        metric: String,

        #[arg(long)]
        project: String,

        #[arg(long, allow_hyphen_values = true)]
        value: Decimal,

        #[arg(long)]
        source: String,

        /// Observation time in epoch ms; defaults to now
        #[arg(long)]
        collected_at: Option<i64>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
