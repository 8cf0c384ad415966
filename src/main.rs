mod cli;
mod server;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use equalify::config::EqualifyConfig;
use equalify::scholarship::{Criterion, ScholarshipFilter, SortOrder};

#[derive(Parser)]
#[command(name = "equalify", version, about = "Scholarship discovery and search")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the web UI
    Serve,
    /// Crawl the scholarship listing pages
    Scrape {
        /// Where to write the scraped JSON
        #[arg(long, default_value = "scholarships.json")]
        out: PathBuf,
        /// Also load the results into the store
        #[arg(long)]
        store: bool,
    },
    /// Load a JSON or CSV file into the store
    Load { file: PathBuf },
    /// Extract structured fields for records not yet augmented
    Augment {
        /// Stop after this many records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Filter and list scholarships
    Search(SearchArgs),
    /// Cluster, topic-model and score the descriptions
    Analyze {
        /// Write the full report as JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show collection statistics
    Stats,
    /// Export every scholarship as JSON to stdout
    Export,
    /// Check database health
    Doctor,
}

#[derive(Args)]
struct SearchArgs {
    /// Regex matched against title, location and extra requirements
    query: Option<String>,
    #[arg(long)]
    ethnicity: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    /// Regex matched against the preferred major
    #[arg(long)]
    major: Option<String>,
    #[arg(long)]
    university: Option<String>,
    /// Required criteria, by field name (e.g. first_generation)
    #[arg(long = "criterion", value_name = "FIELD")]
    criteria: Vec<Criterion>,
    #[arg(long)]
    min_reward: Option<f64>,
    #[arg(long)]
    max_reward: Option<f64>,
    /// YYYY-MM-DD
    #[arg(long)]
    due_after: Option<NaiveDate>,
    /// YYYY-MM-DD
    #[arg(long)]
    due_before: Option<NaiveDate>,
    /// Sort by due date, latest first
    #[arg(long)]
    desc: bool,
    #[arg(long, default_value_t = 1)]
    page: usize,
}

impl SearchArgs {
    fn filter(&self) -> ScholarshipFilter {
        ScholarshipFilter {
            search: self.query.clone(),
            ethnicity: self.ethnicity.clone(),
            gender: self.gender.clone(),
            major: self.major.clone(),
            university: self.university.clone(),
            criteria: self.criteria.iter().copied().collect(),
            min_reward: self.min_reward,
            max_reward: self.max_reward,
            due_after: self.due_after,
            due_before: self.due_before,
        }
        .normalized()
    }

    fn order(&self) -> SortOrder {
        if self.desc {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = EqualifyConfig::load()?;

    // Log to stderr so stdout stays clean for `export`.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => server::serve(config).await?,
        Command::Scrape { out, store } => cli::scrape::scrape(&config, &out, store).await?,
        Command::Load { file } => cli::load::load(&config, &file)?,
        Command::Augment { limit } => cli::augment::augment(&config, limit).await?,
        Command::Search(args) => {
            cli::search::search(&config, &args.filter(), args.order(), args.page)?
        }
        Command::Analyze { out } => cli::analyze::analyze(&config, out.as_deref())?,
        Command::Stats => cli::stats::stats(&config)?,
        Command::Export => cli::export::export(&config)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
