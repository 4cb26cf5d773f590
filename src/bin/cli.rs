//! Invest Calendar CLI
//!
//! Queries a local data directory or a published HTTP endpoint.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use invest_calendar::{
    config::load_config,
    error::Result,
    models::Config,
    pipeline::{self, render},
    services::{QueryEngine, aggregate},
};

/// Investment calendar query tool
#[derive(Parser, Debug)]
#[command(name = "calendar", version, about = "Investment Calendar Event Query")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Read partitions from this URL instead of the configured source
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Events on one date
    Day { date: NaiveDate },

    /// Events between two dates, inclusive
    Range { start: NaiveDate, end: NaiveDate },

    /// Free-text search
    Search {
        query: String,

        /// Also scan recent monthly archives
        #[arg(long)]
        history: bool,
    },

    /// Events happening today
    Today,

    /// Newly discovered events
    New {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// High-importance events
    Important {
        /// Minimum importance (1-5)
        #[arg(long)]
        min: Option<u8>,
    },

    /// Distinct event categories
    Categories,

    /// Archived months
    Periods,

    /// Upcoming events grouped by day
    Calendar,

    /// Per-platform counts
    Stats,

    /// Load current snapshots or one archived month
    Load {
        /// "current" or a month in YYYY-MM format
        #[arg(long, default_value = "current")]
        from: String,
    },

    /// Dataset metadata and change report
    Summary {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Validate configuration and data source
    Validate,
}

/// Initialize logging before configuration is read, so config warnings are
/// visible. Without RUST_LOG the level is narrowed later by `apply_log_level`.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace"))
        .format_timestamp_secs()
        .init();
    if std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

/// Apply the configured level unless RUST_LOG takes precedence.
fn apply_log_level(config: &Config, verbose: bool) {
    if std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(config.logging.level_filter(verbose));
    }
}

fn print_events(events: &[invest_calendar::Event], json: bool) -> Result<()> {
    println!("{}", render::render_events(events, json)?);
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = load_config(&cli.config)?;
    apply_log_level(&config, cli.verbose);
    if let Some(url) = cli.base_url {
        config.source.base_url = Some(url);
        config.validate()?;
    }

    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let engine = QueryEngine::from_config(&config)?;

    match cli.command {
        Command::Day { date } => print_events(&engine.by_date(date, today).await?, cli.json)?,

        Command::Range { start, end } => {
            print_events(&engine.by_date_range(start, end, today).await?, cli.json)?
        }

        Command::Search { query, history } => {
            print_events(&engine.search(&query, history).await?, cli.json)?
        }

        Command::Today => {
            let snapshots = engine.current_snapshots().await?;
            print_events(&aggregate::today(&snapshots, today), cli.json)?;
        }

        Command::New { limit } => {
            let snapshots = engine.current_snapshots().await?;
            let mut events = aggregate::new_events(&snapshots);
            events.truncate(limit.unwrap_or(config.query.new_events_limit));
            print_events(&events, cli.json)?;
        }

        Command::Important { min } => {
            let snapshots = engine.current_snapshots().await?;
            let min = min.unwrap_or(config.query.important_threshold);
            print_events(&aggregate::important(&snapshots, min), cli.json)?;
        }

        Command::Categories => {
            let snapshots = engine.current_snapshots().await?;
            let categories = aggregate::categories(&snapshots);
            if cli.json {
                println!("{}", render::to_json(&categories)?);
            } else {
                println!("{}", categories.join("\n"));
            }
        }

        Command::Periods => {
            let periods: Vec<String> = engine
                .available_periods()
                .await?
                .iter()
                .map(ToString::to_string)
                .collect();
            if cli.json {
                println!("{}", render::to_json(&periods)?);
            } else {
                println!("{}", periods.join("\n"));
            }
        }

        Command::Calendar => {
            let days = engine.calendar(today).await?;
            if cli.json {
                println!("{}", render::to_json(&days)?);
            } else {
                for (date, events) in &days {
                    println!("== {} ({} events)", date, events.len());
                    print_events(events, false)?;
                }
            }
        }

        Command::Stats => {
            let snapshots = engine.current_snapshots().await?;
            let stats = aggregate::platform_stats(&snapshots);
            if cli.json {
                println!("{}", render::to_json(&stats)?);
            } else {
                for (platform, entry) in &stats {
                    println!(
                        "{} ({}): {} events, {} new, {} categories",
                        entry.name,
                        platform,
                        entry.total_events,
                        entry.new_events,
                        entry.categories.len()
                    );
                }
            }
        }

        Command::Load { from } => {
            let snapshots = pipeline::run_load(&engine, &from).await?;
            if cli.json {
                println!("{}", render::to_json(&snapshots)?);
            }
        }

        Command::Summary { date } => {
            let summary = pipeline::run_summary(&engine, date.unwrap_or(today)).await?;
            if cli.json {
                println!("{}", render::to_json(&summary)?);
            }
        }

        Command::Validate => pipeline::run_validate(&config, &engine).await?,
    }

    Ok(())
}
