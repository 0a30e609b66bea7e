//! `civic`: generate a synthetic civic issue corpus and inspect it from the terminal.
//!
//! The corpus lives in memory for one invocation; `--seed` (or `seed` in the config file)
//! makes it reproducible across invocations.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use civic_core::catalog::Catalog;
use civic_core::config::{load_config, EngineConfig};
use civic_core::domain::{calendar_date, Category, Issue, IssueId, Status};
use civic_core::generate::generate_uniform_corpus;
use civic_core::report::render_markdown_report;
use civic_core::stats::department_performance;
use civic_core::store::IssueStore;
use civic_core::validate::validate_corpus;
use civic_core::view::{sort_and_filter, SortField, SortState, ViewerScope};

#[derive(Parser)]
#[command(name = "civic", about = "Civic issue corpus engine")]
struct Cli {
    /// TOML engine config; defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the RNG seed from the config
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Headline counts, optionally for one city
    Summary {
        #[arg(long)]
        city: Option<String>,
    },
    /// Rollups as JSON
    Stats {
        #[arg(value_enum)]
        kind: StatsKind,
    },
    /// Sorted, filtered issue list (at most 200 rows)
    List {
        /// Scope to one city, as a municipal viewer would see it
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        /// Sort field, e.g. `priority`, `reportedDate`, `city`
        #[arg(long)]
        sort: Option<SortField>,
        #[arg(long)]
        desc: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Move one issue to a new status
    Update {
        #[arg(long)]
        id: IssueId,
        #[arg(long)]
        status: Status,
        /// Proof photo reference; required for Resolved
        #[arg(long)]
        proof: Option<String>,
    },
    /// Deterministic Markdown report
    Report,
    /// Check the corpus against the record invariants
    Validate,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatsKind {
    Categories,
    Cities,
    Departments,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Flat CSV projection of an issue.
#[derive(Serialize)]
struct CsvRow<'a> {
    id: IssueId,
    city: &'a str,
    category: String,
    department: String,
    priority: String,
    status: String,
    lat: f64,
    lng: f64,
    address: &'a str,
    reported_date: String,
    description: &'a str,
    photo: &'a str,
    proof_photo: &'a str,
}

impl<'a> From<&'a Issue> for CsvRow<'a> {
    fn from(i: &'a Issue) -> Self {
        Self {
            id: i.id,
            city: &i.city,
            category: i.category.to_string(),
            department: i.department.to_string(),
            priority: i.priority.to_string(),
            status: i.status.to_string(),
            lat: i.location.lat,
            lng: i.location.lng,
            address: &i.address,
            reported_date: calendar_date::format(i.reported_date),
            description: &i.description,
            photo: &i.photo,
            proof_photo: i.proof_photo.as_deref().unwrap_or(""),
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays pipeable.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("civic=info".parse()?))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let catalog = Catalog::maharashtra();
    let options = config.generator_options()?;
    let corpus = generate_uniform_corpus(&catalog, &config.distribution, &options, config.first_id);
    for city in &corpus.fallback_cities {
        info!(city = city.as_str(), "generated with default city bounds");
    }
    info!(
        issues = corpus.issues.len(),
        seed = ?config.seed,
        anchor_date = %calendar_date::format(options.anchor_date),
        "corpus ready"
    );
    let store = IssueStore::new(corpus.issues, &catalog);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Summary { city } => print_summary(&mut out, &store, city.as_deref())?,
        Commands::Stats { kind } => print_stats(&mut out, &store, kind)?,
        Commands::List {
            city,
            category,
            sort,
            desc,
            format,
        } => {
            let scope = match city {
                Some(city) => ViewerScope::Municipal { city },
                None => ViewerScope::Government,
            };
            let mut state = SortState::default();
            if let Some(field) = sort {
                state = state.toggle(field);
                if desc {
                    state = state.toggle(field);
                }
            }
            let snap = store.snapshot();
            let view = sort_and_filter(&snap.issues, &scope.view_options(category, state));
            match format {
                OutputFormat::Table => print_table(&mut out, &view.issues)?,
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut out, &view)?;
                    writeln!(out)?;
                }
                OutputFormat::Csv => {
                    let mut w = csv::Writer::from_writer(&mut out);
                    for issue in &view.issues {
                        w.serialize(CsvRow::from(issue))?;
                    }
                    w.flush()?;
                }
            }
            if view.is_truncated() && format == OutputFormat::Table {
                writeln!(out, "showing {} of {} issues", view.shown(), view.total)?;
            }
        }
        Commands::Update { id, status, proof } => {
            let updated = store
                .update_status(id, status, proof.as_deref())
                .with_context(|| format!("updating issue {id}"))?;
            info!(
                issue_id = id,
                status = %updated.status,
                version = store.version(),
                "issue updated"
            );
            serde_json::to_writer_pretty(&mut out, &updated)?;
            writeln!(out)?;
            print_summary(&mut out, &store, None)?;
        }
        Commands::Report => {
            let snap = store.snapshot();
            out.write_all(render_markdown_report(&snap.issues, store.cities()).as_bytes())?;
        }
        Commands::Validate => {
            let snap = store.snapshot();
            let report = validate_corpus(&snap.issues, &catalog);
            info!(flagged = report.len(), "validation finished");
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

fn print_summary(out: &mut impl Write, store: &IssueStore, city: Option<&str>) -> Result<()> {
    let totals = match city {
        None => store.stats().overview,
        Some(c) => civic_core::stats::overview(&store.snapshot().issues, Some(c)),
    };
    writeln!(out, "scope:        {}", city.unwrap_or("all cities"))?;
    writeln!(out, "total:        {}", totals.total)?;
    writeln!(out, "pending:      {}", totals.pending)?;
    writeln!(out, "in progress:  {}", totals.in_progress)?;
    writeln!(out, "resolved:     {}", totals.resolved)?;
    writeln!(out, "high urgency: {}", totals.high_urgency)?;
    writeln!(out, "fingerprint:  {}", store.snapshot().fingerprint())?;
    Ok(())
}

fn print_stats(out: &mut impl Write, store: &IssueStore, kind: StatsKind) -> Result<()> {
    let bundle = store.stats();
    match kind {
        StatsKind::Categories => serde_json::to_writer_pretty(&mut *out, &bundle.categories)?,
        StatsKind::Cities => serde_json::to_writer_pretty(&mut *out, &bundle.cities)?,
        StatsKind::Departments => serde_json::to_writer_pretty(
            &mut *out,
            &department_performance(&store.snapshot().issues),
        )?,
    }
    writeln!(out)?;
    Ok(())
}

fn print_table(out: &mut impl Write, issues: &[Issue]) -> Result<()> {
    writeln!(
        out,
        "{:>6}  {:<10}  {:<20}  {:<12}  {:<9}  {:<11}  {}",
        "ID", "REPORTED", "CATEGORY", "DEPARTMENT", "PRIORITY", "STATUS", "ADDRESS"
    )?;
    for i in issues {
        writeln!(
            out,
            "{:>6}  {:<10}  {:<20}  {:<12}  {:<9}  {:<11}  {}",
            i.id,
            calendar_date::format(i.reported_date),
            i.category.label(),
            i.department.label(),
            i.priority.label(),
            i.status.label(),
            i.address
        )?;
    }
    Ok(())
}
