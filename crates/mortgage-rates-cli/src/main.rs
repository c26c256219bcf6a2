// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Mortgage rate tracker: entry point.

mod output;
mod paths;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use mortgage_rates::acquisition::HttpClient;
use mortgage_rates::events::EventBus;
use mortgage_rates::history::canonical::EST_OFFSET_SECS;
use mortgage_rates::history::{next_noon_after, CanonicalRefresher, SqliteHistory};
use mortgage_rates::renderer::chromium::ChromiumRenderer;
use mortgage_rates::renderer::Renderer;
use mortgage_rates::scripted::{ScriptedFormFetcher, StageTiming};
use mortgage_rates::{
    validate, Aggregator, FetchStrategy, Institution, LoanParameters, StrategyRegistry,
    TrackerConfig,
};

#[derive(Parser)]
#[command(
    name = "mortgage-rates",
    about = "Compare published mortgage rates across lenders",
    version
)]
struct Cli {
    /// Institution catalog (JSON).
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch current rates for the selected products.
    Fetch {
        #[command(flatten)]
        loan: LoanArgs,

        /// Select a product as "Institution=Mortgage type". Repeatable.
        #[arg(long = "select", value_name = "BANK=TYPE")]
        selections: Vec<String>,

        /// Select every product of every institution.
        #[arg(long)]
        all: bool,

        /// Ignore the freshness window.
        #[arg(long)]
        force: bool,

        /// Print the snapshot as JSON.
        #[arg(long)]
        json: bool,

        /// Skip institutions that need a browser.
        #[arg(long)]
        no_browser: bool,
    },

    /// Check loan parameters without fetching anything.
    Validate {
        #[command(flatten)]
        loan: LoanArgs,
    },

    /// List institutions and the mortgage types they offer.
    Catalog,

    /// Canonical-source rate history.
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   mortgage-rates completions bash > ~/.local/share/bash-completion/completions/mortgage-rates
    ///   mortgage-rates completions zsh > ~/.zfunc/_mortgage-rates
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// Fetch the reference page and append today's rates.
    Refresh {
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Show the most recent records.
    List {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Print when the next daily refresh is due (noon Eastern).
    Next,
}

#[derive(clap::Args)]
struct LoanArgs {
    /// Purchase price, e.g. "$250,000".
    #[arg(long, default_value = "250000")]
    price: String,
    /// Down payment, e.g. "50,000".
    #[arg(long, default_value = "50000")]
    down: String,
    /// Five-digit ZIP code.
    #[arg(long, default_value = "95464")]
    zip: String,
}

impl LoanArgs {
    fn parameters(&self) -> Result<LoanParameters> {
        validate(&self.price, &self.down, &self.zip).context("invalid loan parameters")
    }
}

/// Institutions plus the settings that govern acquisition: catalog
/// `settings` with environment overrides applied.
fn load_configured(source: &paths::CatalogSource) -> Result<(Vec<Institution>, TrackerConfig)> {
    let catalog = paths::load_catalog(source).with_context(|| format!("loading {source}"))?;
    Ok((catalog.institutions, catalog.settings.with_env_overrides()))
}

/// Apply `--select` / `--all` to the catalog.
fn apply_selection(institutions: &mut [Institution], selections: &[String], all: bool) -> Result<()> {
    if all {
        institutions.iter_mut().for_each(Institution::select_all);
    }
    for entry in selections {
        let (bank, kind) = entry
            .split_once('=')
            .with_context(|| format!("expected BANK=TYPE, got {entry:?}"))?;
        let (bank, kind) = (bank.trim(), kind.trim());
        let institution = institutions
            .iter_mut()
            .find(|i| i.name.eq_ignore_ascii_case(bank))
            .with_context(|| format!("unknown institution {bank:?}"))?;
        if !institution.select(kind) {
            anyhow::bail!(
                "{} does not offer {kind:?} (offered: {})",
                institution.name,
                institution.mortgage_types.join(", ")
            );
        }
    }
    Ok(())
}

fn needs_browser(institutions: &[Institution], registry: &StrategyRegistry) -> bool {
    institutions.iter().filter(|i| i.is_opted_in()).any(|i| {
        registry
            .resolve(&i.name)
            .is_ok_and(|s| matches!(s.fetch, FetchStrategy::ScriptedForm(_)))
    })
}

async fn launch_browser(config: &TrackerConfig) -> Option<Arc<dyn Renderer>> {
    match ChromiumRenderer::launch(config).await {
        Ok(renderer) => Some(Arc::new(renderer)),
        Err(e) => {
            tracing::warn!("browser unavailable, calculator-based lenders will be skipped: {e:#}");
            None
        }
    }
}

struct FetchOptions {
    force: bool,
    json: bool,
    no_browser: bool,
}

async fn run_fetch(
    mut institutions: Vec<Institution>,
    config: TrackerConfig,
    params: LoanParameters,
    opts: FetchOptions,
) -> Result<()> {
    let registry = StrategyRegistry::builtin();
    if !institutions.iter().any(Institution::is_opted_in) {
        anyhow::bail!("no mortgage types selected; use --select BANK=TYPE or --all");
    }
    if opts.no_browser {
        for institution in institutions.iter_mut() {
            if needs_browser(std::slice::from_ref(institution), &registry) {
                institution.set_selected(std::iter::empty::<&str>());
            }
        }
    }

    let selection = state::selection_of(&institutions);
    let snapshot_path = paths::snapshot_path();
    let events = Arc::new(EventBus::default());
    let pages = Arc::new(HttpClient::new(config.http_timeout_ms, &config.user_agent));

    let renderer = if needs_browser(&institutions, &registry) {
        launch_browser(&config).await
    } else {
        None
    };

    let mut aggregator = Aggregator::new(registry, pages, config.clone()).with_events(Arc::clone(&events));
    if let Some(saved) = state::load_matching(&snapshot_path, &params, &selection) {
        aggregator = aggregator.with_snapshot(saved);
    }
    if let Some(renderer) = &renderer {
        aggregator =
            aggregator.with_scripted(ScriptedFormFetcher::new(Arc::clone(renderer), StageTiming::from(&config)));
    }

    let progress = if opts.json {
        None
    } else {
        let mut rx = events.subscribe();
        Some(tokio::spawn(async move {
            while let Ok(event) = rx.recv().await {
                if let Some(line) = output::progress_line(&event) {
                    eprintln!("{line}");
                }
            }
        }))
    };

    if !opts.json {
        eprintln!("{}", output::loan_summary(&params));
    }
    let snapshot = aggregator.aggregate(&institutions, &params, opts.force).await;

    drop(aggregator);
    drop(events);
    if let Some(task) = progress {
        let _ = task.await;
    }
    if let Some(renderer) = renderer {
        tracing::debug!(open_contexts = renderer.active_contexts(), "shutting down browser");
        if let Err(e) = renderer.shutdown().await {
            tracing::debug!("browser shutdown failed: {e:#}");
        }
    }

    let saved = state::SavedSnapshot {
        params,
        selection,
        snapshot: (*snapshot).clone(),
    };
    if let Err(e) = state::save(&snapshot_path, &saved) {
        tracing::warn!("could not save snapshot: {e:#}");
    }

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&*snapshot)?);
    } else {
        print!("{}", output::snapshot_table(&snapshot));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let source = paths::resolve_catalog(cli.catalog.as_deref());

    match cli.command {
        Commands::Fetch {
            loan,
            selections,
            all,
            force,
            json,
            no_browser,
        } => {
            let params = loan.parameters()?;
            let (mut institutions, config) = load_configured(&source)?;
            apply_selection(&mut institutions, &selections, all)?;
            run_fetch(
                institutions,
                config,
                params,
                FetchOptions {
                    force,
                    json,
                    no_browser,
                },
            )
            .await?;
        }

        Commands::Validate { loan } => {
            let params = loan.parameters()?;
            println!("{}", output::loan_summary(&params));
        }

        Commands::Catalog => {
            let catalog = paths::load_catalog(&source).with_context(|| format!("loading {source}"))?;
            println!("Catalog: {source}");
            print!(
                "{}",
                output::catalog_listing(&catalog.institutions, &StrategyRegistry::builtin())
            );
        }

        Commands::History { command } => match command {
            HistoryCommand::Refresh { db } => {
                let path = paths::resolve_db_path(db.as_deref());
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                let (_, config) = load_configured(&source)?;
                let store = SqliteHistory::open(&path)?;
                let pages = Arc::new(HttpClient::new(config.http_timeout_ms, &config.user_agent));
                let quotes = CanonicalRefresher::new(pages, &config.user_agent)
                    .refresh(&store)
                    .await?;
                println!("Recorded {} rates to {}", quotes.len(), path.display());
            }
            HistoryCommand::List { db, limit } => {
                let path = paths::resolve_db_path(db.as_deref());
                let store = SqliteHistory::open(&path)?;
                print!("{}", output::history_listing(&store.recent(limit)?));
            }
            HistoryCommand::Next => {
                let zone = chrono::FixedOffset::east_opt(EST_OFFSET_SECS)
                    .context("invalid refresh time zone")?;
                let next = next_noon_after(chrono::Utc::now(), zone)
                    .context("could not compute the next refresh time")?;
                println!("{}", next.with_timezone(&zone).to_rfc3339());
            }
        },

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "mortgage-rates", &mut std::io::stdout());
        }
    }

    Ok(())
}
