//! diplomacy-check — load the diplomacy catalog and report what happened.
//!
//! Resolves the module's own `Diplomacy.xml` and every sub-mod document from
//! the environment (`DIPLOMACY_*`, `.env` supported) or CLI flags, expands
//! the rules against a roster YAML file, and prints either a per-source
//! summary or the merged catalog as JSON.
//!
//! With `--watch` the process stays up; when a source document changes it
//! resets the loader and runs a fresh `initialize()`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tracing::info;

use diplomacy_core::config::{load_dotenv, DiplomacyConfig};
use diplomacy_core::StaticRoster;
use diplomacy_rules::loader::{CollectingReporter, LoadSummary, SourceStatus};
use diplomacy_rules::{CatalogLoader, SourceSet};

// ── CLI ─────────────────────────────────────────────────────────────

/// Load and validate diplomacy documents.
#[derive(Parser, Debug)]
#[command(name = "diplomacy-check", version, about)]
struct Cli {
    /// Game installation root (overrides DIPLOMACY_BASE_PATH).
    #[arg(long)]
    base_path: Option<PathBuf>,

    /// Module folder name under `Modules/` (overrides DIPLOMACY_MODULE_NAME).
    #[arg(long)]
    module_name: Option<String>,

    /// Skip the module's own document; only sub-mods contribute.
    #[arg(long)]
    api_mode: bool,

    /// Sub-mod directory containing a Diplomacy.xml (repeatable, in load order).
    /// Replaces DIPLOMACY_SUBMOD_DIRS when given.
    #[arg(long = "submod-dir")]
    submod_dirs: Vec<PathBuf>,

    /// Roster YAML listing known entities and groups (overrides DIPLOMACY_ROSTER).
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Exit with an error if anything was reported.
    #[arg(long)]
    strict: bool,

    /// Keep running and reload when a source document changes.
    #[arg(long)]
    watch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
}

impl Cli {
    /// Environment config with CLI flags applied on top.
    fn resolve_config(&self) -> DiplomacyConfig {
        let mut config = DiplomacyConfig::from_env();
        if let Some(base) = &self.base_path {
            config.base_path = base.clone();
        }
        if let Some(module) = &self.module_name {
            config.module_name = module.clone();
        }
        if self.api_mode {
            config.api_mode = true;
        }
        if !self.submod_dirs.is_empty() {
            config.submod_dirs = self.submod_dirs.clone();
        }
        if let Some(roster) = &self.roster {
            config.roster_path = Some(roster.clone());
        }
        config
    }
}

fn print_summary(summary: &LoadSummary) {
    println!("loaded at {}", summary.loaded_at.to_rfc3339());
    for source in &summary.sources {
        let path = source.path.display();
        match &source.status {
            SourceStatus::Loaded { inserted, failures } => {
                println!(
                    "  [{}] {}: {} rules, {} failed",
                    source.role,
                    path,
                    inserted,
                    failures.len()
                );
                for f in failures {
                    let target = f.target.as_deref().unwrap_or("<none>");
                    println!("      entry #{} ({}): {}", f.index, target, f.error);
                }
            }
            SourceStatus::Skipped { reason } => {
                println!("  [{}] {}: skipped ({})", source.role, path, reason);
            }
            SourceStatus::Failed { error } => {
                println!("  [{}] {}: FAILED: {}", source.role, path, error);
            }
        }
    }
    println!("{} rules in catalog, {} errors", summary.rule_count, summary.error_count());
}

/// Fail when `--strict` is set and anything was reported.
fn check_strict(strict: bool, reporter: &CollectingReporter) -> anyhow::Result<()> {
    if strict && !reporter.is_empty() {
        bail!("{} diplomacy data errors reported", reporter.len());
    }
    Ok(())
}

fn print_output(
    format: OutputFormat,
    summary: &LoadSummary,
    loader: &CatalogLoader,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Summary => print_summary(summary),
        OutputFormat::Json => {
            let catalog = loader.catalog();
            println!("{}", serde_json::to_string_pretty(catalog.as_ref())?);
        }
    }
    Ok(())
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let config = cli.resolve_config();
    config.log_summary();

    let roster_path = config
        .roster_path
        .clone()
        .context("no roster given: pass --roster or set DIPLOMACY_ROSTER")?;
    let roster = StaticRoster::from_file(&roster_path)
        .with_context(|| format!("failed to load roster {}", roster_path.display()))?;

    let reporter = Arc::new(CollectingReporter::new());
    let loader = CatalogLoader::new(SourceSet::from_config(&config), Arc::new(roster))
        .with_reporter(reporter.clone());

    let summary = loader.initialize();
    print_output(cli.format, &summary, &loader)?;
    check_strict(cli.strict, &reporter)?;

    if cli.watch {
        let watcher = loader.watch().context("failed to start source watcher")?;
        info!("watching for changes, press Ctrl-C to exit");
        while let Some(path) = watcher.recv() {
            let coalesced = watcher.drain();
            info!(path = %path.display(), coalesced, "diplomacy source changed, reloading");
            reporter.clear();
            loader.reset();
            let summary = loader.initialize();
            print_output(cli.format, &summary, &loader)?;
        }
    }

    Ok(())
}
