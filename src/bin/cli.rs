//! kramlink CLI
//!
//! Downloads Kramerius periodical trees and links citations to them.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kramlink::{
    error::{AppError, Result},
    models::{Config, LinkStatus},
    pipeline,
    storage::{LocalStorage, PeriodicalStorage},
    utils::log::percent,
};

/// kramlink - Kramerius periodical linker
#[derive(Parser, Debug)]
#[command(
    name = "kramlink",
    version,
    about = "Crawl Kramerius periodical trees and link citations to digitized pages"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Data directory (overrides `storage.data_dir`)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a periodical's catalog and save it with its tree
    Download {
        /// Periodical JSON file, relative to the data directory
        periodical: String,

        /// Re-download even if the file already holds a tree
        #[arg(long)]
        force: bool,
    },

    /// Link citations against a downloaded periodical
    Link {
        /// Periodical JSON file, relative to the data directory
        periodical: String,

        /// `id;location` citation CSV
        citations: String,

        /// Results CSV (default: `<citations>.results.csv`)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Validate the configuration file
    Validate,

    /// Show periodical metadata and tree statistics
    Info {
        /// Periodical JSON file, relative to the data directory
        periodical: String,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Default results path next to the citation file.
fn results_key(citations: &str) -> String {
    let stem = citations.strip_suffix(".csv").unwrap_or(citations);
    format!("{stem}.results.csv")
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.storage.data_dir));
    log::debug!("Data directory: {}", data_dir.display());
    let storage = LocalStorage::new(&data_dir);

    match cli.command {
        Command::Download { periodical, force } => {
            config.validate()?;
            if !force {
                if let Some(existing) = storage.load_periodical(&periodical).await? {
                    if existing.tree.node_count() > 1 {
                        log::warn!(
                            "{} already has a tree with {} nodes. Use --force to re-download.",
                            existing.name,
                            existing.tree.node_count()
                        );
                        return Ok(());
                    }
                }
            }
            pipeline::run_download(&config, &storage, &periodical).await?;
        }

        Command::Link {
            periodical,
            citations,
            output,
        } => {
            let output = output.unwrap_or_else(|| results_key(&citations));
            let report = pipeline::run_linking(&storage, &periodical, &citations, &output).await?;
            let linked = report.by_status.get(&LinkStatus::Success).copied().unwrap_or(0);
            log::info!(
                "Linked {linked} of {} citation(s) ({})",
                report.total,
                percent(report.final_rate)
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
            log::info!("    http: {}", config.http.user_agent);
            log::info!(
                "    crawl: max_depth={}, row_limit={}, terminal={:?}",
                config.crawl.max_depth,
                config.crawl.row_limit,
                config.crawl.terminal_models
            );
            log::info!("    storage: {}", config.storage.data_dir);
        }

        Command::Info { periodical: key } => {
            let Some(periodical) = storage.load_periodical(&key).await? else {
                return Err(AppError::config(format!(
                    "periodical file not found: {}",
                    storage.path(&key).display()
                )));
            };
            log::info!("{periodical}");
            if let Some(issn) = &periodical.issn {
                log::info!("ISSN: {issn}");
            }
            let tree = &periodical.tree;
            log::info!(
                "Tree: {} nodes, {} edges, {} volume(s)",
                tree.node_count(),
                tree.edge_count(),
                tree.children(tree.root()).len()
            );
            if !tree.is_tree() {
                log::warn!("Stored structure is not a strict tree");
            }
        }
    }

    Ok(())
}
