use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_core::{
    config::{self, AppConfig},
    filter::{unique_technologies, FilterState},
    loader::{FileSource, HttpSource},
    CatalogFetcher, Category, GamesLoader, LoadOutcome, LoadReport, RetryPolicy,
};
use tracing::{error, info};

use crate::EXIT_CONFIG;

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Portfolio games catalog tooling")]
pub struct Cli {
    /// Configuration file to use instead of the standard locations.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also append logs to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pull the catalog and write a fresh games file.
    Fetch {
        /// Override the output path.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Load the games file and render the projects grid.
    Render {
        /// File path or http(s) URL of the games file.
        #[arg(long)]
        source: Option<String>,
        /// Write the fragment here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Only show this category.
        #[arg(long)]
        category: Option<Category>,
        /// Only show games tagged with this technology.
        #[arg(long)]
        tech: Option<String>,
    },
    /// List the technology tags in use, one per line.
    Technologies {
        /// File path or http(s) URL of the games file.
        #[arg(long)]
        source: Option<String>,
    },
    /// Write the default configuration file.
    InitConfig {
        /// Destination; defaults to the user config directory.
        path: Option<PathBuf>,
    },
}

pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            if !path.is_file() {
                anyhow::bail!("config file {} does not exist", path.display());
            }
            AppConfig::load_from(&[path.to_path_buf()])
        }
        None => AppConfig::load(),
    }
}

pub async fn fetch(mut config: AppConfig, output: Option<PathBuf>) -> ExitCode {
    if let Some(output) = output {
        config.output_path = output;
    }

    match CatalogFetcher::new(config).run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) if err.is_configuration() => {
            error!("{err}");
            ExitCode::from(EXIT_CONFIG)
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

pub async fn render(
    config: AppConfig,
    source: Option<String>,
    out: Option<PathBuf>,
    category: Option<Category>,
    tech: Option<String>,
) -> Result<()> {
    let filter = FilterState::new(category, tech);
    let mut report = load(&config, source).await?;
    let page = report.render(&filter);
    match &report.outcome {
        LoadOutcome::Loaded(_) => info!("rendered {} games", page.cards),
        LoadOutcome::Failed(err) => error!("error fetching games: {err}"),
    }

    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(&path, page.html)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("wrote projects grid to {}", path.display());
        }
        None => print!("{}", page.html),
    }
    Ok(())
}

pub async fn technologies(config: AppConfig, source: Option<String>) -> Result<()> {
    let report = load(&config, source).await?;
    match report.outcome {
        LoadOutcome::Loaded(file) => {
            for tech in unique_technologies(&file.games) {
                println!("{tech}");
            }
            Ok(())
        }
        LoadOutcome::Failed(err) => Err(anyhow::Error::new(err).context("failed to load games")),
    }
}

/// Run one load cycle against a URL or a local file.
async fn load(config: &AppConfig, source: Option<String>) -> Result<LoadReport> {
    let policy = RetryPolicy::from(&config.retry);
    let timeout = config.request_timeout();
    let location = source
        .or_else(|| config.games_url.clone())
        .unwrap_or_else(|| config.output_path.display().to_string());

    let report = if is_url(&location) {
        let source = HttpSource::new(location, timeout).context("failed to build HTTP client")?;
        GamesLoader::new(source, policy, timeout).load().await
    } else {
        GamesLoader::new(FileSource::new(location), policy, timeout)
            .load()
            .await
    };
    Ok(report)
}

pub fn init_config(path: Option<PathBuf>) -> Result<()> {
    let path = path
        .or_else(config::default_config_path)
        .context("no config directory available; pass a path")?;
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    AppConfig::write_default(&path)?;
    info!("wrote default configuration to {}", path.display());
    Ok(())
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}
