//! Command-line interface: argument parsing and the subcommand runners.

use crate::config::Config;
use crate::format::{json, snapshot};
use crate::search::Corpus;
use crate::server::SearchServer;
use crate::source;
use crate::state::SearchEngine;
use crate::tools::search::format_search_results;
use crate::tracing::LogFormat;
use crate::worker::{RefreshWorker, spawn_refresh_worker};
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rmcp::{ServiceExt, transport::stdio};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(name = "rustdoc-search")]
#[command(about = "Ranked search over rustdoc indexes, as an MCP server or from the shell", long_about = None)]
pub struct Cli {
    /// Configuration file (default: the user config directory, if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the search tools over MCP on stdio
    Serve {
        #[command(flatten)]
        sources: SourceArgs,
        /// Do not poll sources for changes
        #[arg(long)]
        no_refresh: bool,
    },
    /// Run a single query and print the ranked results
    Search {
        query: String,
        #[command(flatten)]
        sources: SourceArgs,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate sources and write them as a single payload
    Compile {
        #[command(flatten)]
        sources: SourceArgs,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = CompileFormat::Snapshot)]
        format: CompileFormat,
    },
    /// Validate configuration and sources without serving
    Check {
        #[command(flatten)]
        sources: SourceArgs,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Index file or directory; repeatable. Overrides `server.sources`.
    #[arg(short, long = "source")]
    pub sources: Vec<PathBuf>,
}

impl SourceArgs {
    fn resolve(&self, config: &Config) -> Vec<PathBuf> {
        let sources = if self.sources.is_empty() {
            &config.server.sources
        } else {
            &self.sources
        };
        sources.iter().map(|path| source::expand_tilde(path)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompileFormat {
    /// Binary snapshot (`.rdsidx`)
    Snapshot,
    /// Schema JSON document
    Json,
}

/// Run the parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { sources, no_refresh } => serve(&config, sources.resolve(&config), no_refresh).await,
        Commands::Search {
            query,
            sources,
            limit,
            json,
        } => {
            let output = search(&config, &sources.resolve(&config), &query, limit, json).await?;
            print!("{}", output);
            Ok(())
        }
        Commands::Compile {
            sources,
            output,
            format,
        } => {
            let corpus = compile(&sources.resolve(&config), &output, format).await?;
            println!(
                "Wrote {} libraries ({} items) to {}",
                corpus.libraries().count(),
                corpus.item_count(),
                output.display()
            );
            Ok(())
        }
        Commands::Check { sources } => {
            print!("{}", check(&sources.resolve(&config)).await?);
            Ok(())
        }
    }
}

async fn serve(config: &Config, sources: Vec<PathBuf>, no_refresh: bool) -> Result<()> {
    tracing::info!("Starting rustdoc-search MCP server with {} sources", sources.len());

    let engine = Arc::new(SearchEngine::new(config));
    let mut worker = RefreshWorker::new(Arc::clone(&engine), sources.clone());

    if !sources.is_empty() {
        match source::load_sources(&sources).await {
            Ok(loaded) => match engine.reload(loaded.libraries.clone()) {
                Ok(_) => worker = worker.with_loaded(&loaded),
                Err(e) => tracing::warn!("Initial load rejected: {}", e),
            },
            Err(e) => tracing::warn!("Initial load failed: {:#}", e),
        }
    }

    let cancel = CancellationToken::new();
    let refresh = match config.server.refresh_interval() {
        Some(period) if !no_refresh && !sources.is_empty() => {
            Some(spawn_refresh_worker(worker, period, cancel.clone()))
        }
        _ => None,
    };

    let server = SearchServer::new(engine, sources);
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;
    service.waiting().await?;

    cancel.cancel();
    if let Some(handle) = refresh {
        handle.await.context("Refresh worker panicked")?;
    }
    Ok(())
}

/// Load `sources` and run one query against them.
pub async fn search(
    config: &Config,
    sources: &[PathBuf],
    query: &str,
    limit: Option<usize>,
    as_json: bool,
) -> Result<String> {
    if sources.is_empty() {
        bail!("No sources given. Pass --source or set `server.sources` in the configuration.");
    }

    let loaded = source::load_sources(sources).await?;
    let engine = SearchEngine::with_libraries(config, loaded.libraries)?;
    let (corpus, results) = engine.search_pinned(query, limit.unwrap_or_else(|| engine.default_limit()))?;

    if as_json {
        let mut text = serde_json::to_string_pretty(&results)?;
        text.push('\n');
        return Ok(text);
    }
    if results.is_empty() {
        return Ok(format!("No results found for '{}'.\n", query));
    }
    Ok(format_search_results(query, &corpus, &results))
}

/// Load and validate `sources`, then write them to `output`.
pub async fn compile(sources: &[PathBuf], output: &Path, format: CompileFormat) -> Result<Corpus> {
    if sources.is_empty() {
        bail!("No sources given. Pass --source or set `server.sources` in the configuration.");
    }

    let loaded = source::load_sources(sources).await?;
    // Validate before writing: a snapshot must load as a corpus.
    let corpus = Corpus::load(loaded.libraries.clone())?;

    let bytes = match format {
        CompileFormat::Snapshot => snapshot::encode(&loaded.libraries)?,
        CompileFormat::Json => json::encode(&loaded.libraries)?.into_bytes(),
    };
    tokio::fs::write(output, bytes)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!("Compiled {} files into {}", loaded.files.len(), output.display());
    Ok(corpus)
}

/// Load and validate `sources`, describing what was found.
pub async fn check(sources: &[PathBuf]) -> Result<String> {
    let loaded = source::load_sources(sources).await?;
    let files = loaded.files;
    let corpus = Corpus::load(loaded.libraries)?;

    let mut output = String::from("Configuration OK\n");
    output.push_str(&format!("{} files:\n", files.len()));
    for file in &files {
        output.push_str(&format!(
            "  • {} ({}): {}\n",
            file.path.display(),
            file.format,
            file.libraries.join(", ")
        ));
    }
    output.push_str(&format!(
        "{} libraries, {} items, fingerprint {:016x}\n",
        corpus.libraries().count(),
        corpus.item_count(),
        loaded.fingerprint
    ));
    Ok(output)
}
