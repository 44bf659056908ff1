//! fitblast: fitness BLAST widget renderer
//!
//! Sends a query sequence to a fitness browser's sequence service and renders
//! the hits either as a one- or two-line summary or as a full table, written
//! into an element of an HTML page.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

mod config;
mod hits;
mod loader;
mod page;
mod query;
mod render;
#[cfg(feature = "serve")]
mod serve;

use crate::config::Config;
use crate::hits::{Hit, Significance};
use crate::loader::{load_view, HttpBackend, LoadError};
use crate::page::HtmlPage;
use crate::query::Query;
use crate::render::{Links, View};

/// Render fitness BLAST results as HTML
#[derive(Parser, Debug)]
#[command(name = "fitblast")]
#[command(version)]
#[command(about = "Search a sequence against a fitness browser and render the hits as HTML")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML configuration file (server root, thresholds)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Short summary: closest hit and closest hit with a phenotype
    Short(RenderArgs),

    /// Table of all hits with high coverage
    Table(RenderArgs),

    /// Fetch hits and write them as JSON
    Hits(HitsArgs),

    /// Start a local web page for running searches
    #[cfg(feature = "serve")]
    Serve(ServeArgs),
}

/// Where the query sequence comes from
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct QueryArgs {
    /// Query sequence (whitespace is ignored)
    #[arg(long)]
    sequence: Option<String>,

    /// FASTA file; the first record is used
    #[arg(long)]
    fasta: Option<PathBuf>,
}

impl QueryArgs {
    fn load(&self) -> Result<Query> {
        match (&self.sequence, &self.fasta) {
            (Some(text), _) => Query::from_text(text),
            (None, Some(path)) => Query::from_fasta(path),
            (None, None) => anyhow::bail!("Either --sequence or --fasta is required"),
        }
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Root URL of the fitness browser, e.g. https://fit.genomics.lbl.gov/
    #[arg(long)]
    server_root: Option<String>,

    #[command(flatten)]
    query: QueryArgs,

    /// HTML page to render into (default: a minimal standalone page)
    #[arg(long)]
    template: Option<PathBuf>,

    /// Id of the element that receives the widget
    #[arg(long, default_value = "fitblast")]
    element: String,

    /// Output HTML file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct HitsArgs {
    /// Root URL of the fitness browser
    #[arg(long)]
    server_root: Option<String>,

    #[command(flatten)]
    query: QueryArgs,

    /// Include hits below the coverage threshold
    #[arg(long)]
    all: bool,

    /// Output JSON file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[cfg(feature = "serve")]
#[derive(Args, Debug)]
struct ServeArgs {
    /// Root URL of the fitness browser
    #[arg(long)]
    server_root: Option<String>,

    /// Port for the web server
    #[arg(long, default_value_t = 8766)]
    port: u16,

    /// Do not open a browser window
    #[arg(long)]
    no_browser: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    info!("fitblast v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => {
            info!("Loading configuration: {}", path.display());
            Config::from_yaml(path)?
        }
        None => Config::default(),
    };

    match cli.command {
        Commands::Short(args) => run_render(View::Short, args, &config),
        Commands::Table(args) => run_render(View::Table, args, &config),
        Commands::Hits(args) => run_hits(args, &config),
        #[cfg(feature = "serve")]
        Commands::Serve(args) => {
            let server_root = config.resolve_server_root(args.server_root.as_deref())?;
            serve::start_server(&server_root, &config, args.port, !args.no_browser)
        }
    }
}

/// Write text to a file, or to stdout when no path is given
fn write_output(output: Option<&PathBuf>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// Run the short or table subcommand: search, render into the page, write it out
fn run_render(view: View, args: RenderArgs, config: &Config) -> Result<()> {
    let server_root = config.resolve_server_root(args.server_root.as_deref())?;
    let query = args.query.load()?;
    info!(
        "Query {}: {} residues",
        query.name.as_deref().unwrap_or("(command line)"),
        query.residue_count()
    );

    let mut page = match &args.template {
        Some(path) => HtmlPage::from_file(path)?,
        None => HtmlPage::with_element(&args.element),
    };

    let backend = HttpBackend::from_config(config)?;
    let result = load_view(
        view,
        &mut page,
        &backend,
        &args.element,
        &server_root,
        &query.sequence,
        config,
    );

    if let Err(LoadError::MissingElement(id)) = &result {
        anyhow::bail!("No element with id '{}' in the page", id);
    }
    if let Some(widget) = page.inner_html(&args.element) {
        log::debug!("Rendered {} bytes into #{}", widget.len(), args.element);
    }

    write_output(args.output.as_ref(), page.as_str())?;
    if let Some(path) = &args.output {
        info!("{} view written to: {}", view, path.display());
    }

    result.with_context(|| format!("Search against {} failed", server_root))
}

/// One entry of the `hits` JSON output
#[derive(Debug, Serialize)]
struct HitReport<'a> {
    #[serde(flatten)]
    hit: &'a Hit,
    close: bool,
    useful: bool,
    significance: Significance,
}

/// Run the hits subcommand: search and dump the parsed hits as JSON
fn run_hits(args: HitsArgs, config: &Config) -> Result<()> {
    let server_root = config.resolve_server_root(args.server_root.as_deref())?;
    let query = args.query.load()?;

    let backend = HttpBackend::from_config(config)?;
    let links = Links::new(server_root.as_str(), config.detail_query_limit);
    let hits = loader::fetch(&backend, &links, &query.sequence)
        .with_context(|| format!("Search against {} failed", server_root))?;

    let thresholds = &config.thresholds;
    let report: Vec<HitReport> = hits
        .iter()
        .filter(|h| args.all || h.has_coverage(thresholds))
        .map(|hit| HitReport {
            hit,
            close: hit.is_close(thresholds),
            useful: hit.is_useful(thresholds),
            significance: hit.significance(thresholds),
        })
        .collect();

    info!("{} of {} hits reported", report.len(), hits.len());

    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    write_output(args.output.as_ref(), &json)
}
