//! holdings-exchange - command line entry point
//!
//! `exchange` streams review records through the search API and writes KBART
//! or XML holdings; `links` writes the institutional links document for the
//! holdings files already on disk.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use holdings_common::config::{ConfigResolver, TomlConfig};
use holdings_exchange::clients::{ReviewClient, ReviewFilter, SearchClient};
use holdings_exchange::output::{
    build_institutional_links, list_holdings_files, write_kbart, write_links_file,
    write_xml_holdings, HoldingsChunker, HoldingsFileWriter,
};
use holdings_exchange::{source, ExchangeReport, Exchanger};

/// Corpus name used in holdings file names when no corpus filter is given
const DEFAULT_CORPUS: &str = "istex";

#[derive(Parser, Debug)]
#[command(name = "holdings-exchange")]
#[command(about = "Build KBART and Google Scholar holdings from review records")]
#[command(version)]
struct Args {
    /// Configuration file (overrides HOLDINGS_CONFIG and the user config file)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the exchange and write its output
    Exchange(ExchangeArgs),
    /// Write institutional_links.xml for the holdings files in the output directory
    Links {
        /// Holdings directory (defaults to xml_holdings.output_path)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct ExchangeArgs {
    /// Review document uri
    #[arg(long)]
    uri: Option<String>,

    /// Publication type (serial or monograph)
    #[arg(long = "type")]
    record_type: Option<String>,

    #[arg(long)]
    corpus: Option<String>,

    #[arg(long)]
    title: Option<String>,

    /// Maximum number of review documents
    #[arg(long)]
    max_size: Option<u32>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Kbart)]
    format: OutputFormat,

    /// KBART file (stdout when absent) or holdings directory
    #[arg(long)]
    output: Option<PathBuf>,

    /// Records processed concurrently
    #[arg(long)]
    parallel: Option<usize>,

    /// Publication kind embedded in holdings file names
    #[arg(long, default_value = "journals")]
    kind: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Kbart,
    XmlHoldings,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, config_source) = ConfigResolver::new()
        .load(args.config.as_deref())
        .context("Failed to load configuration")?;

    holdings_common::logging::init_tracing(&config.logging)
        .context("Failed to initialise logging")?;

    info!(version = env!("CARGO_PKG_VERSION"), config_source = ?config_source, "Starting holdings-exchange");

    match args.command {
        Command::Exchange(exchange_args) => {
            if let Some(parallel) = exchange_args.parallel {
                config.app.parallel = parallel;
            }
            config.validate().context("Invalid configuration")?;
            run_exchange(&config, exchange_args).await
        }
        Command::Links { output } => {
            let dir = output.unwrap_or_else(|| config.xml_holdings.output_path.clone());
            run_links(&config, &dir)
        }
    }
}

async fn run_exchange(config: &TomlConfig, args: ExchangeArgs) -> Result<()> {
    let filter = ReviewFilter {
        uri: args.uri.clone(),
        record_type: args.record_type.clone(),
        corpus: args.corpus.clone(),
        title: args.title.clone(),
        max_size: args.max_size,
    };

    let report = Arc::new(ExchangeReport::new(config.app.profile));
    let review = ReviewClient::new(&config.review, &config.app.sid)
        .context("Failed to create review service client")?;
    let search = SearchClient::new(&config.api, &config.app.sid)
        .context("Failed to create search API client")?;

    let records = source::decode_records(
        review.find_documents(&filter),
        config.review.fields.clone(),
        report.clone(),
    );
    let exchanger = Exchanger::from_config(config, Arc::new(search), report)?;
    let exchanged = exchanger.exchange(records);

    match args.format {
        OutputFormat::Kbart => {
            let output = args.output.clone();
            let rows = write_kbart(exchanged, move || open_kbart_sink(output.as_deref()))
                .await
                .context("KBART output failed")?;
            info!(rows, "KBART written");
        }
        OutputFormat::XmlHoldings => {
            let dir = args
                .output
                .clone()
                .unwrap_or_else(|| config.xml_holdings.output_path.clone());
            let corpus = args.corpus.as_deref().unwrap_or(DEFAULT_CORPUS);
            let writer =
                HoldingsFileWriter::new(&dir, corpus, &config.xml_holdings.institution, &args.kind)
                    .with_context(|| format!("Failed to prepare {}", dir.display()))?;
            let chunker = HoldingsChunker::new(config.xml_holdings.max_size, &config.xml_holdings.dtd);
            let files = write_xml_holdings(exchanged, chunker, writer)
                .await
                .context("XML holdings output failed")?;
            info!(files, "XML holdings written");
        }
    }
    Ok(())
}

fn open_kbart_sink(output: Option<&Path>) -> io::Result<Box<dyn Write>> {
    let sink: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    };
    Ok(sink)
}

fn run_links(config: &TomlConfig, dir: &Path) -> Result<()> {
    let files = list_holdings_files(dir)
        .with_context(|| format!("Failed to list holdings files in {}", dir.display()))?;
    if files.is_empty() {
        warn!(dir = %dir.display(), "No holdings files found");
    }

    let xml = build_institutional_links(&config.xml_links, &files)?;
    let path = write_links_file(dir, &xml)?;
    info!(path = %path.display(), holdings_files = files.len(), "Institutional links written");
    Ok(())
}
