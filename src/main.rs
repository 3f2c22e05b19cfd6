use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tds_mpi::application::orchestrator::{AuthenticationOrchestrator, Collaborators};
use tds_mpi::application::registry::Registry;
use tds_mpi::config::Config;
use tds_mpi::infrastructure::codec::DeflateCodec;
use tds_mpi::infrastructure::http::{HttpDirectoryClient, HttpErrorNotifier};
use tds_mpi::infrastructure::merchants::InMemoryMerchantDirectory;
use tds_mpi::infrastructure::range_cache::EnrollmentRangeCache;
use tds_mpi::infrastructure::signature::UnavailableSignatureVerifier;
use tds_mpi::interfaces::csv::card_range_reader::CardRangeReader;
use tds_mpi::interfaces::stream::document_reader::DocumentReader;
use tds_mpi::logging;
use tokio::io::BufReader;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Local-interface request documents (XML), answered in order by one
    /// engine. Without paths, blank-line separated documents are read from
    /// stdin until it closes.
    requests: Vec<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: PathBuf,

    /// Card ranges to seed the range cache with (CSV: begin,end,action)
    #[arg(long)]
    ranges: Option<PathBuf>,

    /// Serial number recorded for the seeded ranges
    #[arg(long, default_value = "0")]
    serial: String,

    /// Protocol the seeded ranges belong to. Defaults to the configured one.
    #[arg(long)]
    protocol: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    let config = Config::from_file(&cli.config).into_diagnostic()?;

    let ranges = Arc::new(EnrollmentRangeCache::new());
    if let Some(path) = &cli.ranges {
        let file = File::open(path).into_diagnostic()?;
        let delta = CardRangeReader::new(file).read_all().into_diagnostic()?;
        let protocol = cli
            .protocol
            .clone()
            .unwrap_or_else(|| config.default_protocol.clone());
        ranges
            .apply_delta(&protocol, &cli.serial, &delta)
            .into_diagnostic()?;
        info!(%protocol, ranges = delta.len(), "card ranges seeded");
    }

    let timeout = config.directory_timeout();
    let notifier = Arc::new(HttpErrorNotifier::new(timeout));
    let collaborators = Collaborators {
        directory: Box::new(HttpDirectoryClient::new(timeout)),
        merchants: Box::new(InMemoryMerchantDirectory::from_merchants(
            config.merchants.clone(),
        )),
        verifier: Box::new(UnavailableSignatureVerifier),
        codec: Box::new(DeflateCodec::new()),
        notifier: notifier.clone(),
    };
    let orchestrator = AuthenticationOrchestrator::new(
        config,
        Arc::new(Registry::standard()),
        ranges,
        collaborators,
    );

    if cli.requests.is_empty() {
        let mut reader = DocumentReader::new(BufReader::new(tokio::io::stdin()));
        while let Some(document) = reader.next_document().await.into_diagnostic()? {
            emit(&orchestrator.handle_document(&document).await).into_diagnostic()?;
        }
    } else {
        for path in &cli.requests {
            let document = fs::read_to_string(path).into_diagnostic()?;
            emit(&orchestrator.handle_document(&document).await).into_diagnostic()?;
        }
    }

    notifier.drain().await;
    Ok(())
}

/// Writes one response followed by a blank line, flushed so that a caller
/// driving the session can read it before sending the next request.
fn emit(response: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{response}")?;
    writeln!(out)?;
    out.flush()
}
