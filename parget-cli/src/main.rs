//! parget - download a file over HTTP with parallel range requests.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use parget::{
    destination_from_url, format_size, DownloadConfig, Downloader, ProgressCallback,
    DEFAULT_WORKERS,
};

/// Concurrent range-based HTTP file downloader.
#[derive(Debug, Parser)]
#[command(name = "parget", version, about)]
struct Cli {
    /// URL of the file to download.
    url: String,

    /// Number of parallel download workers.
    #[arg(short = 'n', long = "workers", default_value_t = DEFAULT_WORKERS)]
    workers: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let dest = match destination_from_url(&cli.url) {
        Ok(dest) => dest,
        Err(e) => {
            eprintln!("parget: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    let ctrlc_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\nCancelling download...");
        ctrlc_token.cancel();
    }) {
        debug!(error = %e, "could not install ctrl-c handler");
    }

    let config = DownloadConfig::new().with_workers(cli.workers);
    let downloader = Downloader::new(config);

    println!(
        "Downloading {} -> {} ({} workers)",
        cli.url,
        dest.display(),
        cli.workers
    );

    let on_progress: ProgressCallback = Box::new(|snapshot| {
        print!("\r{}", snapshot);
        let _ = io::stdout().flush();
    });

    match downloader.run(&cli.url, &dest, &cancel, Some(on_progress)) {
        Ok(report) => {
            println!();
            println!(
                "Saved {} ({})",
                dest.display(),
                format_size(report.bytes_written)
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!();
            eprintln!("parget: {}", e);
            ExitCode::FAILURE
        }
    }
}
