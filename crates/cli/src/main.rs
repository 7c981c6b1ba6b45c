//! s3bulk - Upload local files to S3-compatible object storage
//!
//! Thin binary wrapper: argument parsing, logging setup, and exit-code
//! mapping. All upload semantics live in sb-core and sb-s3.

mod exit_code;
mod output;
mod upload;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::output::OutputConfig;

/// Upload local files to S3-compatible object storage
#[derive(Parser, Debug)]
#[command(name = "s3bulk", version, about)]
struct Cli {
    #[command(flatten)]
    upload: upload::UploadArgs,

    /// Output strict JSON instead of human-readable text
    #[arg(long)]
    json: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so progress lines own stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_config = OutputConfig {
        json: cli.json,
        quiet: cli.quiet,
        no_color: cli.no_color,
    };

    let code = upload::execute(cli.upload, output_config).await;
    std::process::exit(code.code());
}
