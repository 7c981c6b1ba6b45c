//! upload command - Upload local files to a bucket
//!
//! Enumerates files under the root path, derives destination keys, skips
//! objects that already exist (unless replacement is requested), and
//! transfers the rest with live per-file progress.

use std::io::Write;
use std::sync::Arc;

use clap::Args;
use humansize::{BINARY, format_size};
use serde::Serialize;

use sb_core::{
    EventSink, FailureMode, FileFailure, Orchestrator, SyncEvent, SyncPolicy, SyncSummary,
    TransferConfig,
};
use sb_s3::S3Transport;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Upload local files to a bucket
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local file or directory to upload from
    pub root_path: String,

    /// Destination bucket name
    pub bucket_name: String,

    /// AWS profile to resolve credentials from
    #[arg(long)]
    pub aws_profile_name: Option<String>,

    /// AWS region of the destination bucket
    #[arg(long, default_value = "us-east-1")]
    pub aws_region_name: String,

    /// Prefix prepended to derived object keys
    #[arg(long)]
    pub key_prefix: Option<String>,

    /// Keep only files ending with these suffixes (case-sensitive, repeatable)
    #[arg(short = 'e', long = "extensions")]
    pub extensions: Vec<String>,

    /// Descend into subdirectories
    #[arg(long)]
    pub recursive: bool,

    /// Upload even when the destination key already exists
    #[arg(long)]
    pub replace_if_exists: bool,

    /// Abort the batch on the first per-file failure instead of continuing
    #[arg(long)]
    pub fail_fast: bool,

    /// Skip the data-cost confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
struct UploadOutput {
    root_path: String,
    bucket: String,
    total: usize,
    uploaded: usize,
    skipped: usize,
    failed: usize,
    failures: Vec<FileFailure>,
}

impl UploadOutput {
    fn new(args: &UploadArgs, summary: &SyncSummary) -> Self {
        Self {
            root_path: args.root_path.clone(),
            bucket: args.bucket_name.clone(),
            total: summary.total,
            uploaded: summary.uploaded,
            skipped: summary.skipped,
            failed: summary.failed,
            failures: summary.failures.clone(),
        }
    }
}

/// Execute the upload command
pub async fn execute(args: UploadArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    if !args.yes && !formatter.is_json() && !formatter.is_quiet() && !confirm_data_costs() {
        formatter.println("Aborted.");
        return ExitCode::Success;
    }

    let transport =
        match S3Transport::connect(args.aws_profile_name.as_deref(), &args.aws_region_name).await {
            Ok(t) => t,
            Err(e) => {
                formatter.error(&format!("Failed to create S3 client: {e}"));
                return ExitCode::NetworkError;
            }
        };

    let policy = SyncPolicy {
        recursive: args.recursive,
        extensions: args.extensions.clone(),
        key_prefix: args.key_prefix.clone(),
        replace_if_exists: args.replace_if_exists,
        failure_mode: if args.fail_fast {
            FailureMode::FailFast
        } else {
            FailureMode::BestEffort
        },
        ..Default::default()
    };

    let orchestrator = Orchestrator::new(
        &transport,
        args.bucket_name.as_str(),
        policy,
        TransferConfig::from_env(),
    );

    let sink: EventSink = {
        let formatter = formatter.clone();
        Arc::new(move |event| render_event(&formatter, event))
    };

    match orchestrator.run(&args.root_path, sink).await {
        Ok(summary) => {
            if formatter.is_json() {
                formatter.json(&UploadOutput::new(&args, &summary));
            } else {
                formatter.println("");
                formatter.println(&format!(
                    "Upload complete: {} uploaded, {} skipped, {} failed",
                    summary.uploaded, summary.skipped, summary.failed
                ));
            }

            if summary.failed > 0 {
                ExitCode::GeneralError
            } else {
                ExitCode::Success
            }
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from_error(&e)
        }
    }
}

fn render_event(formatter: &Formatter, event: SyncEvent) {
    match event {
        SyncEvent::Processing {
            index,
            total,
            path,
            size,
        } => {
            formatter.println("");
            formatter.println(&format!(
                "Uploading file {index} of {total}: {path} ({})",
                formatter.style_size(&format_size(size, BINARY))
            ));
        }
        SyncEvent::Destination { bucket, key } => {
            formatter.println(&format!(
                "Destination: {}",
                formatter.style_name(&format!("s3://{bucket}/{key}"))
            ));
        }
        SyncEvent::SkippedExisting { key } => {
            formatter.println(&format!(
                "Object '{key}' already exists and will not be replaced."
            ));
        }
        SyncEvent::Progress(update) => {
            formatter.print_inline(&update.render());
        }
        SyncEvent::Uploaded { key } => {
            // Terminate the in-place progress line
            formatter.print_inline("\n");
            formatter.success(&format!("Uploaded '{key}'"));
        }
        SyncEvent::FileFailed {
            index,
            total,
            key,
            reason,
        } => {
            formatter.print_inline("\n");
            formatter.error(&format!("file {index} of {total} failed: {key}: {reason}"));
        }
        SyncEvent::Warning(message) => {
            formatter.warning(&message);
        }
    }
}

/// Prompt before uploading; storage is billed to the user's account
fn confirm_data_costs() -> bool {
    println!();
    println!("Warning: uploading stores data in your S3 account and may incur storage costs.");
    println!("You are responsible for managing the uploaded objects.");

    loop {
        print!("Do you want to continue? [y/n] ");
        let _ = std::io::stdout().flush();

        let mut response = String::new();
        if std::io::stdin().read_line(&mut response).is_err() {
            return false;
        }
        match response.trim().to_lowercase().as_str() {
            "y" | "yes" => return true,
            "n" | "no" => return false,
            _ => println!("Invalid response."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> UploadArgs {
        UploadArgs {
            root_path: "/data/videos".to_string(),
            bucket_name: "movie-bucket".to_string(),
            aws_profile_name: None,
            aws_region_name: "us-east-1".to_string(),
            key_prefix: None,
            extensions: vec![],
            recursive: false,
            replace_if_exists: false,
            fail_fast: false,
            yes: true,
        }
    }

    #[test]
    fn test_upload_args_defaults() {
        let args = args();
        assert_eq!(args.aws_region_name, "us-east-1");
        assert!(!args.recursive);
        assert!(!args.replace_if_exists);
        assert!(!args.fail_fast);
    }

    #[test]
    fn test_upload_output_serialization() {
        let summary = SyncSummary {
            total: 3,
            uploaded: 2,
            skipped: 1,
            failed: 0,
            failures: vec![],
        };
        let output = UploadOutput::new(&args(), &summary);
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"uploaded\":2"));
        assert!(json.contains("\"skipped\":1"));
        assert!(json.contains("\"bucket\":\"movie-bucket\""));
    }

    #[test]
    fn test_failure_reported_with_batch_position() {
        let summary = SyncSummary {
            total: 20,
            uploaded: 19,
            skipped: 0,
            failed: 1,
            failures: vec![FileFailure {
                index: 3,
                key: "media/c.mp4".to_string(),
                reason: "network error: connection reset".to_string(),
            }],
        };
        let output = UploadOutput::new(&args(), &summary);
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"index\":3"));
        assert!(json.contains("media/c.mp4"));
    }
}
