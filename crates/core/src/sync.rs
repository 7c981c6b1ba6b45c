//! Upload orchestrator
//!
//! Composes enumeration, key derivation, the existence check, and the
//! transfer pipeline. Files are processed strictly in enumeration order,
//! one at a time; concurrency exists only inside a single transfer.
//!
//! Per file the state machine is
//! `Discovered -> KeyDerived -> {Skipped | Transferring -> {Succeeded | Failed}}`.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::key::derive_key;
use crate::policy::{ExistenceCheckMode, FailureMode, SyncPolicy, TransferConfig};
use crate::progress::ProgressUpdate;
use crate::traits::ObjectTransport;
use crate::transfer::transfer_file;
use crate::walk::{RootKind, classify_root, enumerate};

/// Observable side effects of a run, in emission order
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A file has been picked up for processing (1-based index)
    Processing {
        index: usize,
        total: usize,
        path: String,
        size: u64,
    },
    /// The resolved destination for the current file
    Destination { bucket: String, key: String },
    /// The destination key already exists and replacement is disabled
    SkippedExisting { key: String },
    /// Live byte progress for the current transfer
    Progress(ProgressUpdate),
    /// The current file finished uploading
    Uploaded { key: String },
    /// The current file's transfer failed (best-effort mode continues)
    FileFailed {
        index: usize,
        total: usize,
        key: String,
        reason: String,
    },
    /// Non-fatal condition worth surfacing to the user
    Warning(String),
}

/// Event sink shared with part-upload workers, hence `Fn + Send + Sync`
pub type EventSink = Arc<dyn Fn(SyncEvent) + Send + Sync>;

/// A per-file failure recorded in the summary
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    /// 1-based position in the batch
    pub index: usize,
    pub key: String,
    pub reason: String,
}

/// Outcome of one orchestration run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncSummary {
    pub total: usize,
    pub uploaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<FileFailure>,
}

/// Drives one batch upload run against a transport collaborator
pub struct Orchestrator<'a, T: ObjectTransport + ?Sized> {
    transport: &'a T,
    bucket: String,
    policy: SyncPolicy,
    transfer_cfg: TransferConfig,
}

impl<'a, T: ObjectTransport + ?Sized> Orchestrator<'a, T> {
    pub fn new(
        transport: &'a T,
        bucket: impl Into<String>,
        policy: SyncPolicy,
        transfer_cfg: TransferConfig,
    ) -> Self {
        Self {
            transport,
            bucket: bucket.into(),
            policy,
            transfer_cfg,
        }
    }

    /// Run the batch: enumerate under `root_path`, then for each file
    /// derive the key, consult the existence check, and conditionally
    /// transfer.
    ///
    /// Enumeration errors abort before any upload. A local not-found
    /// during a transfer (source vanished) always aborts. Transport
    /// failures follow the configured [`FailureMode`]: recorded and
    /// skipped past in best-effort mode, fatal in fail-fast mode.
    pub async fn run(&self, root_path: &str, events: EventSink) -> Result<SyncSummary> {
        let root_kind = classify_root(root_path)?;
        if self.policy.recursive && root_kind == RootKind::File {
            events(SyncEvent::Warning(format!(
                "{root_path} is a single file; --recursive has no effect"
            )));
        }

        let entries = enumerate(root_path, self.policy.recursive, &self.policy.extensions)?;
        let total = entries.len();
        let mut summary = SyncSummary {
            total,
            ..Default::default()
        };

        for (i, entry) in entries.iter().enumerate() {
            let index = i + 1;
            events(SyncEvent::Processing {
                index,
                total,
                path: entry.path.clone(),
                size: entry.size,
            });

            let key = derive_key(
                &entry.path,
                root_path,
                self.policy.key_prefix.as_deref(),
                root_kind == RootKind::Directory,
            );

            let exists = match self.check_exists(&key).await {
                Ok(exists) => exists,
                // Strict mode: an ambiguous check fails this file, not
                // the batch, and follows the configured failure mode
                Err(err) => {
                    summary.failed += 1;
                    summary.failures.push(FileFailure {
                        index,
                        key: key.clone(),
                        reason: err.to_string(),
                    });
                    events(SyncEvent::FileFailed {
                        index,
                        total,
                        key: key.clone(),
                        reason: err.to_string(),
                    });
                    if self.policy.failure_mode == FailureMode::FailFast {
                        return Err(err.into_transfer(&key));
                    }
                    continue;
                }
            };
            if exists && !self.policy.replace_if_exists {
                events(SyncEvent::SkippedExisting { key });
                summary.skipped += 1;
                continue;
            }

            events(SyncEvent::Destination {
                bucket: self.bucket.clone(),
                key: key.clone(),
            });

            let progress_events = events.clone();
            let result = transfer_file(
                self.transport,
                entry,
                &self.bucket,
                &key,
                &self.transfer_cfg,
                move |update| progress_events(SyncEvent::Progress(update)),
            )
            .await;

            match result {
                Ok(()) => {
                    summary.uploaded += 1;
                    events(SyncEvent::Uploaded { key });
                }
                // Source file disappeared mid-run: unrecoverable
                Err(err @ Error::NotFound(_)) => return Err(err),
                Err(err) => {
                    summary.failed += 1;
                    summary.failures.push(FileFailure {
                        index,
                        key: key.clone(),
                        reason: err.to_string(),
                    });
                    events(SyncEvent::FileFailed {
                        index,
                        total,
                        key,
                        reason: err.to_string(),
                    });
                    if self.policy.failure_mode == FailureMode::FailFast {
                        return Err(err);
                    }
                }
            }
        }

        Ok(summary)
    }

    /// Existence check with the configured interpretation of ambiguous
    /// errors. Under `AssumeAbsentOnAmbiguousError` a failed check treats
    /// the object as absent so the upload is not blocked; at worst an
    /// existing object is re-uploaded. Under `Strict` the error is
    /// returned and the caller records it as a per-file failure.
    async fn check_exists(&self, key: &str) -> Result<bool> {
        match self.transport.object_exists(&self.bucket, key).await {
            Ok(exists) => Ok(exists),
            Err(e) => match self.policy.existence_mode {
                ExistenceCheckMode::AssumeAbsentOnAmbiguousError => {
                    tracing::warn!(key, error = %e, "existence check failed; assuming absent");
                    Ok(false)
                }
                ExistenceCheckMode::Strict => Err(e),
            },
        }
    }
}
