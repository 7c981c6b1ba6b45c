//! Per-file transfer pipeline
//!
//! Binds one file's progress state to the transport's byte-delta callbacks
//! and wraps transport failures into per-file transfer errors. The
//! progress sink is an explicit value passed in by the caller; no global
//! state is captured.

use std::sync::Arc;

use crate::error::Result;
use crate::policy::TransferConfig;
use crate::progress::{ProgressTracker, ProgressUpdate};
use crate::traits::{ObjectTransport, ProgressFn};
use crate::walk::FileEntry;

/// Transfer one file to `bucket`/`key`, reporting progress to `sink`.
///
/// Errors from the transport are wrapped as [`Error::Transfer`] for this
/// key, except a local not-found (the source vanished mid-run) which
/// propagates unchanged so the orchestrator can abort the batch.
///
/// [`Error::Transfer`]: crate::error::Error::Transfer
pub async fn transfer_file<T: ObjectTransport + ?Sized>(
    transport: &T,
    entry: &FileEntry,
    bucket: &str,
    key: &str,
    cfg: &TransferConfig,
    sink: impl Fn(ProgressUpdate) + Send + Sync + 'static,
) -> Result<()> {
    let tracker = Arc::new(ProgressTracker::new(entry.path.clone(), entry.size, sink));
    let on_bytes: ProgressFn = {
        let tracker = tracker.clone();
        Arc::new(move |bytes_delta| tracker.record(bytes_delta))
    };

    transport
        .upload(&entry.path, bucket, key, cfg, on_bytes)
        .await
        .map_err(|e| e.into_transfer(key))
}
