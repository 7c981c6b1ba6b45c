//! sb-core: Core upload orchestration engine for s3bulk
//!
//! This crate provides the upload orchestration engine:
//! - File enumeration (flat or recursive, extension-filtered)
//! - Destination key derivation
//! - Existence-check-and-skip decisioning
//! - Per-file transfer pipeline with progress tracking
//!
//! This crate is designed to be independent of any specific S3 SDK:
//! all wire operations go through the [`ObjectTransport`] trait, so any
//! object-store client can be plugged in (and mocked in tests).

pub mod error;
pub mod key;
pub mod policy;
pub mod progress;
pub mod sync;
pub mod transfer;
pub mod traits;
pub mod walk;

pub use error::{Error, Result};
pub use key::derive_key;
pub use policy::{ExistenceCheckMode, FailureMode, SyncPolicy, TransferConfig};
pub use progress::{ProgressTracker, ProgressUpdate};
pub use sync::{EventSink, FileFailure, Orchestrator, SyncEvent, SyncSummary};
pub use traits::{ObjectTransport, ProgressFn};
pub use walk::{FileEntry, RootKind, classify_root, enumerate};
