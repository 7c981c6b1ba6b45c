//! Run policy and transfer tuning
//!
//! [`SyncPolicy`] is immutable for the duration of a run. [`TransferConfig`]
//! mirrors the transport tuning knobs and can be loaded from the
//! environment (`S3BULK_*` variables).

use std::str::FromStr;

/// How a failed existence check is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistenceCheckMode {
    /// Ambiguous check errors treat the object as absent so the upload is
    /// not blocked. Availability over skip-accuracy: at worst an existing
    /// object is uploaded again.
    #[default]
    AssumeAbsentOnAmbiguousError,

    /// Ambiguous check errors fail the file
    Strict,
}

/// Whether a per-file transport failure aborts the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Record the failure and continue with the remaining files
    #[default]
    BestEffort,

    /// Abort the run on the first per-file failure
    FailFast,
}

/// Configuration for one orchestration run
#[derive(Debug, Clone, Default)]
pub struct SyncPolicy {
    /// Descend into subdirectories when the root is a directory
    pub recursive: bool,

    /// Keep only files whose name ends with one of these suffixes
    /// (case-sensitive); empty means no filter
    pub extensions: Vec<String>,

    /// Optional prefix prepended to derived keys
    pub key_prefix: Option<String>,

    /// Upload even when the destination key already exists
    pub replace_if_exists: bool,

    /// Existence check interpretation (see [`ExistenceCheckMode`])
    pub existence_mode: ExistenceCheckMode,

    /// Batch failure policy (see [`FailureMode`])
    pub failure_mode: FailureMode,
}

/// Transfer tuning passed to the transport collaborator
///
/// The default threshold and chunk size are intentionally small (25 KiB)
/// to exercise the multipart path; production deployments should raise
/// them via the environment.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// File size above which multipart upload is used (bytes)
    pub multipart_threshold: u64,

    /// Size of each multipart chunk (bytes)
    pub multipart_chunk_size: u64,

    /// Maximum number of parts in flight for one file
    pub max_concurrency: usize,

    /// When false, parts are uploaded sequentially
    pub use_threads: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            multipart_threshold: 25 * 1024,
            multipart_chunk_size: 25 * 1024,
            max_concurrency: 10,
            use_threads: true,
        }
    }
}

impl TransferConfig {
    /// Load tuning from `S3BULK_*` environment variables, falling back to
    /// defaults for anything unset or unparseable
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but with an injectable lookup,
    /// so tests don't have to mutate process-global environment state
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            multipart_threshold: parse_or(
                lookup("S3BULK_MULTIPART_THRESHOLD"),
                defaults.multipart_threshold,
            ),
            multipart_chunk_size: parse_or(
                lookup("S3BULK_MULTIPART_CHUNK_SIZE"),
                defaults.multipart_chunk_size,
            ),
            max_concurrency: parse_or(lookup("S3BULK_MAX_CONCURRENCY"), defaults.max_concurrency)
                .max(1),
            use_threads: parse_or(lookup("S3BULK_USE_THREADS"), defaults.use_threads),
        }
    }

    /// Effective part concurrency: 1 when threading is disabled
    pub fn effective_concurrency(&self) -> usize {
        if self.use_threads {
            self.max_concurrency.max(1)
        } else {
            1
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_defaults() {
        let cfg = TransferConfig::default();
        assert_eq!(cfg.multipart_threshold, 25 * 1024);
        assert_eq!(cfg.multipart_chunk_size, 25 * 1024);
        assert_eq!(cfg.max_concurrency, 10);
        assert!(cfg.use_threads);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let cfg = TransferConfig::from_lookup(|key| match key {
            "S3BULK_MULTIPART_THRESHOLD" => Some("1048576".to_string()),
            "S3BULK_MAX_CONCURRENCY" => Some("4".to_string()),
            "S3BULK_USE_THREADS" => Some("false".to_string()),
            _ => None,
        });
        assert_eq!(cfg.multipart_threshold, 1048576);
        assert_eq!(cfg.max_concurrency, 4);
        assert!(!cfg.use_threads);
        // Unset keys keep defaults
        assert_eq!(cfg.multipart_chunk_size, 25 * 1024);
    }

    #[test]
    fn test_from_lookup_garbage_falls_back() {
        let cfg = TransferConfig::from_lookup(|key| match key {
            "S3BULK_MULTIPART_THRESHOLD" => Some("not-a-number".to_string()),
            "S3BULK_MAX_CONCURRENCY" => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(cfg.multipart_threshold, 25 * 1024);
        // Concurrency is clamped to at least one worker
        assert_eq!(cfg.max_concurrency, 1);
    }

    #[test]
    fn test_effective_concurrency() {
        let mut cfg = TransferConfig::default();
        assert_eq!(cfg.effective_concurrency(), 10);
        cfg.use_threads = false;
        assert_eq!(cfg.effective_concurrency(), 1);
    }

    #[test]
    fn test_policy_defaults() {
        let policy = SyncPolicy::default();
        assert!(!policy.recursive);
        assert!(!policy.replace_if_exists);
        assert!(policy.extensions.is_empty());
        assert_eq!(
            policy.existence_mode,
            ExistenceCheckMode::AssumeAbsentOnAmbiguousError
        );
        assert_eq!(policy.failure_mode, FailureMode::BestEffort);
    }
}
