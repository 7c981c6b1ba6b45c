//! Transport collaborator interface
//!
//! Any object-store client satisfying [`ObjectTransport`] is substitutable:
//! the orchestrator only needs an existence check and a byte-moving upload
//! with chunk-granular progress callbacks. Retry policy for transient
//! failures, if any, lives behind this trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::policy::TransferConfig;

/// Byte-delta progress callback invoked by the transport at chunk
/// boundaries of its choosing
pub type ProgressFn = Arc<dyn Fn(u64) + Send + Sync>;

#[cfg(test)]
use mockall::automock;

/// Object-store operations the upload engine requires
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectTransport: Send + Sync {
    /// Report whether an object already exists at `bucket`/`key`.
    ///
    /// A clean "key not found" must be `Ok(false)`, never an error. Other
    /// retrieval failures surface as errors; the orchestrator decides how
    /// to interpret them (see `ExistenceCheckMode`).
    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool>;

    /// Upload the file at `local_path` to `bucket`/`key`, splitting into
    /// concurrently uploaded parts per `cfg` when the file exceeds the
    /// multipart threshold. `on_bytes` is invoked with the byte delta of
    /// each transferred chunk.
    async fn upload(
        &self,
        local_path: &str,
        bucket: &str,
        key: &str,
        cfg: &TransferConfig,
        on_bytes: ProgressFn,
    ) -> Result<()>;
}
