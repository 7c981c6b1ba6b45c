//! sb-s3: AWS S3 transport adapter for s3bulk
//!
//! Implements the `ObjectTransport` trait from sb-core on top of
//! aws-sdk-s3: existence checks via HeadObject, single-part PutObject for
//! small files, and chunked multipart upload with bounded concurrency for
//! large ones. Transient failures are retried here, behind the trait.

pub mod client;
pub mod retry;

pub use client::S3Transport;
pub use retry::{RetryConfig, is_retryable_error, retry_with_backoff};
