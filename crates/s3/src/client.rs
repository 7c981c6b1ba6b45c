//! S3 transport implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectTransport trait from sb-core.
//! Uploads at or below the multipart threshold go as a single PutObject;
//! larger files are split into fixed-size parts uploaded with bounded
//! concurrency.

use std::os::unix::fs::FileExt;
use std::sync::Arc;

use async_trait::async_trait;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use bytes::Bytes;
use futures::StreamExt;

use sb_core::{Error, ObjectTransport, ProgressFn, Result, TransferConfig};

use crate::retry::{RetryConfig, is_retryable_error, retry_with_backoff};

/// One multipart chunk: byte offset, length, and 1-based part number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PartRange {
    start: u64,
    len: u64,
    part_number: i32,
}

/// Split a file into fixed-size part ranges
fn part_ranges(total_bytes: u64, chunk_size: u64) -> Vec<PartRange> {
    let chunk_size = chunk_size.max(1);
    (0..total_bytes)
        .step_by(chunk_size as usize)
        .enumerate()
        .map(|(i, start)| PartRange {
            start,
            len: chunk_size.min(total_bytes - start),
            part_number: i as i32 + 1,
        })
        .collect()
}

/// S3 transport wrapper
pub struct S3Transport {
    inner: aws_sdk_s3::Client,
    retry: RetryConfig,
}

impl S3Transport {
    /// Resolve credentials and region and build a client.
    ///
    /// `profile` selects a named profile from the shared AWS config;
    /// without one the default provider chain applies. Credentials are
    /// resolved eagerly so a bad profile fails the run before any
    /// enumeration happens.
    pub async fn connect(profile: Option<&str>, region: &str) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        match config.credentials_provider() {
            Some(provider) => {
                provider
                    .provide_credentials()
                    .await
                    .map_err(|e| Error::Auth(format!("credential resolution failed: {e}")))?;
            }
            None => {
                return Err(Error::Auth(
                    "no AWS credentials provider resolved".to_string(),
                ));
            }
        }

        Ok(Self::from_client(aws_sdk_s3::Client::new(&config)))
    }

    /// Wrap an already-configured SDK client
    pub fn from_client(client: aws_sdk_s3::Client) -> Self {
        Self {
            inner: client,
            retry: RetryConfig::default(),
        }
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    /// Format AWS SDK error into a detailed error message
    fn format_sdk_error<E: std::fmt::Display>(error: &aws_sdk_s3::error::SdkError<E>) -> String {
        match error {
            aws_sdk_s3::error::SdkError::ServiceError(service_err) => {
                let err = service_err.err();
                let meta = service_err.raw();
                let mut msg = format!("Service error: {}", err);
                // Try to extract additional error information from headers
                if let Some(code) = meta.headers().get("x-amz-error-code")
                    && let Ok(code_str) = std::str::from_utf8(code.as_bytes())
                {
                    msg.push_str(&format!(" (code: {})", code_str));
                }
                msg
            }
            aws_sdk_s3::error::SdkError::ConstructionFailure(err) => {
                format!("Request construction failed: {:?}", err)
            }
            aws_sdk_s3::error::SdkError::TimeoutError(_) => "Request timeout".to_string(),
            aws_sdk_s3::error::SdkError::DispatchFailure(err) => {
                format!("Network dispatch error: {:?}", err)
            }
            aws_sdk_s3::error::SdkError::ResponseError(err) => {
                format!("Response error: {:?}", err)
            }
            _ => error.to_string(),
        }
    }

    fn map_open_error(local_path: &str, e: std::io::Error) -> Error {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(format!("local file not found: {local_path}"))
        } else {
            Error::Io(e)
        }
    }

    async fn put_single(
        &self,
        local_path: &str,
        bucket: &str,
        key: &str,
        total_bytes: u64,
        content_type: Option<&str>,
        on_bytes: &ProgressFn,
    ) -> Result<()> {
        // Stream from disk so a raised multipart threshold never buffers
        // the whole file in memory. The body is rebuilt on each attempt.
        retry_with_backoff(
            &self.retry,
            || async {
                let body = aws_sdk_s3::primitives::ByteStream::from_path(local_path)
                    .await
                    .map_err(|e| {
                        if std::path::Path::new(local_path).exists() {
                            Error::Io(std::io::Error::other(e))
                        } else {
                            Error::NotFound(format!("local file not found: {local_path}"))
                        }
                    })?;
                let mut request = self
                    .inner
                    .put_object()
                    .bucket(bucket)
                    .key(key)
                    .body(body);
                if let Some(ct) = content_type {
                    request = request.content_type(ct);
                }
                request
                    .send()
                    .await
                    .map_err(|e| Error::Network(Self::format_sdk_error(&e)))?;
                Ok(())
            },
            is_retryable_error,
        )
        .await?;

        on_bytes(total_bytes);
        Ok(())
    }

    async fn put_multipart(
        &self,
        local_path: &str,
        bucket: &str,
        key: &str,
        total_bytes: u64,
        content_type: Option<&str>,
        cfg: &TransferConfig,
        on_bytes: &ProgressFn,
    ) -> Result<()> {
        // Read-only handle scoped to this call; every exit path, including
        // failure, drops (closes) it
        let file = Arc::new(
            std::fs::File::open(local_path).map_err(|e| Self::map_open_error(local_path, e))?,
        );

        let mut create = self.inner.create_multipart_upload().bucket(bucket).key(key);
        if let Some(ct) = content_type {
            create = create.content_type(ct);
        }
        let upload_id = create
            .send()
            .await
            .map_err(|e| Error::Network(Self::format_sdk_error(&e)))?
            .upload_id()
            .ok_or_else(|| Error::Network("upload id missing".to_string()))?
            .to_string();

        let ranges = part_ranges(total_bytes, cfg.multipart_chunk_size);
        let completed = match self
            .upload_parts(&file, bucket, key, &upload_id, ranges, cfg, on_bytes)
            .await
        {
            Ok(parts) => parts,
            Err(e) => {
                // Abort so the bucket doesn't accumulate orphaned parts;
                // the original error is what the caller needs to see
                if let Err(abort_err) = self
                    .inner
                    .abort_multipart_upload()
                    .bucket(bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    tracing::warn!(
                        key,
                        error = Self::format_sdk_error(&abort_err),
                        "failed to abort multipart upload"
                    );
                }
                return Err(e);
            }
        };

        self.inner
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| Error::Network(Self::format_sdk_error(&e)))?;

        Ok(())
    }

    /// Upload all part ranges with bounded concurrency, reporting each
    /// part's byte count as it completes
    #[allow(clippy::too_many_arguments)]
    async fn upload_parts(
        &self,
        file: &Arc<std::fs::File>,
        bucket: &str,
        key: &str,
        upload_id: &str,
        ranges: Vec<PartRange>,
        cfg: &TransferConfig,
        on_bytes: &ProgressFn,
    ) -> Result<Vec<CompletedPart>> {
        let mut stream = futures::stream::iter(ranges.into_iter().map(|range| {
            let file = Arc::clone(file);
            let on_bytes = on_bytes.clone();
            async move {
                let buf = tokio::task::spawn_blocking(move || {
                    let mut buf = vec![0u8; range.len as usize];
                    file.read_exact_at(&mut buf, range.start)?;
                    Ok::<_, std::io::Error>(buf)
                })
                .await
                .map_err(|e| Error::General(format!("part read task failed: {e}")))??;

                let body = Bytes::from(buf);
                let etag = retry_with_backoff(
                    &self.retry,
                    || self.upload_one_part(bucket, key, upload_id, range.part_number, body.clone()),
                    is_retryable_error,
                )
                .await?;

                on_bytes(range.len);
                Ok::<_, Error>((range.part_number, etag))
            }
        }))
        .buffer_unordered(cfg.effective_concurrency());

        let mut parts = Vec::new();
        while let Some(result) = stream.next().await {
            let (part_number, etag) = result?;
            parts.push((part_number, etag));
        }
        drop(stream);

        // CompleteMultipartUpload requires ascending part numbers
        parts.sort_by_key(|(n, _)| *n);
        Ok(parts
            .into_iter()
            .map(|(part_number, e_tag)| {
                CompletedPart::builder()
                    .part_number(part_number)
                    .e_tag(e_tag)
                    .build()
            })
            .collect())
    }

    async fn upload_one_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: Bytes,
    ) -> Result<String> {
        let response = self
            .inner
            .upload_part()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(aws_sdk_s3::primitives::ByteStream::from(body))
            .send()
            .await
            .map_err(|e| Error::Network(Self::format_sdk_error(&e)))?;

        response
            .e_tag()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Network("etag missing in upload_part response".to_string()))
    }
}

#[async_trait]
impl ObjectTransport for S3Transport {
    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool> {
        match self
            .inner
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            // A clean 404 means absent, never an error
            Err(aws_sdk_s3::error::SdkError::ServiceError(service_err))
                if service_err.err().is_not_found() =>
            {
                Ok(false)
            }
            Err(e) => Err(Error::Network(Self::format_sdk_error(&e))),
        }
    }

    async fn upload(
        &self,
        local_path: &str,
        bucket: &str,
        key: &str,
        cfg: &TransferConfig,
        on_bytes: ProgressFn,
    ) -> Result<()> {
        let metadata = tokio::fs::metadata(local_path)
            .await
            .map_err(|e| Self::map_open_error(local_path, e))?;
        if !metadata.is_file() {
            return Err(Error::InvalidPath(format!("{local_path} is not a file")));
        }
        let total_bytes = metadata.len();
        let content_type = mime_guess::from_path(local_path).first_raw();

        if total_bytes <= cfg.multipart_threshold {
            self.put_single(local_path, bucket, key, total_bytes, content_type, &on_bytes)
                .await
        } else {
            self.put_multipart(
                local_path,
                bucket,
                key,
                total_bytes,
                content_type,
                cfg,
                &on_bytes,
            )
            .await
        }
    }
}
