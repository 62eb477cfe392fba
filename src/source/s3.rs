//! S3 range fetcher.
//!
//! Each fetch is a ranged `GetObject`. Custom endpoints cover S3-compatible
//! services (MinIO, LocalStack, etc.).

use super::{ByteRange, RangeFetcher};
use crate::{Error, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use bytes::Bytes;

/// Range fetcher for a single S3 object.
pub struct S3Fetcher {
    client: Client,
    bucket: String,
    key: String,
}

impl S3Fetcher {
    /// Create a new S3Fetcher.
    ///
    /// # Arguments
    ///
    /// * `bucket` - S3 bucket name
    /// * `key` - Object key (e.g., "genomes/hg38.fa")
    /// * `region` - Optional AWS region (uses SDK defaults if not specified)
    /// * `endpoint` - Optional custom endpoint URL (for S3-compatible services)
    pub async fn new(
        bucket: String,
        key: String,
        region: Option<String>,
        endpoint: Option<String>,
    ) -> Result<Self> {
        let mut config_loader = aws_config::from_env();

        if let Some(region) = region {
            config_loader = config_loader.region(aws_config::Region::new(region));
        }

        let sdk_config = config_loader.load().await;

        let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = endpoint {
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(s3_config.build()),
            bucket,
            key,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Only a missing object is `NotFound`; credentials, throttling and network
/// failures surface as `Remote` with the SDK message.
fn head_object_error(err: SdkError<HeadObjectError>, object: String) -> Error {
    if err
        .as_service_error()
        .is_some_and(HeadObjectError::is_not_found)
    {
        return Error::NotFound(object);
    }
    Error::Remote(format!("S3 head_object failed for {}: {}", object, err))
}

#[async_trait]
impl RangeFetcher for S3Fetcher {
    async fn content_length(&self) -> Result<Option<u64>> {
        let head = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await
            .map_err(|e| head_object_error(e, self.describe()))?;

        Ok(head
            .content_length()
            .and_then(|length| u64::try_from(length).ok()))
    }

    async fn fetch(&self, range: ByteRange) -> Result<Bytes> {
        if range.is_empty() {
            return Ok(Bytes::new());
        }

        tracing::trace!("GetObject {} {}", self.describe(), range.header_value());

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .range(range.header_value())
            .send()
            .await
            .map_err(|e| Error::Remote(format!("S3 get_object failed: {}", e)))?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| Error::Remote(format!("S3 read body failed: {}", e)))?;

        Ok(body.into_bytes())
    }

    fn describe(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
