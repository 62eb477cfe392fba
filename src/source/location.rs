use super::{FileSource, SeekableSource};
use crate::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

/// Where a source lives, parsed from a user-supplied string.
///
/// `http://` and `https://` URLs are remote HTTP objects, `s3://bucket/key`
/// is an S3 object, `file://` URLs and everything else are local paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    Http(Url),
    S3 { bucket: String, key: String },
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidInput("empty source location".to_string()));
        }

        // Windows drive letters parse as single-letter URL schemes
        let url = match Url::parse(s) {
            Ok(url) if url.scheme().len() > 1 => url,
            _ => return Ok(Location::File(PathBuf::from(s))),
        };

        match url.scheme() {
            "http" | "https" => Ok(Location::Http(url)),
            "s3" => {
                let bucket = url
                    .host_str()
                    .filter(|h| !h.is_empty())
                    .ok_or_else(|| Error::InvalidInput(format!("missing S3 bucket: {}", s)))?
                    .to_string();
                let key = url.path().trim_start_matches('/').to_string();
                if key.is_empty() {
                    return Err(Error::InvalidInput(format!("missing S3 key: {}", s)));
                }
                Ok(Location::S3 { bucket, key })
            }
            "file" => url
                .to_file_path()
                .map(Location::File)
                .map_err(|_| Error::InvalidInput(format!("invalid file URL: {}", s))),
            other => Err(Error::InvalidInput(format!(
                "unsupported source scheme: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Http(url) => write!(f, "{}", url),
            Location::S3 { bucket, key } => write!(f, "s3://{}/{}", bucket, key),
        }
    }
}

/// Backend settings used when opening remote locations.
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
}

/// Open the source behind `location`.
pub fn open(location: &Location, options: &OpenOptions) -> Result<Box<dyn SeekableSource>> {
    tracing::debug!("opening source {}", location);

    match location {
        Location::File(path) => Ok(Box::new(FileSource::open(path)?)),
        Location::Http(url) => open_http(url),
        Location::S3 { bucket, key } => open_s3(bucket, key, options),
    }
}

#[cfg(feature = "http")]
fn open_http(url: &Url) -> Result<Box<dyn SeekableSource>> {
    let fetcher = super::HttpFetcher::new(url.clone())?;
    Ok(Box::new(super::RemoteSource::new(fetcher)?))
}

#[cfg(not(feature = "http"))]
fn open_http(url: &Url) -> Result<Box<dyn SeekableSource>> {
    Err(Error::InvalidInput(format!(
        "HTTP support not compiled in: {}",
        url
    )))
}

#[cfg(feature = "s3")]
fn open_s3(bucket: &str, key: &str, options: &OpenOptions) -> Result<Box<dyn SeekableSource>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let fetcher = runtime.block_on(super::S3Fetcher::new(
        bucket.to_string(),
        key.to_string(),
        options.s3_region.clone(),
        options.s3_endpoint.clone(),
    ))?;
    Ok(Box::new(super::RemoteSource::with_runtime(fetcher, runtime)?))
}

#[cfg(not(feature = "s3"))]
fn open_s3(bucket: &str, key: &str, _options: &OpenOptions) -> Result<Box<dyn SeekableSource>> {
    Err(Error::InvalidInput(format!(
        "S3 support not compiled in: s3://{}/{}",
        bucket, key
    )))
}
