//! Texture byte sources.
//!
//! The resolver never touches the network or the file system itself; it asks
//! a [`TextureFetcher`] for the bytes behind a URI. [`DefaultFetcher`]
//! handles the URIs a floor-plan catalog carries in practice:
//!
//! - `data:` URIs, decoded in place (`;base64` payloads with base64,
//!   everything else percent-decoded)
//! - `http://` and `https://` URIs, fetched with a bounded timeout and body
//!   size
//! - plain paths, read from the local file system

use std::{
    fs::File,
    io::{self, Read},
    time::Duration,
};

use base64::Engine;
use log::debug;
use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Why the bytes behind a URI could not be obtained.
///
/// Every variant carries only owned strings so results can be cached and
/// handed to every mesh that shares the texture.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("malformed data URI")]
    MalformedDataUri,

    #[error("invalid base64 payload: {0}")]
    Base64(String),

    #[error("unsupported URI scheme `{0}`")]
    UnsupportedScheme(String),

    #[error("request failed: {0}")]
    Http(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("payload exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("payload is empty")]
    Empty,

    #[error("payload is not a PNG or JPEG image")]
    UnsupportedFormat,
}

/// Raw bytes plus the media type their source declared, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    bytes: Vec<u8>,
    media_type: Option<String>,
}

impl Payload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            media_type: None,
        }
    }

    /// Attaches a declared media type (data URI header, HTTP content type).
    pub fn with_media_type(mut self, media_type: Option<String>) -> Self {
        self.media_type = media_type;
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Resolves texture URIs to bytes.
///
/// Implementations must be shareable across the rayon pool: the resolver
/// calls [`fetch`](Self::fetch) from several threads at once, at most once
/// per distinct URI within one export.
pub trait TextureFetcher: Send + Sync {
    /// Returns the bytes behind `uri`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the URI cannot be decoded or loaded.
    fn fetch(&self, uri: &str) -> Result<Payload, FetchError>;
}

/// Decodes a `data:` URI.
///
/// # Examples
///
/// ```
/// # use storey::resolve::decode_data_uri;
/// let payload = decode_data_uri("data:image/png;base64,iVBORw==").unwrap();
/// assert_eq!(payload.media_type(), Some("image/png"));
/// assert_eq!(payload.bytes(), &[0x89, b'P', b'N', b'G']);
///
/// let text = decode_data_uri("data:,hello%20world").unwrap();
/// assert_eq!(text.bytes(), b"hello world");
/// ```
///
/// # Errors
///
/// Returns [`FetchError::MalformedDataUri`] when there is no `data:` prefix
/// or no `,` separator, and [`FetchError::Base64`] for a bad base64 body.
pub fn decode_data_uri(uri: &str) -> Result<Payload, FetchError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or(FetchError::MalformedDataUri)?;
    let (header, data) = rest.split_once(',').ok_or(FetchError::MalformedDataUri)?;

    let (header, is_base64) = match header.strip_suffix(";base64") {
        Some(header) => (header, true),
        None => (header, false),
    };
    let media_type = header
        .split(';')
        .next()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_ascii_lowercase);

    let bytes = if is_base64 {
        let data: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|err| FetchError::Base64(err.to_string()))?
    } else {
        percent_decode_str(data).collect()
    };

    Ok(Payload::new(bytes).with_media_type(media_type))
}

/// The fetcher used unless another one is installed on the exporter.
#[derive(Debug, Clone)]
pub struct DefaultFetcher {
    agent: ureq::Agent,
    max_bytes: u64,
}

impl DefaultFetcher {
    pub fn new(timeout: Duration, max_bytes: u64) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent, max_bytes }
    }

    fn read_limited(&self, reader: impl Read) -> Result<Vec<u8>, FetchError> {
        let mut bytes = Vec::new();
        reader
            .take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|err| FetchError::Io(err.to_string()))?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(FetchError::TooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(bytes)
    }

    fn fetch_http(&self, uri: &str) -> Result<Payload, FetchError> {
        let response = self
            .agent
            .get(uri)
            .call()
            .map_err(|err| FetchError::Http(err.to_string()))?;
        let media_type = response
            .header("content-type")
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase());
        let bytes = self.read_limited(response.into_reader())?;
        Ok(Payload::new(bytes).with_media_type(media_type))
    }

    fn fetch_file(&self, path: &str) -> Result<Payload, FetchError> {
        let file = File::open(path).map_err(|err: io::Error| FetchError::Io(err.to_string()))?;
        Ok(Payload::new(self.read_limited(file)?))
    }
}

impl TextureFetcher for DefaultFetcher {
    fn fetch(&self, uri: &str) -> Result<Payload, FetchError> {
        let payload = if uri.starts_with("data:") {
            decode_data_uri(uri)?
        } else if uri.starts_with("http://") || uri.starts_with("https://") {
            debug!(uri; "Fetching texture");
            self.fetch_http(uri)?
        } else if let Some(path) = uri.strip_prefix("file://") {
            self.fetch_file(path)?
        } else if let Some((scheme, _)) = uri.split_once("://") {
            return Err(FetchError::UnsupportedScheme(scheme.to_string()));
        } else {
            self.fetch_file(uri)?
        };

        if payload.bytes().is_empty() {
            return Err(FetchError::Empty);
        }
        if payload.bytes().len() as u64 > self.max_bytes {
            return Err(FetchError::TooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn fetcher() -> DefaultFetcher {
        DefaultFetcher::new(Duration::from_secs(1), 64)
    }

    #[test]
    fn test_base64_data_uri() {
        let payload = fetcher().fetch("data:image/jpeg;base64,/9j/4A==").unwrap();
        assert_eq!(payload.media_type(), Some("image/jpeg"));
        assert_eq!(payload.bytes(), &[0xff, 0xd8, 0xff, 0xe0]);
    }

    #[test]
    fn test_percent_encoded_data_uri_without_media_type() {
        let payload = decode_data_uri("data:,a%2Cb").unwrap();
        assert_eq!(payload.media_type(), None);
        assert_eq!(payload.bytes(), b"a,b");
    }

    #[test]
    fn test_data_uri_with_parameters() {
        let payload = decode_data_uri("data:Image/PNG;name=x.png;base64,AAEC").unwrap();
        assert_eq!(payload.media_type(), Some("image/png"));
        assert_eq!(payload.bytes(), &[0, 1, 2]);
    }

    #[test]
    fn test_malformed_data_uris() {
        assert_eq!(
            decode_data_uri("data:image/png;base64").unwrap_err(),
            FetchError::MalformedDataUri
        );
        assert!(matches!(
            decode_data_uri("data:image/png;base64,!!!"),
            Err(FetchError::Base64(_))
        ));
    }

    #[test]
    fn test_empty_and_oversized_payloads() {
        assert_eq!(fetcher().fetch("data:,").unwrap_err(), FetchError::Empty);

        let big = format!("data:,{}", "x".repeat(65));
        assert_eq!(
            fetcher().fetch(&big).unwrap_err(),
            FetchError::TooLarge { limit: 64 }
        );
    }

    #[test]
    fn test_unsupported_scheme() {
        assert_eq!(
            fetcher().fetch("ftp://example.com/a.png").unwrap_err(),
            FetchError::UnsupportedScheme("ftp".to_string())
        );
    }

    #[test]
    fn test_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[1, 2, 3]).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let payload = fetcher().fetch(&path).unwrap();
        assert_eq!(payload.bytes(), &[1, 2, 3]);
        assert_eq!(payload.media_type(), None);

        assert!(matches!(
            fetcher().fetch("/definitely/not/here.png"),
            Err(FetchError::Io(_))
        ));
    }
}
