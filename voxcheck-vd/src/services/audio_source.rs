//! Audio input acquisition
//!
//! Turns the request's `audioBase64` / `audioUrl` fields into an
//! `AudioBuffer`. Exactly one source must be present. Every failure here is
//! a client input error.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::AudioBuffer;

/// Default download timeout
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Default ceiling on decoded or downloaded audio size (20 MiB)
pub const DEFAULT_MAX_AUDIO_BYTES: usize = 20 * 1024 * 1024;

const USER_AGENT: &str = concat!("voxcheck-vd/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("No audio input provided")]
    Missing,

    #[error("Provide either audioBase64 or audioUrl, not both")]
    Ambiguous,

    #[error("Invalid base64 audio data: {0}")]
    InvalidBase64(String),

    #[error("Failed to download audio from URL: {0}")]
    Fetch(String),

    #[error("Audio exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
}

/// Where the audio bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    /// Standard base64 text
    Inline(String),
    /// Remote file fetched with HTTP GET
    Url(String),
}

impl AudioSource {
    /// Pick the single non-empty source
    ///
    /// Blank strings count as absent.
    pub fn select(audio_base64: Option<String>, audio_url: Option<String>) -> Result<Self, SourceError> {
        let inline = audio_base64.filter(|s| !s.trim().is_empty());
        let url = audio_url.filter(|s| !s.trim().is_empty());

        match (inline, url) {
            (Some(data), None) => Ok(AudioSource::Inline(data)),
            (None, Some(url)) => Ok(AudioSource::Url(url.trim().to_string())),
            (Some(_), Some(_)) => Err(SourceError::Ambiguous),
            (None, None) => Err(SourceError::Missing),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AudioSource::Inline(_) => "base64",
            AudioSource::Url(_) => "url",
        }
    }
}

/// Decode standard base64, ignoring ASCII whitespace
pub fn decode_base64(data: &str, max_bytes: usize) -> Result<AudioBuffer, SourceError> {
    let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    // Reject before allocating the decoded buffer
    if cleaned.len() / 4 * 3 > max_bytes.saturating_add(2) {
        return Err(SourceError::TooLarge { limit: max_bytes });
    }

    let bytes = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| SourceError::InvalidBase64(e.to_string()))?;

    if bytes.len() > max_bytes {
        return Err(SourceError::TooLarge { limit: max_bytes });
    }

    Ok(AudioBuffer::new(bytes))
}

/// Loads audio from either source
///
/// Holds one `reqwest::Client` for the life of the service.
#[derive(Debug, Clone)]
pub struct AudioFetcher {
    client: reqwest::Client,
    max_audio_bytes: usize,
}

impl AudioFetcher {
    pub fn new(timeout: Duration, max_audio_bytes: usize) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            max_audio_bytes,
        })
    }

    pub async fn load(&self, source: AudioSource) -> Result<AudioBuffer, SourceError> {
        match source {
            AudioSource::Inline(data) => decode_base64(&data, self.max_audio_bytes),
            AudioSource::Url(url) => self.fetch(&url).await,
        }
    }

    /// GET `url` and buffer the body, enforcing the size limit while reading
    pub async fn fetch(&self, url: &str) -> Result<AudioBuffer, SourceError> {
        debug!(url, "Fetching audio");

        let mut response = self.client.get(url).send().await.map_err(|e| {
            warn!(url, error = %e, "Audio download failed");
            SourceError::Fetch(describe(&e))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Audio download rejected");
            return Err(SourceError::Fetch(format!("HTTP {}", status)));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_audio_bytes as u64 {
                return Err(SourceError::TooLarge {
                    limit: self.max_audio_bytes,
                });
            }
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| SourceError::Fetch(describe(&e)))?
        {
            if bytes.len() + chunk.len() > self.max_audio_bytes {
                return Err(SourceError::TooLarge {
                    limit: self.max_audio_bytes,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        debug!(url, bytes = bytes.len(), "Audio downloaded");
        Ok(AudioBuffer::new(bytes))
    }
}

fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_single_source() {
        assert_eq!(
            AudioSource::select(Some("AAAA".into()), None).unwrap(),
            AudioSource::Inline("AAAA".into())
        );
        assert_eq!(
            AudioSource::select(None, Some(" http://x/a.mp3 ".into())).unwrap(),
            AudioSource::Url("http://x/a.mp3".into())
        );
    }

    #[test]
    fn test_select_rejects_missing_and_both() {
        assert!(matches!(AudioSource::select(None, None), Err(SourceError::Missing)));
        assert!(matches!(
            AudioSource::select(Some("  ".into()), Some(String::new())),
            Err(SourceError::Missing)
        ));
        assert!(matches!(
            AudioSource::select(Some("AAAA".into()), Some("http://x".into())),
            Err(SourceError::Ambiguous)
        ));
    }

    #[test]
    fn test_decode_base64_ignores_whitespace() {
        let buffer = decode_base64("aGVs\nbG8g\r\nd29y bGQ=", 1024).unwrap();
        assert_eq!(buffer.as_bytes(), b"hello world");
    }

    #[test]
    fn test_decode_base64_invalid() {
        assert!(matches!(
            decode_base64("not base64!!", 1024),
            Err(SourceError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_decode_base64_size_limit() {
        assert!(matches!(
            decode_base64("aGVsbG8gd29ybGQ=", 4),
            Err(SourceError::TooLarge { limit: 4 })
        ));
        assert!(decode_base64("aGVsbG8gd29ybGQ=", 11).is_ok());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(SourceError::Missing.to_string(), "No audio input provided");
        assert!(SourceError::Fetch("HTTP 404 Not Found".into())
            .to_string()
            .starts_with("Failed to download audio from URL"));
    }
}
