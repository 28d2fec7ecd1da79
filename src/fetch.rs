use std::io::Read;
use std::time::Duration;

use flate2::read::GzDecoder;
use log::debug;
use reqwest::Client;

use crate::errors::CandidateError;

// @module: Subtitle byte download — gzip-aware, size-capped HTTP fetch

/// Per-subtitle download timeout
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(15);

/// Largest subtitle file accepted, before and after decompression
pub const MAX_SUBTITLE_BYTES: usize = 5 * 1024 * 1024;

/// Gzip magic bytes
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Download raw subtitle bytes from a catalog URL.
///
/// Gzip is detected by the URL suffix or the magic bytes and undone here, so
/// callers always receive plain subtitle bytes ready for the decoder. Bodies
/// over the size cap are rejected rather than truncated.
pub async fn fetch_subtitle_bytes(client: &Client, url: &str) -> Result<Vec<u8>, CandidateError> {
    let response = client
        .get(url)
        .timeout(DOWNLOAD_TIMEOUT)
        .send()
        .await
        .map_err(|e| CandidateError::Download(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CandidateError::Download(format!(
            "{url} responded with {status}"
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| CandidateError::Download(e.to_string()))?;

    if body.len() > MAX_SUBTITLE_BYTES {
        return Err(CandidateError::Download(format!(
            "{url} exceeds the {MAX_SUBTITLE_BYTES} byte limit"
        )));
    }

    let bytes = body.to_vec();
    if is_gzipped(url, &bytes) {
        debug!("decompressing gzipped subtitle from {url}");
        return decompress(&bytes);
    }

    Ok(bytes)
}

/// Gzip detection by URL suffix or magic bytes
fn is_gzipped(url: &str, bytes: &[u8]) -> bool {
    url.to_lowercase().ends_with(".gz") || bytes.starts_with(&GZIP_MAGIC)
}

/// Inflate a gzip body, enforcing the size cap on the inflated result
fn decompress(bytes: &[u8]) -> Result<Vec<u8>, CandidateError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut inflated = Vec::new();
    let mut chunk = [0u8; 16 * 1024];

    loop {
        let read = decoder
            .read(&mut chunk)
            .map_err(|e| CandidateError::Download(format!("gzip decompression failed: {e}")))?;
        if read == 0 {
            break;
        }
        inflated.extend_from_slice(&chunk[..read]);
        if inflated.len() > MAX_SUBTITLE_BYTES {
            return Err(CandidateError::Download(format!(
                "inflated subtitle exceeds the {MAX_SUBTITLE_BYTES} byte limit"
            )));
        }
    }

    Ok(inflated)
}
