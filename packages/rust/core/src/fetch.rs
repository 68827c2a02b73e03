//! Attachment byte retrieval.
//!
//! Archive attachments are fully retrieved into the scratch area before
//! being opened; there is no streaming or resumable transfer. Remote
//! sources go through one shared HTTP client, local sources are copied.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use texset_shared::{ByteSource, Result, TexsetError};

/// User-Agent string for attachment downloads.
const USER_AGENT: &str = concat!("texset/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout for downloads.
const TIMEOUT_SECS: u64 = 30;

/// Retrieves attachment bytes into local files.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(|e| TexsetError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Retrieve the full byte stream of `source` into the file at `dest`.
    ///
    /// Resolves only once every byte has been written, so the caller may
    /// open `dest` as an archive immediately after.
    pub async fn fetch_to(&self, source: &ByteSource, dest: &Path) -> Result<()> {
        match source {
            ByteSource::Url(url) => {
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| TexsetError::Network(format!("{url}: {e}")))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(TexsetError::Network(format!("{url}: HTTP {status}")));
                }

                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| TexsetError::Network(format!("{url}: {e}")))?;
                std::fs::write(dest, &bytes).map_err(|e| TexsetError::io(dest, e))?;

                debug!(%url, bytes = bytes.len(), dest = %dest.display(), "downloaded attachment");
            }
            ByteSource::Path(path) => {
                std::fs::copy(path, dest).map_err(|e| TexsetError::io(path, e))?;
                debug!(src = %path.display(), dest = %dest.display(), "copied local attachment");
            }
        }
        Ok(())
    }
}
