//! Outbound message boundary.
//!
//! The messaging collaborator is reached exclusively through
//! [`MessageSink`]; the core never talks to a platform directly.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use texset_shared::Result;

/// Outbound sends to the messaging collaborator.
///
/// Every method resolves only once the payload bytes have been captured
/// (read into the sink's own buffers or fully transmitted). The pipeline
/// deletes local files as soon as a send returns, so an implementation that
/// kept reading from the given paths after returning would race with that
/// cleanup.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Send a human-readable text message.
    async fn send_text(&self, text: &str) -> Result<()>;

    /// Send a batch of files in one message.
    async fn send_files(&self, files: &[PathBuf]) -> Result<()>;

    /// Send a single file.
    async fn send_file(&self, file: &Path) -> Result<()>;
}
