//! The conversion pipeline: attachments → descriptors → sends → cleanup.
//!
//! One invocation owns a fresh working directory under the scratch root and
//! an output archive beside it; both are gone by the time the pipeline
//! returns, whether or not the sends succeeded.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use texset_shared::{Attachment, InboundRequest, Result, TexsetError};

use crate::collector;
use crate::descriptor;
use crate::dispatch::Handler;
use crate::fetch::Fetcher;
use crate::sink::MessageSink;

/// Most files one outbound batch message may carry. Beyond this only the
/// combined archive is sent.
pub const MAX_BATCH_FILES: usize = 10;

/// Prefix of scoped working directories in the scratch area.
const WORKDIR_PREFIX: &str = "texset-";

/// Summary of one pipeline invocation.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Descriptor files generated; 0 when no attachment qualified.
    pub descriptor_count: usize,
    /// Whether the files were also sent individually.
    pub sent_individually: bool,
    /// Whether the combined archive was sent.
    pub archive_sent: bool,
}

// ---------------------------------------------------------------------------
// Handler wrapper
// ---------------------------------------------------------------------------

/// Registry handler running the conversion pipeline for each request.
pub struct ConvertHandler {
    scratch_root: PathBuf,
    fetcher: Fetcher,
}

impl ConvertHandler {
    pub fn new(scratch_root: PathBuf, fetcher: Fetcher) -> Self {
        Self {
            scratch_root,
            fetcher,
        }
    }
}

#[async_trait]
impl Handler for ConvertHandler {
    async fn handle(&self, request: &InboundRequest, sink: &dyn MessageSink) -> Result<()> {
        run(&request.attachments, &self.fetcher, &self.scratch_root, sink)
            .await
            .map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the conversion pipeline for one request.
///
/// Derives canonical names, renders one descriptor per name in a fresh
/// working directory, sends the files individually when few enough, always
/// packs and sends the combined archive, and removes every local artifact
/// before returning — on the failure path too.
#[instrument(skip_all, fields(attachments = attachments.len()))]
pub async fn run(
    attachments: &[Attachment],
    fetcher: &Fetcher,
    scratch_root: &Path,
    sink: &dyn MessageSink,
) -> Result<PipelineReport> {
    let names = collector::collect(attachments, fetcher, scratch_root).await?;
    if names.is_empty() {
        debug!("no qualifying attachments");
        return Ok(PipelineReport {
            descriptor_count: 0,
            sent_individually: false,
            archive_sent: false,
        });
    }

    let workdir = tempfile::Builder::new()
        .prefix(WORKDIR_PREFIX)
        .tempdir_in(scratch_root)
        .map_err(|e| TexsetError::io(scratch_root, e))?;

    let outcome = emit(&names, workdir.path(), scratch_root, sink).await;

    // Cleanup runs on success and failure alike; a cleanup failure is
    // logged, never raised over the original outcome.
    if let Err(e) = workdir.close() {
        warn!(error = %e, "failed to remove working directory");
    }
    outcome
}

/// Steps 3–6: materialize descriptors, send individually, pack, send archive.
async fn emit(
    names: &[String],
    workdir: &Path,
    scratch_root: &Path,
    sink: &dyn MessageSink,
) -> Result<PipelineReport> {
    let mut files = Vec::with_capacity(names.len());
    for name in names {
        let path = workdir.join(descriptor::file_name(name));
        // Duplicate names overwrite here; the duplicate list entry is kept
        // so the outbound file count matches the input.
        fs::write(&path, descriptor::render(name)).map_err(|e| TexsetError::io(&path, e))?;
        files.push(path);
    }

    // Individual files go out before the archive is even built, so an
    // archiving failure cannot block their delivery.
    let sent_individually = files.len() <= MAX_BATCH_FILES;
    if sent_individually {
        sink.send_files(&files).await?;
    } else {
        debug!(count = files.len(), "too many files for a batch send, archive only");
    }

    // The archive is named after the working directory and placed beside it.
    let dir_name = workdir
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| TexsetError::archive("working directory has no usable name"))?;
    let archive_path = scratch_root.join(format!("{dir_name}.zip"));

    let sent = match texset_archive::create(&archive_path, &files) {
        Ok(()) => sink.send_file(&archive_path).await,
        Err(e) => Err(e),
    };
    match fs::remove_file(&archive_path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %archive_path.display(), error = %e, "failed to remove output archive"),
    }
    sent?;

    info!(descriptors = files.len(), sent_individually, "conversion complete");
    Ok(PipelineReport {
        descriptor_count: files.len(),
        sent_individually,
        archive_sent: true,
    })
}
