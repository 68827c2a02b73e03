//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use tracing::{info, warn};
use url::Url;

use texset_core::dispatch::{AdminHandler, Handler, Registration, Registry};
use texset_core::fetch::Fetcher;
use texset_core::pipeline::ConvertHandler;
use texset_core::sink::MessageSink;
use texset_shared::{Attachment, ByteSource, CallerId, InboundRequest, TexsetError, allow_list_from_env};

/// Handler registration names; `<NAME>_USER_IDS` supplies each allow-list.
const ADMIN: &str = "ADMIN";
const CONVERT: &str = "CONVERT";

/// Scratch subdirectory name under the system temp dir.
const SCRATCH_DIR_NAME: &str = "texset";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// texset — turn image and archive attachments into texture-set descriptors.
#[derive(Parser)]
#[command(
    name = "texset",
    version,
    about = "Turn image and archive attachments into texture-set descriptor documents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Process one inbound request through the handler registry.
    Run {
        /// Caller identity (numeric account id).
        #[arg(long)]
        caller: u64,

        /// Attachments: local paths or http(s) URLs.
        attachments: Vec<String>,

        /// Directory receiving outbound file sends.
        #[arg(short, long, default_value = "out")]
        out: PathBuf,

        /// Scratch directory (defaults to a texset dir under the system
        /// temp dir; an explicitly given directory is left in place on exit).
        #[arg(long)]
        scratch: Option<PathBuf>,
    },

    /// Validate the allow-list configuration and list registered handlers.
    Check,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "texset=info",
        1 => "texset=debug",
        _ => "texset=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            caller,
            attachments,
            out,
            scratch,
        } => cmd_run(caller, &attachments, &out, scratch).await,
        Command::Check => cmd_check().await,
    }
}

// ---------------------------------------------------------------------------
// Registry wiring
// ---------------------------------------------------------------------------

/// Build the process-wide handler registry from environment allow-lists.
///
/// The privileged registration stays first so the remaining handlers can be
/// enumerated as "skip index 0".
fn build_registry(scratch_root: &Path) -> Result<Registry> {
    let fetcher = Fetcher::new()?;
    let convert: Arc<dyn Handler> =
        Arc::new(ConvertHandler::new(scratch_root.to_path_buf(), fetcher));
    let admin: Arc<dyn Handler> = Arc::new(AdminHandler::new(vec![convert.clone()]));

    let registry = Registry::new(vec![
        Registration {
            name: ADMIN,
            ids: allow_list_from_env(ADMIN)?,
            handler: admin,
        },
        Registration {
            name: CONVERT,
            ids: allow_list_from_env(CONVERT)?,
            handler: convert,
        },
    ])?;
    Ok(registry)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn cmd_run(
    caller: u64,
    attachments: &[String],
    out: &Path,
    scratch: Option<PathBuf>,
) -> Result<()> {
    // The scratch area is process-wide: created before first use, removed on
    // the way out. An explicitly provided directory is treated as externally
    // provisioned and left in place.
    let externally_provisioned = scratch.is_some();
    let scratch_root =
        scratch.unwrap_or_else(|| std::env::temp_dir().join(SCRATCH_DIR_NAME));
    std::fs::create_dir_all(&scratch_root)
        .map_err(|e| eyre!("cannot create scratch directory {}: {e}", scratch_root.display()))?;

    let registry = build_registry(&scratch_root)?;

    std::fs::create_dir_all(out)
        .map_err(|e| eyre!("cannot create output directory {}: {e}", out.display()))?;

    let attachments = attachments
        .iter()
        .map(|raw| parse_attachment(raw))
        .collect::<Result<Vec<_>>>()?;

    let request = InboundRequest {
        caller: CallerId(caller),
        attachments,
    };
    let sink = DirectorySink::new(out.to_path_buf());

    info!(caller, attachments = request.attachments.len(), "processing request");
    let outcome = registry.dispatch(&request, &sink).await;

    if !externally_provisioned {
        if let Err(e) = std::fs::remove_dir_all(&scratch_root) {
            warn!(path = %scratch_root.display(), error = %e, "failed to remove scratch directory");
        }
    }

    outcome?;
    Ok(())
}

async fn cmd_check() -> Result<()> {
    let scratch_root = std::env::temp_dir().join(SCRATCH_DIR_NAME);
    let registry = build_registry(&scratch_root)?;

    println!("Registered handlers:");
    for entry in registry.entries() {
        println!("  {}: {} authorized caller(s)", entry.name, entry.ids.len());
    }
    println!("Configuration OK.");
    Ok(())
}

// ---------------------------------------------------------------------------
// Attachment parsing
// ---------------------------------------------------------------------------

/// Turn a CLI operand into an attachment: http(s) operands download, anything
/// else is a local path. The attachment name is the last path segment.
fn parse_attachment(raw: &str) -> Result<Attachment> {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        let url = Url::parse(raw).map_err(|e| eyre!("invalid attachment URL '{raw}': {e}"))?;
        let name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| eyre!("cannot derive a file name from '{raw}'"))?
            .to_owned();
        Ok(Attachment::new(name, ByteSource::Url(url)))
    } else {
        let path = PathBuf::from(raw);
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| eyre!("cannot derive a file name from '{raw}'"))?
            .to_owned();
        Ok(Attachment::new(name, ByteSource::Path(path)))
    }
}

// ---------------------------------------------------------------------------
// Directory sink
// ---------------------------------------------------------------------------

/// Materializes outbound sends into a local directory.
///
/// File payloads are copied in full before a send resolves, honoring the
/// sink contract; text sends go to stdout as the caller-visible reply.
struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn capture(&self, file: &Path) -> texset_shared::Result<()> {
        let name = file
            .file_name()
            .ok_or_else(|| TexsetError::Send(format!("no file name: {}", file.display())))?;
        let dest = self.dir.join(name);
        std::fs::copy(file, &dest).map_err(|e| TexsetError::io(file, e))?;
        info!(dest = %dest.display(), "outbound file");
        Ok(())
    }
}

#[async_trait]
impl MessageSink for DirectorySink {
    async fn send_text(&self, text: &str) -> texset_shared::Result<()> {
        println!("{text}");
        Ok(())
    }

    async fn send_files(&self, files: &[PathBuf]) -> texset_shared::Result<()> {
        for file in files {
            self.capture(file)?;
        }
        Ok(())
    }

    async fn send_file(&self, file: &Path) -> texset_shared::Result<()> {
        self.capture(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_local_path_attachments() {
        let attachment = parse_attachment("textures/stone.png").expect("parse");
        assert_eq!(attachment.name, "stone.png");
        assert!(matches!(attachment.source, ByteSource::Path(_)));
    }

    #[test]
    fn parses_url_attachments() {
        let attachment =
            parse_attachment("https://cdn.example.com/uploads/pack.zip").expect("parse");
        assert_eq!(attachment.name, "pack.zip");
        assert!(matches!(attachment.source, ByteSource::Url(_)));
    }

    #[test]
    fn rejects_unnameable_attachments() {
        assert!(parse_attachment("https://example.com").is_err());
    }

    #[tokio::test]
    async fn directory_sink_copies_payloads() {
        let src_dir = tempfile::tempdir().expect("tempdir");
        let out_dir = tempfile::tempdir().expect("tempdir");
        let src = src_dir.path().join("stone.texture_set.json");
        std::fs::write(&src, "{}").expect("write source");

        let sink = DirectorySink::new(out_dir.path().to_path_buf());
        sink.send_file(&src).await.expect("send");

        assert!(out_dir.path().join("stone.texture_set.json").exists());
    }
}
