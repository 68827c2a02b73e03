//! Core domain types for inbound requests.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

/// File-name suffix identifying image attachments and archive entries.
pub const IMAGE_SUFFIX: &str = ".png";

/// File-name suffix identifying archive attachments.
pub const ARCHIVE_SUFFIX: &str = ".zip";

// ---------------------------------------------------------------------------
// CallerId
// ---------------------------------------------------------------------------

/// Opaque numeric account identifier carried by every inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(pub u64);

impl std::fmt::Display for CallerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CallerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

/// Where an attachment's bytes come from.
#[derive(Debug, Clone)]
pub enum ByteSource {
    /// Remote attachment retrieved over HTTP.
    Url(Url),
    /// Local file, used by the CLI front end and tests.
    Path(PathBuf),
}

/// How the collector treats an attachment, derived from its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// Usable directly; contributes its own canonical name.
    Image,
    /// Opened and inspected; its image entries contribute names.
    Archive,
    /// Anything else. Skipped without effect.
    Ignored,
}

/// A file attached to an inbound request.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Declared file name, including extension.
    pub name: String,
    /// Reference to the attachment's byte stream.
    pub source: ByteSource,
}

impl Attachment {
    pub fn new(name: impl Into<String>, source: ByteSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// Classify by file-name suffix. The match is exact and case-sensitive.
    pub fn kind(&self) -> AttachmentKind {
        if self.name.ends_with(IMAGE_SUFFIX) {
            AttachmentKind::Image
        } else if self.name.ends_with(ARCHIVE_SUFFIX) {
            AttachmentKind::Archive
        } else {
            AttachmentKind::Ignored
        }
    }
}

// ---------------------------------------------------------------------------
// InboundRequest
// ---------------------------------------------------------------------------

/// An inbound request from the messaging front end.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    /// Identity of the account that issued the request.
    pub caller: CallerId,
    /// Attachments in the order the request supplied them.
    pub attachments: Vec<Attachment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(name: &str) -> Attachment {
        Attachment::new(name, ByteSource::Path(PathBuf::from(name)))
    }

    #[test]
    fn caller_id_roundtrip() {
        let id: CallerId = "424242".parse().expect("parse CallerId");
        assert_eq!(id, CallerId(424242));
        assert_eq!(id.to_string(), "424242");
    }

    #[test]
    fn caller_id_serde_transparent() {
        let json = serde_json::to_string(&CallerId(7)).expect("serialize");
        assert_eq!(json, "7");
        let id: CallerId = serde_json::from_str("7").expect("deserialize");
        assert_eq!(id, CallerId(7));
    }

    #[test]
    fn caller_id_rejects_non_numeric() {
        assert!("not-a-number".parse::<CallerId>().is_err());
        assert!("-1".parse::<CallerId>().is_err());
    }

    #[test]
    fn attachment_classification() {
        assert_eq!(local("stone.png").kind(), AttachmentKind::Image);
        assert_eq!(local("pack.zip").kind(), AttachmentKind::Archive);
        assert_eq!(local("notes.txt").kind(), AttachmentKind::Ignored);
        assert_eq!(local("stone.PNG").kind(), AttachmentKind::Ignored);
        // A bare-suffix name still classifies; its canonical name is empty.
        assert_eq!(local(".png").kind(), AttachmentKind::Image);
    }
}
