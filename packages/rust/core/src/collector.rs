//! Attachment collection: derive canonical names from request attachments.
//!
//! Image attachments contribute their own stripped file name; archive
//! attachments are downloaded, inspected, and contribute the stripped names
//! of their image entries. Everything else is ignored. Encounter order is
//! preserved end to end and duplicates are kept as-is.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use uuid::Uuid;

use texset_shared::{Attachment, AttachmentKind, IMAGE_SUFFIX, Result};

use crate::fetch::Fetcher;

/// Strip the final dot-extension from a file name.
///
/// A name that is all extension (`.png`) strips to the empty string; a name
/// without a dot is returned unchanged.
pub fn strip_extension(name: &str) -> &str {
    name.rfind('.').map_or(name, |dot| &name[..dot])
}

/// Collect canonical names from `attachments` in encounter order.
///
/// Archive attachments are downloaded to a uniquely named path under
/// `scratch_root` and the copy is removed before returning — also when the
/// listing fails. A failed download or an unreadable archive aborts the
/// whole collection; there is no partial skip.
pub async fn collect(
    attachments: &[Attachment],
    fetcher: &Fetcher,
    scratch_root: &Path,
) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for attachment in attachments {
        match attachment.kind() {
            AttachmentKind::Image => {
                names.push(strip_extension(&attachment.name).to_owned());
            }
            AttachmentKind::Archive => {
                // Unique local name so concurrent invocations never collide.
                let local =
                    scratch_root.join(format!("{}-{}", Uuid::now_v7(), attachment.name));
                fetcher.fetch_to(&attachment.source, &local).await?;

                // Downloaded copies are never cached across invocations.
                let listed = texset_archive::list_entries(&local);
                if let Err(e) = fs::remove_file(&local) {
                    warn!(path = %local.display(), error = %e, "failed to remove downloaded archive");
                }

                for entry in listed? {
                    if entry.ends_with(IMAGE_SUFFIX) {
                        names.push(strip_extension(&entry).to_owned());
                    }
                }
            }
            AttachmentKind::Ignored => {
                debug!(name = %attachment.name, "ignoring attachment");
            }
        }
    }

    Ok(names)
}
