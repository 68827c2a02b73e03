//! Zip archive access: entry listing and flat archive creation.
//!
//! Thin wrapper over the `zip` crate that maps every failure onto the
//! unified error type. Archive handles are released on all exit paths
//! (RAII); [`create`] never leaves a partially written file behind.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use texset_shared::{Result, TexsetError};

/// List entry names of the archive at `path`, in central-directory order.
///
/// The whole listing is materialized in one pass and the handle is dropped
/// before returning, also when an entry fails to decode.
pub fn list_entries(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| TexsetError::io(path, e))?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|e| {
        TexsetError::archive(format!("cannot open {}: {e}", path.display()))
    })?;

    let mut names = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(|e| {
            TexsetError::archive(format!("bad entry {index} in {}: {e}", path.display()))
        })?;
        names.push(entry.name().to_owned());
    }

    debug!(path = %path.display(), entries = names.len(), "listed archive");
    Ok(names)
}

/// Create a flat archive at `output_path` containing `files`, each stored
/// under its base name (in slice order). An existing file at `output_path`
/// is overwritten. On failure the partially written output is removed,
/// best-effort.
pub fn create(output_path: &Path, files: &[PathBuf]) -> Result<()> {
    match write_archive(output_path, files) {
        Ok(()) => {
            debug!(path = %output_path.display(), entries = files.len(), "created archive");
            Ok(())
        }
        Err(e) => {
            if let Err(remove_err) = std::fs::remove_file(output_path) {
                if remove_err.kind() != std::io::ErrorKind::NotFound {
                    warn!(
                        path = %output_path.display(),
                        error = %remove_err,
                        "failed to remove partial archive"
                    );
                }
            }
            Err(e)
        }
    }
}

fn write_archive(output_path: &Path, files: &[PathBuf]) -> Result<()> {
    let file = File::create(output_path).map_err(|e| TexsetError::io(output_path, e))?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default();

    for path in files {
        let entry_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                TexsetError::archive(format!("no usable base name for {}", path.display()))
            })?;
        writer.start_file(entry_name, options).map_err(|e| {
            TexsetError::archive(format!("cannot add {entry_name} to archive: {e}"))
        })?;
        let mut source = File::open(path).map_err(|e| TexsetError::io(path, e))?;
        std::io::copy(&mut source, &mut writer).map_err(|e| TexsetError::io(path, e))?;
    }

    let mut inner = writer.finish().map_err(|e| {
        TexsetError::archive(format!("cannot finish {}: {e}", output_path.display()))
    })?;
    inner.flush().map_err(|e| TexsetError::io(output_path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;

    fn write_files(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                fs::write(&path, format!("content of {name}")).expect("write input file");
                path
            })
            .collect()
    }

    #[test]
    fn pack_then_list_roundtrips_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let files = write_files(dir.path(), &["a.texture_set.json", "b.texture_set.json"]);
        let archive_path = dir.path().join("out.zip");

        create(&archive_path, &files).expect("create archive");
        let entries = list_entries(&archive_path).expect("list entries");

        let expected: HashSet<String> =
            ["a.texture_set.json", "b.texture_set.json"].map(String::from).into();
        assert_eq!(entries.iter().cloned().collect::<HashSet<_>>(), expected);
    }

    #[test]
    fn entries_keep_input_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let files = write_files(dir.path(), &["zz.json", "aa.json", "mm.json"]);
        let archive_path = dir.path().join("ordered.zip");

        create(&archive_path, &files).expect("create archive");
        let entries = list_entries(&archive_path).expect("list entries");
        assert_eq!(entries, vec!["zz.json", "aa.json", "mm.json"]);
    }

    #[test]
    fn create_overwrites_existing_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let files = write_files(dir.path(), &["only.json"]);
        let archive_path = dir.path().join("out.zip");
        fs::write(&archive_path, "not a zip").expect("seed stale file");

        create(&archive_path, &files).expect("create archive over stale file");
        assert_eq!(list_entries(&archive_path).expect("list"), vec!["only.json"]);
    }

    #[test]
    fn missing_input_file_removes_partial_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut files = write_files(dir.path(), &["real.json"]);
        files.push(dir.path().join("missing.json"));
        let archive_path = dir.path().join("out.zip");

        assert!(create(&archive_path, &files).is_err());
        assert!(!archive_path.exists(), "partial archive must be removed");
    }

    #[test]
    fn unreadable_archive_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bogus = dir.path().join("bogus.zip");
        fs::write(&bogus, "definitely not a zip archive").expect("write bogus file");

        assert!(matches!(
            list_entries(&bogus),
            Err(TexsetError::Archive { .. })
        ));
        assert!(matches!(
            list_entries(&dir.path().join("absent.zip")),
            Err(TexsetError::Io { .. })
        ));
    }
}
