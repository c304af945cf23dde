//! Temporary directories holding an unpacked archive.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use keel_core::error::{KeelError, Result};
use tar::Archive;
use tempfile::TempDir;

/// Prefix of every extraction directory name.
pub const TEMP_DIR_PREFIX: &str = "oci-archive-";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A uniquely named temporary directory with an archive unpacked into it.
///
/// The workspace is removed by [`ExtractionWorkspace::delete`]. If it is
/// dropped instead, the directory is still removed, silently.
#[derive(Debug)]
pub struct ExtractionWorkspace {
    dir: TempDir,
}

impl ExtractionWorkspace {
    /// Create a fresh directory under `base_dir` and unpack `archive` into it.
    ///
    /// Directory names carry a random suffix, so concurrent calls never
    /// collide. On failure nothing is left behind.
    pub fn create(archive: &Path, base_dir: &Path) -> Result<Self> {
        let extraction_error = |source: std::io::Error| KeelError::ExtractionError {
            archive: archive.to_path_buf(),
            source,
        };

        std::fs::create_dir_all(base_dir).map_err(extraction_error)?;
        let dir = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir_in(base_dir)
            .map_err(extraction_error)?;

        if let Err(e) = unpack_archive(archive, dir.path()) {
            let path = dir.path().to_path_buf();
            if let Err(cleanup) = dir.close() {
                tracing::warn!(
                    path = %path.display(),
                    error = %cleanup,
                    "Failed to remove partial extraction"
                );
            }
            return Err(extraction_error(e));
        }

        tracing::debug!(
            archive = %archive.display(),
            path = %dir.path().display(),
            "Extracted archive"
        );

        Ok(Self { dir })
    }

    /// Root of the unpacked contents.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory and everything in it.
    ///
    /// A directory that is already gone counts as removed.
    pub fn delete(self) -> Result<()> {
        let path = self.path().to_path_buf();
        self.remove().map_err(|source| KeelError::CleanupError { path, source })
    }

    /// Like [`delete`](Self::delete), keeping the raw I/O error.
    pub(crate) fn remove(self) -> std::io::Result<()> {
        let path: PathBuf = self.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        tracing::debug!(path = %path.display(), "Deleted extraction workspace");
        Ok(())
    }
}

/// Unpack a tar archive, gzip-compressed or not, into `target_dir`.
fn unpack_archive(archive: &Path, target_dir: &Path) -> std::io::Result<()> {
    let mut reader = BufReader::new(File::open(archive)?);
    let gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);

    if gzipped {
        Archive::new(GzDecoder::new(reader)).unpack(target_dir)
    } else {
        Archive::new(reader).unpack(target_dir)
    }
}
