//! OCI archives as an image source.
//!
//! An archive is unpacked into an [`ExtractionWorkspace`] and read through
//! an [`OciLayoutSource`] bound to the unpacked directory. The two are
//! created together and torn down together.

use std::fmt;

use keel_core::error::{KeelError, Result};
use oci_spec::image::Descriptor;

use crate::digest::Digest;
use crate::layout::{self, OciLayoutSource};
use crate::reference::{ImageReference, OciArchiveReference, OciLayoutReference};
use crate::source::{BlobInfo, BlobStream, ImageContext, ImageSource};
use crate::workspace::ExtractionWorkspace;

/// Image source over an unpacked OCI archive.
///
/// Holds the extraction workspace and the source reading from it. Reads are
/// forwarded unchanged. [`close`](Self::close) releases both; dropping the
/// source without closing it still removes the workspace.
pub struct ArchiveImageSource {
    reference: ImageReference,
    unpacked: Box<dyn ImageSource>,
    workspace: ExtractionWorkspace,
}

impl ArchiveImageSource {
    /// Unpack the archive and open its image.
    pub fn open(
        reference: &OciArchiveReference,
        requested_manifest_types: &[String],
        ctx: &ImageContext,
    ) -> Result<Self> {
        Self::open_with(reference, ctx, |layout| {
            let source = OciLayoutSource::open(layout, requested_manifest_types)?;
            Ok(Box::new(source) as Box<dyn ImageSource>)
        })
    }

    /// Unpack the archive and open the unpacked layout with `new_source`.
    ///
    /// If `new_source` fails the workspace is deleted first. The error from
    /// `new_source` is returned as is, or wrapped in
    /// [`KeelError::RollbackError`] when the deletion failed too.
    pub fn open_with<F>(
        reference: &OciArchiveReference,
        ctx: &ImageContext,
        new_source: F,
    ) -> Result<Self>
    where
        F: FnOnce(&OciLayoutReference) -> Result<Box<dyn ImageSource>>,
    {
        let workspace = ExtractionWorkspace::create(&reference.path, &ctx.temp_dir)?;
        let layout = reference.extracted_layout(workspace.path());

        let unpacked = match new_source(&layout) {
            Ok(source) => source,
            Err(err) => {
                let path = workspace.path().to_path_buf();
                return Err(match workspace.remove() {
                    Ok(()) => err,
                    Err(cleanup) => KeelError::RollbackError {
                        path,
                        source: Box::new(err),
                        cleanup,
                    },
                });
            }
        };

        tracing::debug!(
            archive = %reference.path.display(),
            path = %workspace.path().display(),
            "Opened OCI archive"
        );

        Ok(Self {
            reference: ImageReference::OciArchive(reference.clone()),
            unpacked,
            workspace,
        })
    }

    /// Close the unpacked source and delete the workspace.
    ///
    /// Both steps always run. A failure to close the unpacked source takes
    /// precedence; the deletion error is returned only when closing
    /// succeeded. If both fail, the deletion error is logged and dropped.
    pub fn close(self) -> Result<()> {
        let Self {
            reference,
            unpacked,
            workspace,
        } = self;
        let path = workspace.path().to_path_buf();

        let closed = unpacked.close();
        let deleted = workspace.delete();

        match (closed, deleted) {
            (Err(err), Err(cleanup)) => {
                tracing::warn!(
                    reference = %reference,
                    path = %path.display(),
                    error = %cleanup,
                    "Failed to delete temp directory after close error"
                );
                Err(err)
            }
            (Err(err), Ok(())) => Err(err),
            (Ok(()), deleted) => {
                tracing::debug!(reference = %reference, "Closed OCI archive");
                deleted
            }
        }
    }

    /// Directory holding the unpacked archive.
    pub fn extracted_dir(&self) -> &std::path::Path {
        self.workspace.path()
    }
}

impl fmt::Debug for ArchiveImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveImageSource")
            .field("reference", &self.reference)
            .field("workspace", &self.workspace)
            .finish_non_exhaustive()
    }
}

impl ImageSource for ArchiveImageSource {
    fn reference(&self) -> &ImageReference {
        &self.reference
    }

    fn get_manifest(&self) -> Result<(Vec<u8>, String)> {
        self.unpacked.get_manifest()
    }

    fn get_target_manifest(&self, digest: &Digest) -> Result<(Vec<u8>, String)> {
        self.unpacked.get_target_manifest(digest)
    }

    fn get_blob(&self, info: &BlobInfo) -> Result<(BlobStream, i64)> {
        self.unpacked.get_blob(info)
    }

    fn get_signatures(&self) -> Result<Vec<Vec<u8>>> {
        self.unpacked.get_signatures()
    }

    fn close(self: Box<Self>) -> Result<()> {
        ArchiveImageSource::close(*self)
    }
}

/// Read the manifest descriptor of an archived image.
///
/// The archive is unpacked into a workspace that is deleted before this
/// returns, whatever the outcome. A read failure takes precedence over a
/// deletion failure.
pub fn load_manifest_descriptor(
    reference: &ImageReference,
    ctx: &ImageContext,
) -> Result<Descriptor> {
    let archive = reference.as_oci_archive()?;
    let workspace = ExtractionWorkspace::create(&archive.path, &ctx.temp_dir)?;

    let loaded = layout::load_manifest_descriptor(&archive.extracted_layout(workspace.path()));
    let deleted = workspace.delete();

    match (loaded, deleted) {
        (Err(err), Err(cleanup)) => {
            tracing::warn!(
                reference = %reference,
                error = %cleanup,
                "Failed to delete temp directory after descriptor error"
            );
            Err(err)
        }
        (Err(err), Ok(())) => Err(err),
        (Ok(descriptor), deleted) => deleted.map(|()| descriptor),
    }
}
