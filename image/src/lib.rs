//! Keel Image - OCI image sources.
//!
//! Reads OCI images from layout directories and from archives. Archives
//! are unpacked into a private temporary directory for as long as the
//! source is open:
//!
//! ```text
//! oci-archive:/srv/busybox.tar
//!        │  unpack (ExtractionWorkspace)
//!        ▼
//! <temp_dir>/oci-archive-XXXXXX/      ◄── OciLayoutSource reads here
//!        │  close()
//!        ▼
//! removed
//! ```

pub mod archive;
pub mod digest;
pub mod layout;
pub mod reference;
pub mod source;
pub mod workspace;

pub use archive::{load_manifest_descriptor, ArchiveImageSource};
pub use digest::Digest;
pub use layout::OciLayoutSource;
pub use oci_spec::image::Descriptor;
pub use reference::{ImageReference, OciArchiveReference, OciLayoutReference};
pub use source::{BlobInfo, BlobStream, ImageContext, ImageSource};
pub use workspace::ExtractionWorkspace;

use keel_core::error::{KeelError, Result};
use reference::{OCI_ARCHIVE_TRANSPORT, OCI_LAYOUT_TRANSPORT};

/// Open a source for any transport this crate can read.
///
/// Registry and daemon references belong to other backends and yield
/// [`KeelError::ReferenceTypeError`].
pub fn new_image_source(
    reference: &ImageReference,
    requested_manifest_types: &[String],
    ctx: &ImageContext,
) -> Result<Box<dyn ImageSource>> {
    match reference {
        ImageReference::OciArchive(archive) => Ok(Box::new(ArchiveImageSource::open(
            archive,
            requested_manifest_types,
            ctx,
        )?)),
        ImageReference::OciLayout(layout) => Ok(Box::new(OciLayoutSource::open(
            layout,
            requested_manifest_types,
        )?)),
        other => Err(KeelError::ReferenceTypeError {
            expected: format!("{} or {}", OCI_ARCHIVE_TRANSPORT, OCI_LAYOUT_TRANSPORT),
            actual: other.transport().to_string(),
        }),
    }
}
