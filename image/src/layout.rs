//! OCI image layout directories as an image source.
//!
//! ```text
//! layout/
//! ├── oci-layout           (layout marker)
//! ├── index.json           (image index)
//! └── blobs/
//!     └── sha256/
//!         ├── <manifest>
//!         ├── <config>
//!         └── <layers>
//! ```

use std::fs::File;
use std::path::Path;

use keel_core::error::{KeelError, Result};
use oci_spec::image::{Descriptor, ImageIndex, MediaType};

use crate::digest::Digest;
use crate::reference::{ImageReference, OciLayoutReference};
use crate::source::{BlobInfo, BlobStream, ImageSource};

/// Annotation naming an image within an index.
pub const ANNOTATION_REF_NAME: &str = "org.opencontainers.image.ref.name";

/// Image source reading from an OCI layout directory.
#[derive(Debug)]
pub struct OciLayoutSource {
    reference: ImageReference,
    layout: OciLayoutReference,
    descriptor: Descriptor,
}

impl OciLayoutSource {
    /// Open the image selected by `layout`.
    ///
    /// `requested_manifest_types` is a preference for backends that negotiate
    /// a manifest format. A layout stores exactly one manifest per image, so
    /// it is served whatever its type.
    pub fn open(layout: &OciLayoutReference, requested_manifest_types: &[String]) -> Result<Self> {
        let descriptor = load_manifest_descriptor(layout)?;

        tracing::debug!(
            layout = %layout.dir.display(),
            digest = %descriptor.digest(),
            media_type = %descriptor.media_type(),
            requested = ?requested_manifest_types,
            "Opened OCI layout"
        );

        Ok(Self {
            reference: ImageReference::OciLayout(layout.clone()),
            layout: layout.clone(),
            descriptor,
        })
    }

    fn read_blob(&self, digest: &Digest) -> Result<Vec<u8>> {
        let path = digest.blob_path(&self.layout.dir);
        std::fs::read(&path).map_err(|e| {
            KeelError::SourceError(format!(
                "Failed to read blob {} at {}: {}",
                digest,
                path.display(),
                e
            ))
        })
    }
}

impl ImageSource for OciLayoutSource {
    fn reference(&self) -> &ImageReference {
        &self.reference
    }

    fn get_manifest(&self) -> Result<(Vec<u8>, String)> {
        let digest: Digest = self.descriptor.digest().parse()?;
        let manifest = self.read_blob(&digest)?;
        Ok((manifest, self.descriptor.media_type().to_string()))
    }

    fn get_target_manifest(&self, digest: &Digest) -> Result<(Vec<u8>, String)> {
        let manifest = self.read_blob(digest)?;
        let mime_type = guess_mime_type(&manifest);
        Ok((manifest, mime_type))
    }

    fn get_blob(&self, info: &BlobInfo) -> Result<(BlobStream, i64)> {
        let path = info.digest.blob_path(&self.layout.dir);
        let file = File::open(&path).map_err(|e| {
            KeelError::SourceError(format!(
                "Failed to open blob {} at {}: {}",
                info.digest,
                path.display(),
                e
            ))
        })?;
        let size = file
            .metadata()
            .map_err(|e| {
                KeelError::SourceError(format!(
                    "Failed to stat blob {} at {}: {}",
                    info.digest,
                    path.display(),
                    e
                ))
            })?
            .len();
        let size = i64::try_from(size).unwrap_or(i64::MAX);
        Ok((Box::new(file), size))
    }

    fn get_signatures(&self) -> Result<Vec<Vec<u8>>> {
        Ok(Vec::new())
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Resolve the manifest descriptor an OCI layout reference points at.
///
/// Without an image name the index must hold exactly one manifest. With a
/// name, the first image manifest whose ref-name annotation matches wins.
pub fn load_manifest_descriptor(layout: &OciLayoutReference) -> Result<Descriptor> {
    let index = load_index(&layout.dir)?;

    let found = match &layout.image {
        None => match index.manifests().as_slice() {
            [only] => Some(only),
            manifests => {
                return Err(KeelError::SourceError(format!(
                    "{} images in {}, an image name is required",
                    manifests.len(),
                    layout.dir.display()
                )))
            }
        },
        Some(name) => index.manifests().iter().find(|d| {
            *d.media_type() == MediaType::ImageManifest
                && d
                    .annotations()
                    .as_ref()
                    .and_then(|a| a.get(ANNOTATION_REF_NAME))
                    == Some(name)
        }),
    };

    found.cloned().ok_or_else(|| {
        KeelError::SourceError(format!(
            "No descriptor found for reference {:?} in {}",
            layout.image.as_deref().unwrap_or_default(),
            layout.dir.display()
        ))
    })
}

/// Load the image index from index.json.
fn load_index(root_dir: &Path) -> Result<ImageIndex> {
    let index_path = root_dir.join("index.json");
    let content = std::fs::read_to_string(&index_path).map_err(|e| {
        KeelError::SourceError(format!(
            "Failed to read index.json at {}: {}",
            index_path.display(),
            e
        ))
    })?;

    serde_json::from_str(&content)
        .map_err(|e| KeelError::SourceError(format!("Failed to parse index.json: {}", e)))
}

/// Determine a manifest's MIME type from its contents.
///
/// Returns an empty string when the type cannot be determined.
pub fn guess_mime_type(manifest: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(manifest) else {
        return String::new();
    };

    if let Some(media_type) = value.get("mediaType").and_then(|m| m.as_str()) {
        return media_type.to_string();
    }
    if value.get("manifests").is_some() {
        return MediaType::ImageIndex.to_string();
    }
    if value.get("config").is_some() || value.get("layers").is_some() {
        return MediaType::ImageManifest.to_string();
    }
    String::new()
}
