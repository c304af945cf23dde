//! The read interface shared by every image backend.

use std::io::Read;
use std::path::PathBuf;

use keel_core::config::ImageConfig;
use keel_core::error::Result;

use crate::digest::Digest;
use crate::reference::ImageReference;

/// Readable blob contents.
pub type BlobStream = Box<dyn Read + Send>;

/// Blob size when the caller does not know it.
pub const UNKNOWN_SIZE: i64 = -1;

/// Identifies a blob to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobInfo {
    /// Content digest
    pub digest: Digest,
    /// Expected size in bytes, or [`UNKNOWN_SIZE`]
    pub size: i64,
    /// Media type, if known
    pub media_type: Option<String>,
}

impl BlobInfo {
    pub fn new(digest: Digest) -> Self {
        Self {
            digest,
            size: UNKNOWN_SIZE,
            media_type: None,
        }
    }
}

/// Settings passed explicitly into image operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageContext {
    /// Base directory under which extraction workspaces are created
    pub temp_dir: PathBuf,
}

impl ImageContext {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
        }
    }
}

impl From<&ImageConfig> for ImageContext {
    fn from(config: &ImageConfig) -> Self {
        Self::new(config.temp_dir.clone())
    }
}

/// A readable image.
///
/// All methods block on I/O and are not cancellable. A source is owned by
/// one caller at a time; `close` consumes it, so no read can follow or race
/// with it.
pub trait ImageSource: Send {
    /// The reference this source was opened from.
    fn reference(&self) -> &ImageReference;

    /// The image's manifest and its MIME type.
    ///
    /// The MIME type may be empty when it cannot be determined.
    fn get_manifest(&self) -> Result<(Vec<u8>, String)>;

    /// A manifest selected by digest, e.g. one entry of a manifest list.
    fn get_target_manifest(&self, digest: &Digest) -> Result<(Vec<u8>, String)>;

    /// A stream over the blob's contents and its size in bytes.
    fn get_blob(&self, info: &BlobInfo) -> Result<(BlobStream, i64)>;

    /// Signatures attached to the image, one byte block each.
    fn get_signatures(&self) -> Result<Vec<Vec<u8>>>;

    /// Release everything the source holds.
    fn close(self: Box<Self>) -> Result<()>;
}
