//! Transport-qualified image references.
//!
//! Parses references like `oci-archive:/srv/images/busybox.tar:latest` into
//! one of a closed set of transports. Only the OCI layout and OCI archive
//! transports are readable by this crate; the others are carried as opaque
//! locators for the backends that own them.

use std::fmt;
use std::path::{Path, PathBuf};

use keel_core::error::{KeelError, Result};

/// Transport name for OCI archives.
pub const OCI_ARCHIVE_TRANSPORT: &str = "oci-archive";

/// Transport name for OCI layout directories.
pub const OCI_LAYOUT_TRANSPORT: &str = "oci";

/// Transport name for registry references.
pub const DOCKER_TRANSPORT: &str = "docker";

/// Transport name for references into a local docker daemon.
pub const DOCKER_DAEMON_TRANSPORT: &str = "docker-daemon";

/// Location of an image's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageReference {
    /// Tar archive holding an OCI layout.
    OciArchive(OciArchiveReference),
    /// OCI layout directory on disk.
    OciLayout(OciLayoutReference),
    /// Registry reference (`docker://name:tag`).
    Docker(String),
    /// Image inside a local docker daemon (`docker-daemon:name:tag`).
    DockerDaemon(String),
}

/// Reference to an image inside an OCI archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OciArchiveReference {
    /// Path to the archive file
    pub path: PathBuf,
    /// Value of the `org.opencontainers.image.ref.name` annotation to select
    pub image: Option<String>,
}

/// Reference to an image inside an OCI layout directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OciLayoutReference {
    /// Root of the layout
    pub dir: PathBuf,
    /// Value of the `org.opencontainers.image.ref.name` annotation to select
    pub image: Option<String>,
}

impl ImageReference {
    /// Parse a transport-qualified reference.
    ///
    /// Supports formats:
    /// - `oci-archive:/path/to/image.tar` and `oci-archive:/path/to/image.tar:name`
    /// - `oci:/path/to/layout` and `oci:/path/to/layout:name`
    /// - `docker://docker.io/library/busybox:latest`
    /// - `docker-daemon:busybox:latest`
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        let (transport, rest) = reference.split_once(':').ok_or_else(|| {
            KeelError::InvalidReference(format!(
                "'{}' has no transport prefix",
                reference
            ))
        })?;

        match transport {
            OCI_ARCHIVE_TRANSPORT => {
                let (path, image) = split_path_and_image(reference, rest)?;
                Ok(Self::OciArchive(OciArchiveReference { path, image }))
            }
            OCI_LAYOUT_TRANSPORT => {
                let (dir, image) = split_path_and_image(reference, rest)?;
                Ok(Self::OciLayout(OciLayoutReference { dir, image }))
            }
            DOCKER_TRANSPORT => {
                let name = rest.strip_prefix("//").ok_or_else(|| {
                    KeelError::InvalidReference(format!(
                        "'{}' must start with docker://",
                        reference
                    ))
                })?;
                non_empty(reference, name).map(|n| Self::Docker(n.to_string()))
            }
            DOCKER_DAEMON_TRANSPORT => {
                non_empty(reference, rest).map(|n| Self::DockerDaemon(n.to_string()))
            }
            other => Err(KeelError::InvalidReference(format!(
                "unknown transport '{}' in '{}'",
                other, reference
            ))),
        }
    }

    /// Transport name of this reference.
    pub fn transport(&self) -> &'static str {
        match self {
            Self::OciArchive(_) => OCI_ARCHIVE_TRANSPORT,
            Self::OciLayout(_) => OCI_LAYOUT_TRANSPORT,
            Self::Docker(_) => DOCKER_TRANSPORT,
            Self::DockerDaemon(_) => DOCKER_DAEMON_TRANSPORT,
        }
    }

    /// The archive reference, or a type error naming the actual transport.
    pub fn as_oci_archive(&self) -> Result<&OciArchiveReference> {
        match self {
            Self::OciArchive(archive) => Ok(archive),
            other => Err(KeelError::ReferenceTypeError {
                expected: OCI_ARCHIVE_TRANSPORT.to_string(),
                actual: other.transport().to_string(),
            }),
        }
    }
}

impl OciArchiveReference {
    pub fn new(path: impl Into<PathBuf>, image: Option<String>) -> Self {
        Self {
            path: path.into(),
            image,
        }
    }

    /// The layout reference for this archive once unpacked into `dir`.
    pub fn extracted_layout(&self, dir: &Path) -> OciLayoutReference {
        OciLayoutReference {
            dir: dir.to_path_buf(),
            image: self.image.clone(),
        }
    }
}

impl OciLayoutReference {
    pub fn new(dir: impl Into<PathBuf>, image: Option<String>) -> Self {
        Self {
            dir: dir.into(),
            image,
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OciArchive(r) => write_path_and_image(f, OCI_ARCHIVE_TRANSPORT, &r.path, &r.image),
            Self::OciLayout(r) => write_path_and_image(f, OCI_LAYOUT_TRANSPORT, &r.dir, &r.image),
            Self::Docker(name) => write!(f, "{}://{}", DOCKER_TRANSPORT, name),
            Self::DockerDaemon(name) => write!(f, "{}:{}", DOCKER_DAEMON_TRANSPORT, name),
        }
    }
}

impl From<OciArchiveReference> for ImageReference {
    fn from(reference: OciArchiveReference) -> Self {
        Self::OciArchive(reference)
    }
}

impl From<OciLayoutReference> for ImageReference {
    fn from(reference: OciLayoutReference) -> Self {
        Self::OciLayout(reference)
    }
}

fn write_path_and_image(
    f: &mut fmt::Formatter<'_>,
    transport: &str,
    path: &Path,
    image: &Option<String>,
) -> fmt::Result {
    write!(f, "{}:{}", transport, path.display())?;
    if let Some(image) = image {
        write!(f, ":{}", image)?;
    }
    Ok(())
}

/// Split `path[:image]`; the path itself may not contain a colon.
fn split_path_and_image(reference: &str, rest: &str) -> Result<(PathBuf, Option<String>)> {
    let (path, image) = match rest.split_once(':') {
        Some((path, image)) => (path, Some(image)),
        None => (rest, None),
    };
    let path = non_empty(reference, path)?;
    let image = match image {
        Some(image) => Some(non_empty(reference, image)?.to_string()),
        None => None,
    };
    Ok((PathBuf::from(path), image))
}

fn non_empty<'a>(reference: &str, part: &'a str) -> Result<&'a str> {
    if part.is_empty() {
        return Err(KeelError::InvalidReference(format!(
            "'{}' has an empty component",
            reference
        )));
    }
    Ok(part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_archive_without_image() {
        let r = ImageReference::parse("oci-archive:/srv/busybox.tar").unwrap();
        assert_eq!(
            r,
            ImageReference::OciArchive(OciArchiveReference::new("/srv/busybox.tar", None))
        );
        assert_eq!(r.transport(), "oci-archive");
    }

    #[test]
    fn test_parse_archive_with_image() {
        let r = ImageReference::parse("oci-archive:/srv/busybox.tar:latest").unwrap();
        let archive = r.as_oci_archive().unwrap();
        assert_eq!(archive.path, PathBuf::from("/srv/busybox.tar"));
        assert_eq!(archive.image.as_deref(), Some("latest"));
    }

    #[test]
    fn test_parse_layout() {
        let r = ImageReference::parse("oci:/srv/layout:v1").unwrap();
        assert_eq!(
            r,
            ImageReference::OciLayout(OciLayoutReference::new(
                "/srv/layout",
                Some("v1".to_string())
            ))
        );
    }

    #[test]
    fn test_parse_docker() {
        let r = ImageReference::parse("docker://docker.io/library/busybox:latest").unwrap();
        assert_eq!(
            r,
            ImageReference::Docker("docker.io/library/busybox:latest".to_string())
        );
    }

    #[test]
    fn test_parse_docker_requires_slashes() {
        assert!(ImageReference::parse("docker:busybox").is_err());
    }

    #[test]
    fn test_parse_docker_daemon() {
        let r = ImageReference::parse("docker-daemon:busybox:latest").unwrap();
        assert_eq!(r, ImageReference::DockerDaemon("busybox:latest".to_string()));
    }

    #[test]
    fn test_parse_rejects_unknown_transport() {
        let err = ImageReference::parse("ftp:/srv/x").unwrap_err();
        assert!(err.to_string().contains("unknown transport"));
    }

    #[test]
    fn test_parse_rejects_missing_transport() {
        assert!(matches!(
            ImageReference::parse("busybox"),
            Err(KeelError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert!(ImageReference::parse("oci-archive:").is_err());
        assert!(ImageReference::parse("oci-archive:/srv/x.tar:").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for s in [
            "oci-archive:/srv/busybox.tar",
            "oci-archive:/srv/busybox.tar:latest",
            "oci:/srv/layout",
            "docker://quay.io/org/app:1.0",
            "docker-daemon:app:1.0",
        ] {
            assert_eq!(ImageReference::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_as_oci_archive_type_error() {
        let r = ImageReference::Docker("busybox".to_string());
        match r.as_oci_archive() {
            Err(KeelError::ReferenceTypeError { expected, actual }) => {
                assert_eq!(expected, "oci-archive");
                assert_eq!(actual, "docker");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_extracted_layout_keeps_image_name() {
        let archive = OciArchiveReference::new("/srv/a.tar", Some("v2".to_string()));
        let layout = archive.extracted_layout(Path::new("/tmp/oci-123"));
        assert_eq!(layout.dir, PathBuf::from("/tmp/oci-123"));
        assert_eq!(layout.image.as_deref(), Some("v2"));
    }
}
