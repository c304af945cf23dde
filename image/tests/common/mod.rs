//! Fixture archives for image source tests.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest as _, Sha256};
use tar::Builder;
use tempfile::TempDir;

pub const MANIFEST_TYPE: &str = "application/vnd.oci.image.manifest.v1+json";
pub const REF_NAME: &str = "latest";

/// An OCI archive on disk plus the values it was built from.
pub struct Fixture {
    pub root: TempDir,
    pub archive: PathBuf,
    pub temp_dir: PathBuf,
    pub manifest: Vec<u8>,
    pub manifest_digest: String,
    pub layer: Vec<u8>,
    pub layer_digest: String,
}

pub fn sha256(bytes: &[u8]) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(bytes)))
}

/// Build a single-image OCI archive tagged [`REF_NAME`].
pub fn oci_archive(gzip: bool) -> Fixture {
    let root = TempDir::new().unwrap();
    let archive = root.path().join(if gzip { "image.tar.gz" } else { "image.tar" });
    let temp_dir = root.path().join("tmp");

    let config = br#"{"architecture":"amd64","os":"linux","rootfs":{"type":"layers","diff_ids":[]}}"#.to_vec();
    let config_digest = sha256(&config);
    let layer = b"layer bytes standing in for a tarball".to_vec();
    let layer_digest = sha256(&layer);

    let manifest = format!(
        r#"{{"schemaVersion":2,"mediaType":"{}","config":{{"mediaType":"application/vnd.oci.image.config.v1+json","digest":"{}","size":{}}},"layers":[{{"mediaType":"application/vnd.oci.image.layer.v1.tar","digest":"{}","size":{}}}]}}"#,
        MANIFEST_TYPE,
        config_digest,
        config.len(),
        layer_digest,
        layer.len()
    )
    .into_bytes();
    let manifest_digest = sha256(&manifest);

    let index = format!(
        r#"{{"schemaVersion":2,"manifests":[{{"mediaType":"{}","digest":"{}","size":{},"annotations":{{"org.opencontainers.image.ref.name":"{}"}}}}]}}"#,
        MANIFEST_TYPE,
        manifest_digest,
        manifest.len(),
        REF_NAME
    );

    let files: Vec<(String, Vec<u8>)> = vec![
        ("oci-layout".to_string(), br#"{"imageLayoutVersion":"1.0.0"}"#.to_vec()),
        ("index.json".to_string(), index.into_bytes()),
        (blob_entry(&config_digest), config),
        (blob_entry(&layer_digest), layer.clone()),
        (blob_entry(&manifest_digest), manifest.clone()),
    ];
    write_tar(&archive, &files, gzip);

    Fixture {
        root,
        archive,
        temp_dir,
        manifest,
        manifest_digest,
        layer,
        layer_digest,
    }
}

/// A valid tar that is not an OCI layout (no index.json).
pub fn non_layout_archive(root: &Path) -> PathBuf {
    let archive = root.join("plain.tar");
    write_tar(&archive, &[("README".to_string(), b"hello".to_vec())], false);
    archive
}

/// Directories currently present under an extraction base directory.
pub fn workspaces(temp_dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(temp_dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

fn blob_entry(digest: &str) -> String {
    format!("blobs/sha256/{}", digest.trim_start_matches("sha256:"))
}

fn write_tar(path: &Path, files: &[(String, Vec<u8>)], gzip: bool) {
    fn append<W: Write>(builder: &mut Builder<W>, files: &[(String, Vec<u8>)]) {
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, content.as_slice())
                .unwrap();
        }
    }

    let file = File::create(path).unwrap();
    if gzip {
        let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));
        append(&mut builder, files);
        builder.into_inner().unwrap().finish().unwrap();
    } else {
        let mut builder = Builder::new(file);
        append(&mut builder, files);
        builder.finish().unwrap();
    }
}
