//! Inspection view of a single container.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::container::{ContainerRecord, ContainerState};

/// Container details served by `GET /containers/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    pub pid: i32,
    pub image: String,
    /// Creation time in nanoseconds since the Unix epoch.
    pub created_time: i64,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    /// Directory holding the container's log file.
    pub log_path: PathBuf,
    pub root: PathBuf,
    pub sandbox: String,
}

/// Build the inspection view of a container from its record and state.
pub fn project(record: &ContainerRecord, state: &ContainerState) -> ContainerInfo {
    ContainerInfo {
        pid: state.pid,
        image: record.image.clone(),
        created_time: unix_nanos(&state.created),
        labels: record.labels.clone().into_iter().collect(),
        annotations: record.annotations.clone().into_iter().collect(),
        log_path: log_dir(&record.log_path),
        root: record.mount_point.clone(),
        sandbox: record.sandbox.clone(),
    }
}

/// Nanoseconds since the epoch, saturating outside 1677..2262.
fn unix_nanos(t: &DateTime<Utc>) -> i64 {
    t.timestamp_nanos_opt()
        .unwrap_or(if t.timestamp() < 0 { i64::MIN } else { i64::MAX })
}

/// Directory of a log file: everything up to the last `/`, cleaned.
///
/// `.` for a bare file name.
fn log_dir(log_path: &Path) -> PathBuf {
    let bytes = log_path.as_os_str().as_bytes();
    let dir = match bytes.iter().rposition(|&b| b == b'/') {
        Some(i) => &bytes[..=i],
        None => &[][..],
    };
    clean(Path::new(OsStr::from_bytes(dir)))
}

/// Lexically normalize a path. `.` elements are dropped, `..` removes the
/// preceding name, and `..` at the root is discarded.
fn clean(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last().copied() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        PathBuf::from(".")
    } else {
        parts.iter().collect()
    }
}
