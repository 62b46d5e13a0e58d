//! JSON snapshot persistence
//!
//! The whole store is written as one pretty-printed JSON document. Writes
//! go to a sibling temp file first and are renamed into place, so a crash
//! mid-write leaves the previous snapshot intact.

use crate::store::{ProjectStore, StoreSnapshot};
use probabilitas_core::Result;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Write the store to `path`
pub fn save_snapshot(store: &ProjectStore, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let snapshot = store.snapshot();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writer.flush()?;
    }
    std::fs::rename(&tmp, path)?;

    info!(
        path = %path.display(),
        projects = snapshot.projects.len(),
        "saved store snapshot"
    );
    Ok(())
}

/// Write the store only if it changed since `saved_revision`
///
/// Returns the revision that was written, or `None` when nothing changed.
pub fn save_if_changed(
    store: &ProjectStore,
    path: impl AsRef<Path>,
    saved_revision: u64,
) -> Result<Option<u64>> {
    // Read before snapshotting; a concurrent write is then picked up next time.
    let revision = store.revision();
    if revision == saved_revision {
        return Ok(None);
    }
    save_snapshot(store, path)?;
    Ok(Some(revision))
}

/// Read a store previously written by [`save_snapshot`]
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<ProjectStore> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let snapshot: StoreSnapshot = serde_json::from_reader(reader)?;

    info!(
        path = %path.display(),
        projects = snapshot.projects.len(),
        "loaded store snapshot"
    );
    Ok(ProjectStore::from_snapshot(snapshot))
}

/// Load `path` if it exists, otherwise start empty
pub fn load_or_default(path: impl AsRef<Path>) -> Result<ProjectStore> {
    let path = path.as_ref();
    if path.exists() {
        load_snapshot(path)
    } else {
        debug!(path = %path.display(), "no snapshot found, starting empty");
        Ok(ProjectStore::new())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
