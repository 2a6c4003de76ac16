//! Atomic JSON persistence helper shared by settings, CutList, and
//! contender-checkpoint files.

use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::PersistenceError;

/// Serialize `value` as pretty JSON and write it to `path` atomically: the
/// bytes land in a sibling `.tmp` file first, then an OS rename replaces
/// `path` in one step so a crash mid-write never leaves a half-written file.
///
/// # Errors
/// Returns [`PersistenceError::Serde`] if serialization fails, or
/// [`PersistenceError::Io`] if the temp file cannot be written or renamed.
pub fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let json = serde_json::to_vec_pretty(value)?;
    let tmp_path = tmp_sibling(path);
    std::fs::write(&tmp_path, &json)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Read and parse `path` as JSON, returning `None` if the file does not
/// exist (a normal first-run condition, not an error).
///
/// # Errors
/// Returns [`PersistenceError::Io`] for any I/O failure other than
/// not-found, or [`PersistenceError::Serde`] if the contents do not parse.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistenceError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn tmp_sibling(path: &Path) -> std::path::PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    std::path::PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut data = BTreeMap::new();
        data.insert("a".to_string(), 1u32);
        atomic_write_json(&path, &data).unwrap();
        let restored: Option<BTreeMap<String, u32>> = read_json(&path).unwrap();
        assert_eq!(restored, Some(data));
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let restored: Option<BTreeMap<String, u32>> = read_json(&path).unwrap();
        assert_eq!(restored, None);
    }
}
