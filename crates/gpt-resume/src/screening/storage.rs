use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use super::validation::clean_file_name;

/// Media sub-directory (and path prefix) for uploaded resumes.
pub const RESUME_PREFIX: &str = "resume";

/// Where uploaded resume bytes end up. Returns the media-relative path stored on the row.
pub trait ResumeStore: Send + Sync {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, StorageError>;
    /// Deletes a file previously returned by [`ResumeStore::save`]. Missing files are ignored.
    fn remove(&self, path: &str) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("upload has no usable file name")]
    InvalidName,
    #[error("unable to write upload: {0}")]
    Io(#[from] std::io::Error),
}

/// `jane.pdf` -> `jane_1a2b3c4d.pdf`.
fn suffixed(name: &str) -> String {
    let tag = Uuid::new_v4().simple().to_string();
    let tag = &tag[..8];
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{tag}.{ext}"),
        _ => format!("{name}_{tag}"),
    }
}

/// Writes uploads under `<media_root>/resume/`, never overwriting an existing file.
#[derive(Debug, Clone)]
pub struct FsResumeStore {
    media_root: PathBuf,
}

impl FsResumeStore {
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
        }
    }
}

impl ResumeStore for FsResumeStore {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let name = clean_file_name(file_name).map_err(|_| StorageError::InvalidName)?;
        let dir = self.media_root.join(RESUME_PREFIX);
        fs::create_dir_all(&dir)?;

        let mut candidate = name.clone();
        loop {
            let target = dir.join(&candidate);
            match OpenOptions::new().write(true).create_new(true).open(&target) {
                Ok(mut file) => {
                    file.write_all(bytes)?;
                    debug!(path = %target.display(), size = bytes.len(), "stored resume upload");
                    return Ok(format!("{RESUME_PREFIX}/{candidate}"));
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    candidate = suffixed(&name);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn remove(&self, path: &str) -> Result<(), StorageError> {
        let target = self.media_root.join(path);
        match fs::remove_file(&target) {
            Ok(()) => {
                debug!(path = %target.display(), "removed resume upload");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Keeps uploads in memory; handy for tests and `:memory:` runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryResumeStore {
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryResumeStore {
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .ok()
            .and_then(|files| files.get(path).cloned())
    }

    pub fn len(&self) -> usize {
        self.files.lock().map(|files| files.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResumeStore for MemoryResumeStore {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let name = clean_file_name(file_name).map_err(|_| StorageError::InvalidName)?;
        let mut files = self
            .files
            .lock()
            .map_err(|_| std::io::Error::new(ErrorKind::Other, "resume store lock poisoned"))?;
        let mut path = format!("{RESUME_PREFIX}/{name}");
        while files.contains_key(&path) {
            path = format!("{RESUME_PREFIX}/{}", suffixed(&name));
        }
        files.insert(path.clone(), bytes.to_vec());
        Ok(path)
    }

    fn remove(&self, path: &str) -> Result<(), StorageError> {
        self.files
            .lock()
            .map_err(|_| std::io::Error::new(ErrorKind::Other, "resume store lock poisoned"))?
            .remove(path);
        Ok(())
    }
}
