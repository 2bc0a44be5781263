// Record-per-file store
//
// Each key is a file in the store directory. Writes go to a temporary
// sibling first and are renamed into place so a crash never leaves a
// half-written board record.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use harada_engine::store::{BoardStore, StoreError};

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StoreError::Io(format!("invalid record key '{}'", key)));
        }
        Ok(self.dir.join(key))
    }
}

fn map_io(path: &Path, e: std::io::Error) -> StoreError {
    let msg = format!("{}: {}", path.display(), e);
    match e.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => StoreError::Unavailable(msg),
        // ENOSPC / EDQUOT
        _ if matches!(e.raw_os_error(), Some(28) | Some(122)) => StoreError::QuotaExceeded(msg),
        _ => StoreError::Io(msg),
    }
}

impl BoardStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io(&path, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{}.tmp", key));
        fs::write(&tmp, value).map_err(|e| map_io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            map_io(&path, e)
        })?;
        log::debug!("Wrote {} ({} bytes)", path.display(), value.len());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io(&path, e)),
        }
    }
}
