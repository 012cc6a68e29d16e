//! Directory-backed key-value store
//!
//! Each key is stored as one file named after the key. Writes go to a
//! sibling `.tmp` file which is then renamed over the target, so a crash
//! mid-write leaves either the old or the new value, never a torn one.
//!
//! # Sync Modes
//!
//! | Mode | fsync | Use Case |
//! |------|-------|----------|
//! | None | never | Tests, caches |
//! | Strict | file + rename on every write | Default |

use crate::error::{Result, StorageError};
use crate::{entry_cost, KeyValueStore};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const TMP_SUFFIX: &str = ".tmp";
const MAX_KEY_LEN: usize = 200;

/// When written files are flushed to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Leave flushing to the OS
    None,
    /// fsync the file before the rename
    #[default]
    Strict,
}

/// Directory-backed store
///
/// Keys are restricted to `[A-Za-z0-9_.-]`, must not start with `.` and must
/// not end with `.tmp`.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    sync: SyncMode,
    quota_bytes: Option<usize>,
    /// Serializes writers so quota accounting sees a stable directory
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!("Opened file store at {}", dir.display());
        Ok(FileStore {
            dir,
            sync: SyncMode::default(),
            quota_bytes: None,
            write_lock: Mutex::new(()),
        })
    }

    /// Set the sync mode
    pub fn sync_mode(mut self, sync: SyncMode) -> Self {
        self.sync = sync;
        self
    }

    /// Refuse writes that would push total usage past `limit` bytes
    pub fn quota(mut self, limit: usize) -> Self {
        self.quota_bytes = Some(limit);
        self
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        check_key(key)?;
        Ok(self.dir.join(key))
    }

    /// Write `value` to `tmp`, then rename it over `path`
    fn replace_via(&self, tmp: &Path, path: &Path, value: &str) -> std::io::Result<()> {
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(tmp)?;
            file.write_all(value.as_bytes())?;
            if self.sync == SyncMode::Strict {
                file.sync_all()?;
            }
        }
        fs::rename(tmp, path)?;
        if self.sync == SyncMode::Strict {
            // Persist the rename itself; not supported on every platform
            if let Ok(dir) = File::open(&self.dir) {
                let _ = dir.sync_all();
            }
        }
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, usize)>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            if check_key(&name).is_err() {
                continue;
            }
            let len = entry.metadata()?.len() as usize;
            out.push((name, len));
        }
        out.sort();
        Ok(out)
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StorageError::InvalidUtf8(key.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock();

        if let Some(limit) = self.quota_bytes {
            let requested: usize = self
                .entries()?
                .into_iter()
                .filter(|(name, _)| name != key)
                .map(|(name, len)| entry_cost(&name, len))
                .sum::<usize>()
                + entry_cost(key, value.len());
            if requested > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    requested,
                    limit,
                });
            }
        }

        let tmp = self.dir.join(format!("{}{}", key, TMP_SUFFIX));
        if let Err(e) = self.replace_via(&tmp, &path, value) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                if cleanup.kind() != ErrorKind::NotFound {
                    debug!("Could not remove {}: {}", tmp.display(), cleanup);
                }
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries()?.into_iter().map(|(name, _)| name).collect())
    }

    fn usage_bytes(&self) -> Result<usize> {
        Ok(self
            .entries()?
            .iter()
            .map(|(name, len)| entry_cost(name, *len))
            .sum())
    }
}

fn check_key(key: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        })
    };
    if key.is_empty() {
        return invalid("empty");
    }
    if key.len() > MAX_KEY_LEN {
        return invalid("too long");
    }
    if key.starts_with('.') {
        return invalid("must not start with '.'");
    }
    if key.ends_with(TMP_SUFFIX) {
        return invalid("reserved suffix");
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return invalid("allowed characters are [A-Za-z0-9_.-]");
    }
    Ok(())
}
