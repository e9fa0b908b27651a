//! One-file-per-fingerprint cache.

use std::fs;
use std::path::PathBuf;

use crate::cache::traits::{CacheEntry, QueryCache};
use crate::error::{QuarrelError, Result};
use crate::query::Fingerprint;

/// Disk cache storing each entry as one bincode file named by the
/// fingerprint's hex form. Entries survive the process.
#[derive(Debug)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Open a cache rooted at `dir`, creating the directory if needed.
    pub fn open<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileCache { dir })
    }

    fn entry_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.dir.join(format!("{}.bin", fingerprint.to_hex()))
    }
}

impl QueryCache for FileCache {
    fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
        let path = self.entry_path(fingerprint);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let entry = bincode::deserialize(&bytes)
            .map_err(|e| QuarrelError::serialization(format!("corrupt cache entry: {e}")))?;
        Ok(Some(entry))
    }

    fn set(&self, fingerprint: &Fingerprint, entry: CacheEntry) -> Result<()> {
        let bytes = bincode::serialize(&entry)
            .map_err(|e| QuarrelError::serialization(e.to_string()))?;

        // Write through a temp file so concurrent readers never observe a
        // half-written entry.
        let path = self.entry_path(fingerprint);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
