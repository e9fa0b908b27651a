//! Log-structured single-file key-value cache.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use ahash::RandomState;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use parking_lot::Mutex;

use crate::cache::traits::{CacheEntry, QueryCache};
use crate::error::{QuarrelError, Result};
use crate::query::Fingerprint;

/// Persistent key-value cache over one append-only file.
///
/// Each `set` appends a `[fingerprint | len | bincode payload]` record;
/// the fingerprint-to-offset index is rebuilt on open by scanning the
/// log. The last record written for a fingerprint wins.
#[derive(Debug)]
pub struct KvCache {
    path: PathBuf,
    inner: Mutex<KvInner>,
}

#[derive(Debug)]
struct KvInner {
    file: File,
    index: HashMap<Fingerprint, (u64, u64), RandomState>,
}

impl KvCache {
    /// Open (or create) a cache file and rebuild its index.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)?;

        let index = Self::scan(&mut file)?;
        Ok(KvCache {
            path,
            inner: Mutex::new(KvInner { file, index }),
        })
    }

    /// File backing this cache.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Number of distinct fingerprints in the index.
    pub fn len(&self) -> usize {
        self.inner.lock().index.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().index.is_empty()
    }

    fn scan(file: &mut File) -> Result<HashMap<Fingerprint, (u64, u64), RandomState>> {
        let len = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;

        let mut index = HashMap::default();
        let mut reader = BufReader::new(&mut *file);
        let mut offset = 0u64;

        while offset < len {
            let mut digest = [0u8; 32];
            reader.read_exact(&mut digest)?;
            let payload_len = reader.read_u64::<LittleEndian>()?;

            let payload_offset = offset + 32 + 8;
            if payload_offset + payload_len > len {
                // Truncated tail record (e.g. interrupted write); keep what
                // was readable before it.
                log::warn!("kv cache: dropping truncated record at offset {offset}");
                break;
            }
            reader.seek_relative(payload_len as i64)?;

            index.insert(
                Fingerprint::from_bytes(digest),
                (payload_offset, payload_len),
            );
            offset = payload_offset + payload_len;
        }

        file.seek(SeekFrom::End(0))?;
        Ok(index)
    }
}

impl QueryCache for KvCache {
    fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
        let mut inner = self.inner.lock();
        let (offset, len) = match inner.index.get(fingerprint) {
            Some(&slot) => slot,
            None => return Ok(None),
        };

        inner.file.seek(SeekFrom::Start(offset))?;
        let mut payload = vec![0u8; len as usize];
        inner.file.read_exact(&mut payload)?;
        inner.file.seek(SeekFrom::End(0))?;

        let entry = bincode::deserialize(&payload)
            .map_err(|e| QuarrelError::serialization(format!("corrupt cache record: {e}")))?;
        Ok(Some(entry))
    }

    fn set(&self, fingerprint: &Fingerprint, entry: CacheEntry) -> Result<()> {
        let payload = bincode::serialize(&entry)
            .map_err(|e| QuarrelError::serialization(e.to_string()))?;

        let mut inner = self.inner.lock();
        let record_start = inner.file.seek(SeekFrom::End(0))?;
        inner.file.write_all(fingerprint.as_bytes())?;
        inner
            .file
            .write_u64::<LittleEndian>(payload.len() as u64)?;
        inner.file.write_all(&payload)?;
        inner.file.flush()?;

        inner.index.insert(
            *fingerprint,
            (record_start + 32 + 8, payload.len() as u64),
        );
        Ok(())
    }
}
