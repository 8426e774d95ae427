use std::path::PathBuf;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, trace};

use crate::{
    error::Error,
    util::{decode_hex, encode_hex, now_secs, read_file, write_file},
    Cache, Entry,
};

/// A file-backed cache. Each entry is a hex-encoded bincode [`Entry`] at `{dir}/{key}.bin`.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    ttl: u64,
}

impl FileCache {
    /// Creates a cache rooted at `dir` whose entries live for `ttl` seconds.
    pub fn new(dir: impl Into<PathBuf>, ttl: u64) -> Self {
        Self { dir: dir.into(), ttl }
    }

    /// Keys may contain `:`, which isn't portable in file names.
    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.bin", key.replace([':', '/', '\\'], "_")))
    }

    /// Read a cached object, deleting it if it has expired.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, Error> {
        let path = self.path(key);
        let Some(binary_string) = read_file(&path)? else {
            return Ok(None);
        };

        let binary_vec = decode_hex(binary_string.trim())?;

        let entry: Entry<T> = bincode::deserialize(&binary_vec)
            .map_err(|e| Error::Generic(format!("failed to deserialize cache object: {e:?}")))?;

        if entry.is_expired(now_secs()?) {
            debug!("cache entry '{}' expired", key);
            self.delete(key)?;
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    /// Store a value in the cache, with an optional expiry time \
    /// If no expiry time is specified, the object expires after the cache's ttl
    pub fn store<T: Serialize>(&self, key: &str, value: &T, expiry: Option<u64>) -> Result<(), Error> {
        let expiry = match expiry {
            Some(expiry) => expiry,
            None => now_secs()?.saturating_add(self.ttl),
        };

        let encoded = bincode::serialize(&Entry { value, expiry })
            .map_err(|e| Error::Generic(format!("failed to serialize cache object: {e:?}")))?;
        write_file(&self.path(key), &encode_hex(&encoded))?;
        trace!("stored cache entry '{}' until {}", key, expiry);

        Ok(())
    }

    /// Delete a cached object
    pub fn delete(&self, key: &str) -> Result<(), Error> {
        let path = self.path(key);
        if path.exists() {
            std::fs::remove_file(path)
                .map_err(|e| Error::Generic(format!("failed to delete cache file: {e:?}")))?;
        }

        Ok(())
    }

    /// Check if a cached object exists
    pub fn exists(&self, key: &str) -> bool {
        self.path(key).exists()
    }

    /// List cached keys containing `pattern`, sorted. `*` matches everything.
    pub fn keys(&self, pattern: &str) -> Result<Vec<String>, Error> {
        let pattern = pattern.replace('*', "");
        let mut keys = Vec::new();

        for path in self.files()? {
            let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if pattern.is_empty() || key.contains(&pattern) {
                keys.push(key.to_string());
            }
        }

        keys.sort();
        Ok(keys)
    }

    /// Clear the cache, removing all objects
    pub fn clear(&self) -> Result<(), Error> {
        for path in self.files()? {
            std::fs::remove_file(&path)
                .map_err(|e| Error::Generic(format!("failed to delete cache file: {e:?}")))?;
        }

        Ok(())
    }

    /// Total size of the cache files in bytes.
    pub fn size(&self) -> Result<u64, Error> {
        let mut size = 0;
        for path in self.files()? {
            size += std::fs::metadata(path)
                .map_err(|e| Error::Generic(format!("failed to get metadata: {e:?}")))?
                .len();
        }

        Ok(size)
    }

    fn files(&self) -> Result<Vec<PathBuf>, Error> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in self
            .dir
            .read_dir()
            .map_err(|e| Error::Generic(format!("failed to read cache directory: {e:?}")))?
        {
            let path = entry
                .map_err(|e| Error::Generic(format!("failed to read cache entry: {e:?}")))?
                .path();
            if path.extension().is_some_and(|ext| ext == "bin") {
                files.push(path);
            }
        }

        Ok(files)
    }
}

#[async_trait]
impl<T> Cache<T> for FileCache
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<T>, Error> {
        self.read(key)
    }

    async fn set(&self, key: &str, value: T) -> Result<(), Error> {
        self.store(key, &value, None)
    }
}
