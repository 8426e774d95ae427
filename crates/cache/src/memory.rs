use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use hashbrown::HashMap;

use crate::{error::Error, util::now_secs, Cache, Entry, DEFAULT_TTL_SECS};

/// An in-process cache with the same expiry semantics as [`FileCache`](crate::FileCache).
#[derive(Debug)]
pub struct MemoryCache<T> {
    entries: RwLock<HashMap<String, Entry<T>>>,
    ttl: u64,
}

impl<T> Default for MemoryCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_SECS)
    }
}

impl<T> MemoryCache<T> {
    /// Creates an empty cache whose entries live for `ttl` seconds.
    pub fn new(ttl: u64) -> Self {
        Self { entries: RwLock::new(HashMap::new()), ttl }
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<T> Cache<T> for MemoryCache<T>
where
    T: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<T>, Error> {
        let now = now_secs()?;
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        self.entries.write().unwrap_or_else(PoisonError::into_inner).remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: T) -> Result<(), Error> {
        let expiry = now_secs()?.saturating_add(self.ttl);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), Entry { value, expiry });
        Ok(())
    }
}
