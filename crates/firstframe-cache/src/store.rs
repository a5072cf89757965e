use crate::key::CacheKey;
use firstframe_scene::{codec, CodecError, SceneNode};
use log::{debug, warn};
use parking_lot::Mutex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const ENTRY_EXTENSION: &str = "scene";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache directory error: {0}")]
    Io(#[from] io::Error),
    #[error("scene could not be encoded: {0}")]
    Encode(#[from] CodecError),
}

/// File-backed scene store with single-use reads.
///
/// The store is process-wide shared state; a store-level mutex serializes
/// entry I/O. Reading an entry always deletes it, whether or not it decodes,
/// so a stale or corrupt file degrades exactly one launch to a cold render
/// instead of poisoning every launch after it.
pub struct SceneCache {
    inner: Mutex<PathBuf>,
}

impl SceneCache {
    /// Opens (and creates, if needed) a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            inner: Mutex::new(dir),
        })
    }

    /// Convenience store under the system temp directory.
    pub fn in_temp() -> Result<Self, CacheError> {
        Self::new(std::env::temp_dir().join("firstframe-scene-cache"))
    }

    /// Encodes `tree` and persists it under `key`, overwriting any prior
    /// entry.
    pub fn store(&self, key: &CacheKey, tree: &SceneNode) -> Result<(), CacheError> {
        let bytes = codec::encode(tree)?;
        self.store_encoded(key, &bytes)
    }

    /// Persists an already-encoded payload (the write-back path: callers that
    /// kept the raw bytes from a previous take can re-store them untouched).
    pub fn store_encoded(&self, key: &CacheKey, bytes: &[u8]) -> Result<(), CacheError> {
        let dir = self.inner.lock();
        let path = entry_path(&dir, key);
        let staging = path.with_extension("tmp");
        fs::write(&staging, bytes)?;
        fs::rename(&staging, &path)?;
        debug!("stored scene entry {key} ({} bytes)", bytes.len());
        Ok(())
    }

    /// Takes the entry for `key`, removing it from the store. Missing entry,
    /// unreadable file, and decode failure are all the same answer: no cached
    /// tree available.
    pub fn take(&self, key: &CacheKey) -> Option<SceneNode> {
        let dir = self.inner.lock();
        let path = entry_path(&dir, key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("scene entry {key} unreadable: {e}");
                let _ = fs::remove_file(&path);
                return None;
            }
        };
        // single-use: gone before we even try to decode
        let _ = fs::remove_file(&path);
        drop(dir);

        match codec::decode(&bytes) {
            Ok(tree) => {
                debug!("scene entry {key} restored ({} nodes)", tree.count_nodes());
                Some(tree)
            }
            Err(e) => {
                warn!("scene entry {key} discarded: {e}");
                None
            }
        }
    }

    /// Non-consuming existence check.
    pub fn has(&self, key: &CacheKey) -> bool {
        let dir = self.inner.lock();
        entry_path(&dir, key).is_file()
    }

    pub fn remove(&self, key: &CacheKey) -> Result<(), CacheError> {
        let dir = self.inner.lock();
        match fs::remove_file(entry_path(&dir, key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes every scene entry in the store directory. Files that are not
    /// scene entries are left alone.
    pub fn remove_all(&self) -> Result<(), CacheError> {
        let dir = self.inner.lock();
        for entry in fs::read_dir(&*dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION) {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

fn entry_path(dir: &Path, key: &CacheKey) -> PathBuf {
    dir.join(format!("{}.{ENTRY_EXTENSION}", key.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use firstframe_scene::{PropValue, SceneNode, ROOT_TAG};
    use tempfile::TempDir;

    fn sample_tree() -> SceneNode {
        let mut root = SceneNode::new(ROOT_TAG, "Root");
        root.set_prop("bg", "white");
        let mut child = SceneNode::new(2, "Text");
        child.set_prop("text", "cached");
        root.add_child(child);
        root
    }

    fn store_in(dir: &TempDir) -> SceneCache {
        SceneCache::new(dir.path()).expect("store should open")
    }

    #[test]
    fn take_is_single_use() {
        let dir = TempDir::new().unwrap();
        let cache = store_in(&dir);
        let key = CacheKey::derive("home", "Feed");
        let tree = sample_tree();

        cache.store(&key, &tree).unwrap();
        assert!(cache.has(&key));

        let first = cache.take(&key).expect("first take hits");
        assert_eq!(first, tree);
        assert!(!cache.has(&key));
        assert!(cache.take(&key).is_none(), "second take misses");
    }

    #[test]
    fn store_overwrites_prior_entry() {
        let dir = TempDir::new().unwrap();
        let cache = store_in(&dir);
        let key = CacheKey::derive("home", "Feed");

        cache.store(&key, &sample_tree()).unwrap();
        let mut updated = sample_tree();
        updated.set_prop("bg", "black");
        cache.store(&key, &updated).unwrap();

        let taken = cache.take(&key).unwrap();
        assert_eq!(taken.prop("bg"), Some(&PropValue::from("black")));
    }

    #[test]
    fn corrupt_entry_is_a_miss_and_self_heals() {
        let dir = TempDir::new().unwrap();
        let cache = store_in(&dir);
        let key = CacheKey::derive("home", "Feed");

        cache.store_encoded(&key, b"FFSC\x01\x00not a scene").unwrap();
        assert!(cache.has(&key));
        assert!(cache.take(&key).is_none());
        // the corrupt file is gone, not waiting to fail the next launch
        assert!(!cache.has(&key));
    }

    #[test]
    fn write_back_round_trips() {
        let dir = TempDir::new().unwrap();
        let cache = store_in(&dir);
        let key = CacheKey::derive("home", "Feed");
        let tree = sample_tree();

        let bytes = firstframe_scene::encode(&tree).unwrap();
        cache.store_encoded(&key, &bytes).unwrap();
        assert_eq!(cache.take(&key), Some(tree));
    }

    #[test]
    fn remove_and_remove_all() {
        let dir = TempDir::new().unwrap();
        let cache = store_in(&dir);
        let a = CacheKey::derive("t", "A");
        let b = CacheKey::derive("t", "B");

        cache.store(&a, &sample_tree()).unwrap();
        cache.store(&b, &sample_tree()).unwrap();
        cache.remove(&a).unwrap();
        assert!(!cache.has(&a));
        assert!(cache.has(&b));

        cache.remove(&a).expect("removing a missing key is fine");
        cache.remove_all().unwrap();
        assert!(!cache.has(&b));
    }

    #[test]
    fn entries_are_isolated_per_key() {
        let dir = TempDir::new().unwrap();
        let cache = store_in(&dir);
        let a = CacheKey::derive("home", "Feed");
        let b = CacheKey::derive("home", "Profile");

        cache.store(&a, &sample_tree()).unwrap();
        let mut other = sample_tree();
        other.set_prop("bg", "red");
        cache.store(&b, &other).unwrap();

        assert_eq!(
            cache.take(&a).unwrap().prop("bg"),
            Some(&PropValue::from("white"))
        );
        assert_eq!(
            cache.take(&b).unwrap().prop("bg"),
            Some(&PropValue::from("red"))
        );
    }
}
