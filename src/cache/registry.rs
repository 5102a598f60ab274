//! Bidirectional tag registry.
//!
//! Tracks which cache keys belong to which partition tags so the in-process
//! backend can invalidate a whole partition, and so evicted or expired keys
//! do not linger in the tag index.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

#[cfg(test)]
use super::lock::rw_read;
use super::lock::rw_write;

const SOURCE: &str = "cache::registry";

/// Tracks tag → keys and key → tags mappings.
#[derive(Default)]
pub struct TagRegistry {
    tag_to_keys: RwLock<HashMap<String, HashSet<String>>>,
    key_to_tags: RwLock<HashMap<String, HashSet<String>>>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `key` with `tags`, replacing any previous association.
    pub fn register(&self, key: &str, tags: &[String]) {
        let mut t2k = rw_write(&self.tag_to_keys, SOURCE, "register.tag_to_keys");
        let mut k2t = rw_write(&self.key_to_tags, SOURCE, "register.key_to_tags");

        if let Some(previous) = k2t.remove(key) {
            detach(&mut t2k, key, previous);
        }

        for tag in tags {
            t2k.entry(tag.clone()).or_default().insert(key.to_string());
        }
        k2t.insert(key.to_string(), tags.iter().cloned().collect());
    }

    /// All keys currently associated with `tag`.
    #[cfg(test)]
    pub fn keys_for_tag(&self, tag: &str) -> HashSet<String> {
        rw_read(&self.tag_to_keys, SOURCE, "keys_for_tag")
            .get(tag)
            .cloned()
            .unwrap_or_default()
    }

    /// All tags `key` is associated with.
    #[cfg(test)]
    pub fn tags_for_key(&self, key: &str) -> HashSet<String> {
        rw_read(&self.key_to_tags, SOURCE, "tags_for_key")
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Forget `key` and clean up its tag mappings.
    pub fn unregister(&self, key: &str) {
        let mut t2k = rw_write(&self.tag_to_keys, SOURCE, "unregister.tag_to_keys");
        let mut k2t = rw_write(&self.key_to_tags, SOURCE, "unregister.key_to_tags");

        if let Some(tags) = k2t.remove(key) {
            detach(&mut t2k, key, tags);
        }
    }

    /// Remove `tag` and every key associated with it.
    ///
    /// Returns the keys that were associated with the tag.
    pub fn unregister_tag(&self, tag: &str) -> HashSet<String> {
        let mut t2k = rw_write(&self.tag_to_keys, SOURCE, "unregister_tag.tag_to_keys");
        let mut k2t = rw_write(&self.key_to_tags, SOURCE, "unregister_tag.key_to_tags");

        let keys = t2k.remove(tag).unwrap_or_default();
        for key in &keys {
            if let Some(tags) = k2t.remove(key) {
                detach(&mut t2k, key, tags);
            }
        }
        keys
    }

    pub fn clear(&self) {
        rw_write(&self.tag_to_keys, SOURCE, "clear.tag_to_keys").clear();
        rw_write(&self.key_to_tags, SOURCE, "clear.key_to_tags").clear();
    }

    /// Number of tags with at least one key.
    #[cfg(test)]
    pub fn tag_count(&self) -> usize {
        rw_read(&self.tag_to_keys, SOURCE, "tag_count").len()
    }

    #[cfg(test)]
    pub fn key_count(&self) -> usize {
        rw_read(&self.key_to_tags, SOURCE, "key_count").len()
    }
}

fn detach(
    tag_to_keys: &mut HashMap<String, HashSet<String>>,
    key: &str,
    tags: HashSet<String>,
) {
    for tag in tags {
        if let Some(keys) = tag_to_keys.get_mut(&tag) {
            keys.remove(key);
            if keys.is_empty() {
                tag_to_keys.remove(&tag);
            }
        }
    }
}
