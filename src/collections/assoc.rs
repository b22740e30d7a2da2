//! Unique-key association list with linear lookup.
//!
//! Backs both request/response header fields and the route table. Both are
//! small, so a linear scan is cheaper than hashing in practice. A new key is
//! placed at the head; iteration yields the most recently inserted entry
//! first. Setting an existing key replaces its value in place.

/// Result of [`AssocList::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The key was new and an entry was prepended.
    Inserted,
    /// The key existed and its value was replaced.
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<V> {
    key: String,
    value: V,
}

impl<V> Entry<V> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

// Entries are stored oldest-first so that prepending is a push; every
// public view walks the vector backwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssocList<V> {
    entries: Vec<Entry<V>>,
}

impl<V> Default for AssocList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> AssocList<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts `key` at the head, or overwrites the value of an existing key.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> SetOutcome {
        let key = key.into();
        match self.entries.iter_mut().rev().find(|e| e.key == key) {
            Some(existing) => {
                existing.value = value;
                SetOutcome::Updated
            }
            None => {
                self.entries.push(Entry { key, value });
                SetOutcome::Inserted
            }
        }
    }

    /// Returns the entry for `key`, scanning from the head.
    pub fn get_entry(&self, key: &str) -> Option<&Entry<V>> {
        self.entries.iter().rev().find(|e| e.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.get_entry(key).map(|e| &e.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get_entry(key).is_some()
    }

    /// Drops every entry. Returns how many were released.
    pub fn clear(&mut self) -> usize {
        let released = self.entries.len();
        self.entries.clear();
        released
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries head first (most recently inserted key first).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &V)> {
        self.entries.iter().rev().map(|e| (e.key.as_str(), &e.value))
    }
}
