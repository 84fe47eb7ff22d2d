//! Chained hash table keyed by symbol name.
//!
//! The bucket count is fixed at creation from the size hint; the table never
//! rehashes. Past a few entries per bucket lookups degrade linearly, so size
//! the hint to the expected number of symbols. Nothing is ever dropped or
//! truncated when the hint is exceeded.

mod ordered;

pub use ordered::{InOrder, OrderedView};

use crate::error::Error;

struct Entry<V> {
    name: String,
    data: V,
}

pub struct SymbolTable<V> {
    buckets: Vec<Vec<Entry<V>>>,
    len: usize,
}

/// FNV-1a followed by an avalanche mix.
pub fn hash(name: &str) -> u32 {
    let mut hash: u32 = 2166136261;
    for byte in name.bytes() {
        hash = (hash ^ byte as u32).wrapping_mul(16777619);
    }
    hash = hash.wrapping_add(hash << 13);
    hash ^= hash >> 7;
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 17;
    hash = hash.wrapping_add(hash << 5);
    hash
}

impl<V> SymbolTable<V> {
    /// Creates a table with `size_hint` buckets (at least one).
    pub fn create(size_hint: usize) -> Result<Self, Error> {
        let size = size_hint.max(1);
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(size)
            .map_err(|_| Error::OutOfMemory("symbol table"))?;
        buckets.resize_with(size, Vec::new);
        Ok(SymbolTable { buckets, len: 0 })
    }

    fn bucket(&self, name: &str) -> usize {
        hash(name) as usize % self.buckets.len()
    }

    /// Inserts `data` under `name`, replacing the data of an existing entry.
    pub fn install(&mut self, name: &str, data: V) -> Result<(), Error> {
        let idx = self.bucket(name);
        let chain = &mut self.buckets[idx];
        if let Some(entry) = chain.iter_mut().find(|entry| entry.name == name) {
            entry.data = data;
            return Ok(());
        }

        let mut key = String::new();
        key.try_reserve_exact(name.len())
            .map_err(|_| Error::OutOfMemory("symbol name"))?;
        key.push_str(name);
        chain
            .try_reserve(1)
            .map_err(|_| Error::OutOfMemory("symbol entry"))?;
        chain.push(Entry { name: key, data });
        self.len += 1;
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&V> {
        self.buckets[self.bucket(name)]
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.data)
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut V> {
        let idx = self.bucket(name);
        self.buckets[idx]
            .iter_mut()
            .find(|entry| entry.name == name)
            .map(|entry| &mut entry.data)
    }

    /// Every entry, in bucket order. The order depends on the hash layout and
    /// must not be used for output; see [`SymbolTable::ordered`].
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        self.buckets
            .iter()
            .flat_map(|chain| chain.iter().map(|entry| (entry.name.as_str(), &entry.data)))
    }

    /// Name-sorted view over the current contents.
    pub fn ordered(&self) -> OrderedView<'_, V> {
        OrderedView::build(self.iter())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn buckets(&self) -> usize {
        self.buckets.len()
    }
}
