use std::collections::HashMap;
use std::hash::Hash;

/// Keyed buckets that remember the order in which keys were first seen.
///
/// Built fresh for each batch; nothing here outlives one pipeline run.
#[derive(Debug)]
pub struct Buckets<K, V> {
    index: HashMap<K, usize>,
    buckets: Vec<(K, Vec<V>)>,
}

impl<K, V> Default for Buckets<K, V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            buckets: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> Buckets<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: K, value: V) {
        match self.index.get(&key) {
            Some(&slot) => self.buckets[slot].1.push(value),
            None => {
                self.index.insert(key.clone(), self.buckets.len());
                self.buckets.push((key, vec![value]));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl<K: Eq + Hash + Clone, V> FromIterator<(K, V)> for Buckets<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut buckets = Self::new();
        for (key, value) in iter {
            buckets.push(key, value);
        }
        buckets
    }
}

impl<K, V> IntoIterator for Buckets<K, V> {
    type Item = (K, Vec<V>);
    type IntoIter = std::vec::IntoIter<(K, Vec<V>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_iter()
    }
}
