//! Transactional write-back overlay over a `Storage`.
//!
//! Every message is executed against a `CacheStore`. Writes and deletes are
//! buffered in the overlay and reach the underlying store only through
//! [`CacheStore::commit`]; dropping the overlay discards them. Overlays nest,
//! so a sub-call (a deposit hook, an IBC application) can be rolled back
//! without touching the enclosing message.

use std::collections::BTreeMap;
use std::ops::Bound;

use cosmwasm_std::{Order, Record, Storage};

pub struct CacheStore<'a> {
    base: &'a mut dyn Storage,
    /// `None` marks a pending delete
    pending: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a> CacheStore<'a> {
    pub fn new(base: &'a mut dyn Storage) -> Self {
        Self {
            base,
            pending: BTreeMap::new(),
        }
    }

    /// Number of buffered writes and deletes.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Flush buffered writes and deletes into the underlying store.
    pub fn commit(self) {
        for (key, value) in self.pending {
            match value {
                Some(value) => self.base.set(&key, &value),
                None => self.base.remove(&key),
            }
        }
    }
}

impl Storage for CacheStore<'_> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.pending.get(key) {
            Some(value) => value.clone(),
            None => self.base.get(key),
        }
    }

    fn range<'b>(
        &'b self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: Order,
    ) -> Box<dyn Iterator<Item = Record> + 'b> {
        if let (Some(start), Some(end)) = (start, end) {
            if start >= end {
                return Box::new(std::iter::empty());
            }
        }

        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.base.range(start, end, Order::Ascending).collect();

        let bounds = (
            start.map_or(Bound::Unbounded, |s| Bound::Included(s.to_vec())),
            end.map_or(Bound::Unbounded, |e| Bound::Excluded(e.to_vec())),
        );
        for (key, value) in self.pending.range::<Vec<u8>, _>(bounds) {
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        match order {
            Order::Ascending => Box::new(merged.into_iter()),
            Order::Descending => Box::new(merged.into_iter().rev()),
        }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.pending.insert(key.to_vec(), Some(value.to_vec()));
    }

    fn remove(&mut self, key: &[u8]) {
        self.pending.insert(key.to_vec(), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::MockStorage;

    fn seeded() -> MockStorage {
        let mut store = MockStorage::new();
        store.set(b"a", b"1");
        store.set(b"b", b"2");
        store.set(b"d", b"4");
        store
    }

    #[test]
    fn test_reads_see_pending_writes() {
        let mut base = seeded();
        let mut cache = CacheStore::new(&mut base);

        cache.set(b"a", b"10");
        cache.remove(b"b");
        cache.set(b"c", b"3");

        assert_eq!(cache.get(b"a"), Some(b"10".to_vec()));
        assert_eq!(cache.get(b"b"), None);
        assert_eq!(cache.get(b"c"), Some(b"3".to_vec()));
        assert_eq!(cache.get(b"d"), Some(b"4".to_vec()));
    }

    #[test]
    fn test_drop_discards() {
        let mut base = seeded();
        {
            let mut cache = CacheStore::new(&mut base);
            cache.set(b"a", b"10");
            cache.remove(b"d");
            assert_eq!(cache.pending_len(), 2);
        }
        assert_eq!(base.get(b"a"), Some(b"1".to_vec()));
        assert_eq!(base.get(b"d"), Some(b"4".to_vec()));
    }

    #[test]
    fn test_commit_flushes() {
        let mut base = seeded();
        let mut cache = CacheStore::new(&mut base);
        cache.set(b"a", b"10");
        cache.remove(b"d");
        cache.commit();

        assert_eq!(base.get(b"a"), Some(b"10".to_vec()));
        assert_eq!(base.get(b"d"), None);
    }

    #[test]
    fn test_range_merges_in_order() {
        let mut base = seeded();
        let mut cache = CacheStore::new(&mut base);
        cache.remove(b"b");
        cache.set(b"c", b"3");
        cache.set(b"e", b"5");

        let keys: Vec<Vec<u8>> = cache
            .range(None, None, Order::Ascending)
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![b"a".to_vec(), b"c".to_vec(), b"d".to_vec(), b"e".to_vec()]);

        let bounded: Vec<Vec<u8>> = cache
            .range(Some(b"b".as_slice()), Some(b"e".as_slice()), Order::Descending)
            .map(|(k, _)| k)
            .collect();
        assert_eq!(bounded, vec![b"d".to_vec(), b"c".to_vec()]);

        assert_eq!(cache.range(Some(b"e".as_slice()), Some(b"a".as_slice()), Order::Ascending).count(), 0);
    }

    #[test]
    fn test_nested_rollback() {
        let mut base = seeded();
        let mut outer = CacheStore::new(&mut base);
        outer.set(b"x", b"outer");
        {
            let mut inner = CacheStore::new(&mut outer);
            inner.set(b"y", b"inner");
            assert_eq!(inner.get(b"x"), Some(b"outer".to_vec()));
        }
        assert_eq!(outer.get(b"y"), None);
        outer.commit();
        assert_eq!(base.get(b"x"), Some(b"outer".to_vec()));
        assert_eq!(base.get(b"y"), None);
    }
}
