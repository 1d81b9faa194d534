/// Indexed storage with slot reuse.
///
/// A `Slab` hands out small `usize` keys that double as poller tokens.
/// Freed slots form an intrusive free list and are reused by later
/// insertions, so keys stay dense no matter how many connections come and go.
///
/// Lookups with a key that has been removed return `None` rather than
/// panicking: a readiness batch may still carry a token whose connection was
/// closed earlier in the same batch.
#[derive(Debug)]
pub(crate) struct Slab<T> {
    entries: Vec<Entry<T>>,
    /// Head of the free list; equals `entries.len()` when no slot is free.
    next_free: usize,
    len: usize,
}

#[derive(Debug)]
enum Entry<T> {
    Occupied(T),
    Vacant(usize),
}

impl<T> Slab<T> {
    /// Creates an empty slab with room for `capacity` values before reallocating.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            next_free: 0,
            len: 0,
        }
    }

    /// Key that the next call to [`insert`](Self::insert) will return.
    pub(crate) fn vacant_key(&self) -> usize {
        self.next_free
    }

    /// Stores `value` and returns its key.
    pub(crate) fn insert(&mut self, value: T) -> usize {
        let key = self.next_free;

        if key == self.entries.len() {
            self.entries.push(Entry::Occupied(value));
            self.next_free = self.entries.len();
        } else {
            match std::mem::replace(&mut self.entries[key], Entry::Occupied(value)) {
                Entry::Vacant(next) => self.next_free = next,
                Entry::Occupied(_) => unreachable!("free list points at an occupied slot"),
            }
        }

        self.len += 1;
        key
    }

    pub(crate) fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        match self.entries.get_mut(key) {
            Some(Entry::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Removes and returns the value at `key`, or `None` if the slot is empty.
    pub(crate) fn remove(&mut self, key: usize) -> Option<T> {
        let entry = self.entries.get_mut(key)?;

        if let Entry::Vacant(_) = entry {
            return None;
        }

        let Entry::Occupied(value) = std::mem::replace(entry, Entry::Vacant(self.next_free)) else {
            unreachable!()
        };

        self.next_free = key;
        self.len -= 1;
        Some(value)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every value, returning them in key order.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.next_free = 0;
        self.len = 0;

        self.entries.drain(..).filter_map(|entry| match entry {
            Entry::Occupied(value) => Some(value),
            Entry::Vacant(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Slab;

    #[test]
    fn keys_are_reused_after_removal() {
        let mut slab = Slab::with_capacity(4);

        let a = slab.insert("a");
        let b = slab.insert("b");
        let c = slab.insert("c");
        assert_eq!((a, b, c), (0, 1, 2));

        assert_eq!(slab.remove(b), Some("b"));
        assert_eq!(slab.vacant_key(), b);
        assert_eq!(slab.insert("d"), b);
        assert_eq!(slab.insert("e"), 3);
        assert_eq!(slab.len(), 4);
    }

    #[test]
    fn stale_keys_are_ignored() {
        let mut slab = Slab::with_capacity(1);

        let key = slab.insert(10);
        assert_eq!(slab.remove(key), Some(10));

        assert_eq!(slab.remove(key), None);
        assert!(slab.get_mut(key).is_none());
        assert!(slab.get_mut(99).is_none());
        assert!(slab.is_empty());
    }

    #[test]
    fn free_list_is_last_in_first_out() {
        let mut slab = Slab::with_capacity(4);
        for i in 0..4 {
            slab.insert(i);
        }

        slab.remove(0);
        slab.remove(2);

        assert_eq!(slab.insert(20), 2);
        assert_eq!(slab.insert(0), 0);
        assert_eq!(slab.insert(4), 4);
    }

    #[test]
    fn drain_yields_live_values_and_resets() {
        let mut slab = Slab::with_capacity(4);
        for i in 0..4 {
            slab.insert(i);
        }
        slab.remove(1);

        let values: Vec<_> = slab.drain().collect();
        assert_eq!(values, vec![0, 2, 3]);
        assert!(slab.is_empty());
        assert_eq!(slab.insert(7), 0);
    }

    #[test]
    fn values_are_mutable_in_place() {
        let mut slab = Slab::with_capacity(1);
        let key = slab.insert(String::from("req"));

        if let Some(value) = slab.get_mut(key) {
            value.push_str("uest");
        }

        assert_eq!(slab.remove(key).as_deref(), Some("request"));
    }
}
