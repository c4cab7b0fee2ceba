use core::mem;

use alloc::vec::Vec;

use crate::time::{Duration, Expiration, Instant};
use super::Error;

/// A fixed capacity map whose entries lazily expire.
///
/// Each entry carries the instant it was last written. With a non-zero time-to-live an entry is
/// treated as absent by every lookup once `now - stamp >= ttl`, but it keeps occupying its slot
/// until it is removed or overwritten. Nothing is ever swept in the background.
///
/// Values are moved into the map. A value that must outlive the caller's copy (such as a packet
/// buffer) is cloned by the caller, `Clone` being the deep copy of such types.
#[derive(Debug)]
pub struct ExpiringMap<K, V> {
    slots: Vec<Option<Entry<K, V>>>,
    ttl: Duration,
}

#[derive(Clone, Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    stamp: Instant,
}

/// Iterator over the live entries of an [`ExpiringMap`].
///
/// [`ExpiringMap`]: struct.ExpiringMap.html
pub struct Iter<'a, K, V> {
    inner: core::slice::Iter<'a, Option<Entry<K, V>>>,
    ttl: Duration,
    now: Instant,
}

impl<K: Copy + Eq, V> ExpiringMap<K, V> {
    /// Create a map with room for exactly `capacity` entries.
    ///
    /// A zero `ttl` means entries never expire.
    pub fn with_capacity(capacity: usize, ttl: Duration) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        ExpiringMap {
            slots,
            ttl,
        }
    }

    /// Create a map whose slot array occupies at most `budget` bytes.
    pub fn with_budget(budget: usize, ttl: Duration) -> Self {
        let slot_size = mem::size_of::<Option<Entry<K, V>>>().max(1);
        Self::with_capacity(budget / slot_size, ttl)
    }

    /// The number of slots, live or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Insert or refresh the entry for `key`.
    ///
    /// An existing entry with the same key is overwritten, expired or not. Otherwise the first
    /// empty slot is claimed and, failing that, the first expired one.
    pub fn set(&mut self, key: K, value: V, now: Instant) -> Result<(), Error> {
        let ttl = self.ttl;
        let existing = self.slots.iter()
            .position(|slot| matches!(slot, Some(entry) if entry.key == key));
        let index = existing
            .or_else(|| self.slots.iter().position(Option::is_none))
            .or_else(|| self.slots.iter().position(|slot| match slot {
                Some(entry) => !entry.is_alive(ttl, now),
                None => false,
            }))
            .ok_or(Error::TableFull)?;

        self.slots[index] = Some(Entry { key, value, stamp: now });
        Ok(())
    }

    /// Look up the live value for `key`.
    pub fn get(&self, key: &K, now: Instant) -> Option<&V> {
        self.find(key)
            .and_then(|index| self.slots[index].as_ref())
            .filter(|entry| entry.is_alive(self.ttl, now))
            .map(|entry| &entry.value)
    }

    /// Look up the live value for `key`, mutably.
    pub fn get_mut(&mut self, key: &K, now: Instant) -> Option<&mut V> {
        let ttl = self.ttl;
        let index = self.find(key)?;
        self.slots[index].as_mut()
            .filter(|entry| entry.is_alive(ttl, now))
            .map(|entry| &mut entry.value)
    }

    /// Check if a live entry for `key` exists.
    pub fn contains_key(&self, key: &K, now: Instant) -> bool {
        self.get(key, now).is_some()
    }

    /// Remove the live entry for `key` and return its value.
    ///
    /// An expired entry stays in place and `None` is returned.
    pub fn take(&mut self, key: &K, now: Instant) -> Option<V> {
        let index = self.find(key)?;
        match &self.slots[index] {
            Some(entry) if entry.is_alive(self.ttl, now) => (),
            _ => return None,
        }
        self.slots[index].take().map(|entry| entry.value)
    }

    /// Free the slot of `key`, whether it expired or not.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.find(key)?;
        self.slots[index].take().map(|entry| entry.value)
    }

    /// Count the live entries.
    pub fn len(&self, now: Instant) -> usize {
        self.iter(now).count()
    }

    /// Check if no live entries remain.
    pub fn is_empty(&self, now: Instant) -> bool {
        self.iter(now).next().is_none()
    }

    /// Iterate over all live entries as `(key, value, stamp)`, in slot order.
    pub fn iter(&self, now: Instant) -> Iter<'_, K, V> {
        Iter {
            inner: self.slots.iter(),
            ttl: self.ttl,
            now,
        }
    }

    fn find(&self, key: &K) -> Option<usize> {
        self.slots.iter()
            .position(|slot| matches!(slot, Some(entry) if entry.key == *key))
    }
}

impl<K, V> Entry<K, V> {
    fn is_alive(&self, ttl: Duration, now: Instant) -> bool {
        Expiration::after(self.stamp, ttl).is_alive_at(now)
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V, Instant);

    fn next(&mut self) -> Option<Self::Item> {
        let (ttl, now) = (self.ttl, self.now);
        self.inner
            .by_ref()
            .filter_map(Option::as_ref)
            .find(|entry| entry.is_alive(ttl, now))
            .map(|entry| (&entry.key, &entry.value, entry.stamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(millis: i64) -> Instant {
        Instant::from_millis(millis)
    }

    #[test]
    fn set_then_get() {
        let mut map = ExpiringMap::with_capacity(4, Duration::from_secs(1));
        map.set(1u16, "one", at(0)).unwrap();
        map.set(2u16, "two", at(0)).unwrap();
        assert_eq!(map.get(&1, at(0)), Some(&"one"));
        assert_eq!(map.get(&2, at(999)), Some(&"two"));
        assert_eq!(map.get(&3, at(0)), None);
    }

    #[test]
    fn expires_lazily() {
        let mut map = ExpiringMap::with_capacity(1, Duration::from_secs(1));
        map.set(7u8, 70u32, at(1000)).unwrap();
        assert!(map.contains_key(&7, at(1999)));
        assert!(!map.contains_key(&7, at(2000)));
        assert_eq!(map.len(at(2000)), 0);

        // The slot is still physically taken, only a lookup-time view changed.
        assert_eq!(map.remove(&7), Some(70));
    }

    #[test]
    fn zero_ttl_never_expires() {
        let mut map = ExpiringMap::with_capacity(1, Duration::from_secs(0));
        map.set(80u16, (), at(0)).unwrap();
        assert!(map.contains_key(&80, at(i64::max_value() / 2)));
    }

    #[test]
    fn refresh_existing() {
        let mut map = ExpiringMap::with_capacity(2, Duration::from_secs(1));
        map.set(1u8, 'a', at(0)).unwrap();
        map.set(1u8, 'b', at(900)).unwrap();
        assert_eq!(map.get(&1, at(1500)), Some(&'b'));
        assert_eq!(map.len(at(1500)), 1);
    }

    #[test]
    fn full_table() {
        let mut map = ExpiringMap::with_capacity(2, Duration::from_secs(10));
        map.set(1u8, (), at(0)).unwrap();
        map.set(2u8, (), at(0)).unwrap();
        assert_eq!(map.set(3u8, (), at(5_000)), Err(Error::TableFull));
        // Refreshing a present key never needs a new slot.
        map.set(2u8, (), at(5_000)).unwrap();
    }

    #[test]
    fn reuses_expired_slot() {
        let mut map = ExpiringMap::with_capacity(2, Duration::from_secs(1));
        map.set(1u8, 10, at(0)).unwrap();
        map.set(2u8, 20, at(500)).unwrap();
        map.set(3u8, 30, at(1200)).unwrap();
        assert_eq!(map.get(&3, at(1200)), Some(&30));
        assert_eq!(map.get(&2, at(1200)), Some(&20));
        assert_eq!(map.remove(&1), None);
    }

    #[test]
    fn take_only_live() {
        let mut map = ExpiringMap::with_capacity(1, Duration::from_secs(1));
        map.set(1u8, 10, at(0)).unwrap();
        assert_eq!(map.take(&1, at(1000)), None);
        map.set(1u8, 11, at(1000)).unwrap();
        assert_eq!(map.take(&1, at(1500)), Some(11));
        assert_eq!(map.take(&1, at(1500)), None);
    }

    #[test]
    fn iterate_live() {
        let mut map = ExpiringMap::with_capacity(4, Duration::from_secs(1));
        map.set(1u8, 'x', at(0)).unwrap();
        map.set(2u8, 'y', at(800)).unwrap();
        map.set(3u8, 'z', at(900)).unwrap();
        map.remove(&3);

        let mut live: Vec<_> = map.iter(at(1100))
            .map(|(key, value, stamp)| (*key, *value, stamp))
            .collect();
        live.sort();
        assert_eq!(live, vec![(2, 'y', at(800))]);
    }

    #[test]
    fn budget_capacity() {
        let map: ExpiringMap<u32, u64> = ExpiringMap::with_budget(1024, Duration::from_secs(1));
        let slot = mem::size_of::<Option<Entry<u32, u64>>>();
        assert_eq!(map.capacity(), 1024 / slot);
        assert!(map.is_empty(at(0)));
    }
}
