//! Node arenas with stable keys.
//!
//! A [`Storage`] owns node values and hands out a [`Key`] per value. Keys
//! stay valid until the value is removed, so a chain can link nodes by key
//! instead of by pointer.
//!
//! Three flavors are provided:
//!
//! | Storage | Capacity | Residency |
//! |---------|----------|-----------|
//! | `slab::Slab<T>` | Growable | Owned by the vector (default) |
//! | [`BoxedStorage<T>`] | Fixed at construction | Owned by the vector |
//! | `&mut S` for any of the above | Whatever `S` has | Borrowed from the caller |

use crate::Key;

/// Arena with stable keys.
///
/// # Requirements
///
/// - **Stable keys**: a key addresses the same value until it is removed
/// - **O(1)** insert, remove and lookup
/// - **Slot reuse**: removed slots may be handed out again
pub trait Storage<T> {
    /// Handle type for stored values.
    type Key: Key;

    /// Inserts a value, returning its key.
    ///
    /// # Errors
    ///
    /// Returns `Err(Full(value))` if the storage has no room left. Growable
    /// storages never fail.
    fn try_insert(&mut self, value: T) -> Result<Self::Key, Full<T>>;

    /// Removes and returns the value at `key`, if present.
    fn remove(&mut self, key: Self::Key) -> Option<T>;

    /// Returns a reference to the value at `key`, if present.
    fn get(&self, key: Self::Key) -> Option<&T>;

    /// Returns a mutable reference to the value at `key`, if present.
    fn get_mut(&mut self, key: Self::Key) -> Option<&mut T>;

    /// Returns the number of stored values.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is stored.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Error returned when fixed-capacity storage is full.
///
/// Carries back the value that could not be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Returns the value that could not be inserted.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> core::fmt::Display for Full<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "storage is full")
    }
}

impl<T: core::fmt::Debug> std::error::Error for Full<T> {}

// =============================================================================
// BoxedStorage - fixed capacity, single boxed slice, intrusive free list
// =============================================================================

#[derive(Debug)]
enum Slot<T, K> {
    Occupied(T),
    Vacant { next_free: K },
}

/// Fixed-capacity storage with runtime-determined size.
///
/// One boxed slice of slots allocated up front. Vacant slots form a LIFO
/// free list threaded through the slice, so the most recently freed slot is
/// reused first and inserts never allocate.
///
/// # Example
///
/// ```
/// use nexus_vector::{BoxedStorage, Storage};
///
/// let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(2);
/// let a = storage.try_insert(1).unwrap();
/// let _b = storage.try_insert(2).unwrap();
///
/// assert!(storage.is_full());
/// assert_eq!(storage.try_insert(3).unwrap_err().into_inner(), 3);
///
/// assert_eq!(storage.remove(a), Some(1));
/// assert!(storage.try_insert(4).is_ok());
/// ```
#[derive(Debug)]
pub struct BoxedStorage<T, K: Key = u32> {
    slots: Box<[Slot<T, K>]>,
    free_head: K,
    len: usize,
}

impl<T, K: Key> BoxedStorage<T, K> {
    /// Creates storage with exactly `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0 or does not fit below the key's sentinel.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        assert!(
            capacity < K::NONE.as_usize(),
            "capacity exceeds key type maximum"
        );

        let slots = (0..capacity)
            .map(|i| Slot::Vacant {
                next_free: if i + 1 < capacity {
                    K::from_usize(i + 1)
                } else {
                    K::NONE
                },
            })
            .collect();

        Self {
            slots,
            free_head: K::from_usize(0),
            len: 0,
        }
    }

    /// Returns the capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if all slots are occupied.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.free_head.is_none()
    }
}

impl<T, K: Key> Storage<T> for BoxedStorage<T, K> {
    type Key = K;

    fn try_insert(&mut self, value: T) -> Result<K, Full<T>> {
        let key = self.free_head;
        let Some(slot) = key.get().map(|k| &mut self.slots[k.as_usize()]) else {
            return Err(Full(value));
        };

        let Slot::Vacant { next_free } = *slot else {
            unreachable!("free list points at an occupied slot");
        };
        *slot = Slot::Occupied(value);
        self.free_head = next_free;
        self.len += 1;

        Ok(key)
    }

    fn remove(&mut self, key: K) -> Option<T> {
        let slot = self.slots.get_mut(key.as_usize())?;
        if !matches!(slot, Slot::Occupied(_)) {
            return None;
        }

        let Slot::Occupied(value) = core::mem::replace(
            slot,
            Slot::Vacant {
                next_free: self.free_head,
            },
        ) else {
            unreachable!();
        };
        self.free_head = key;
        self.len -= 1;

        Some(value)
    }

    #[inline]
    fn get(&self, key: K) -> Option<&T> {
        match self.slots.get(key.as_usize())? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    #[inline]
    fn get_mut(&mut self, key: K) -> Option<&mut T> {
        match self.slots.get_mut(key.as_usize())? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }
}

// =============================================================================
// slab::Slab - growable
// =============================================================================

impl<T> Storage<T> for slab::Slab<T> {
    type Key = usize;

    #[inline]
    fn try_insert(&mut self, value: T) -> Result<usize, Full<T>> {
        Ok(self.insert(value))
    }

    #[inline]
    fn remove(&mut self, key: usize) -> Option<T> {
        self.try_remove(key)
    }

    #[inline]
    fn get(&self, key: usize) -> Option<&T> {
        slab::Slab::get(self, key)
    }

    #[inline]
    fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        slab::Slab::get_mut(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        slab::Slab::len(self)
    }
}

// =============================================================================
// Borrowed storage
// =============================================================================

impl<T, S: Storage<T> + ?Sized> Storage<T> for &mut S {
    type Key = S::Key;

    #[inline]
    fn try_insert(&mut self, value: T) -> Result<Self::Key, Full<T>> {
        (**self).try_insert(value)
    }

    #[inline]
    fn remove(&mut self, key: Self::Key) -> Option<T> {
        (**self).remove(key)
    }

    #[inline]
    fn get(&self, key: Self::Key) -> Option<&T> {
        (**self).get(key)
    }

    #[inline]
    fn get_mut(&mut self, key: Self::Key) -> Option<&mut T> {
        (**self).get_mut(key)
    }

    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty() {
        let storage: BoxedStorage<u64> = BoxedStorage::with_capacity(16);
        assert!(storage.is_empty());
        assert!(!storage.is_full());
        assert_eq!(storage.len(), 0);
        assert_eq!(storage.capacity(), 16);
    }

    #[test]
    fn insert_get_remove() {
        let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(16);

        let key = storage.try_insert(42).unwrap();
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get(key), Some(&42));

        *storage.get_mut(key).unwrap() = 43;
        assert_eq!(storage.remove(key), Some(43));
        assert_eq!(storage.get(key), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn fill_to_capacity() {
        let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(3);

        let keys: Vec<_> = (0..3).map(|i| storage.try_insert(i).unwrap()).collect();
        assert!(storage.is_full());

        let err = storage.try_insert(99).unwrap_err();
        assert_eq!(err.into_inner(), 99);

        for (i, key) in keys.into_iter().enumerate() {
            assert_eq!(storage.get(key), Some(&(i as u64)));
        }
    }

    #[test]
    fn freed_slot_is_reused_first() {
        let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(4);

        let k0 = storage.try_insert(0).unwrap();
        let _k1 = storage.try_insert(1).unwrap();
        storage.remove(k0);

        assert_eq!(storage.try_insert(2).unwrap(), k0);
    }

    #[test]
    fn double_remove_and_out_of_bounds() {
        let mut storage: BoxedStorage<u64, u16> = BoxedStorage::with_capacity(2);

        let key = storage.try_insert(1).unwrap();
        assert_eq!(storage.remove(key), Some(1));
        assert_eq!(storage.remove(key), None);
        assert_eq!(storage.get(500), None);
        assert_eq!(storage.remove(500), None);
        assert_eq!(storage.len(), 0);
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn zero_capacity_panics() {
        let _storage: BoxedStorage<u64> = BoxedStorage::with_capacity(0);
    }

    #[test]
    fn drop_releases_values() {
        use std::rc::Rc;

        let tracker = Rc::new(());
        {
            let mut storage: BoxedStorage<Rc<()>> = BoxedStorage::with_capacity(8);
            storage.try_insert(Rc::clone(&tracker)).unwrap();
            storage.try_insert(Rc::clone(&tracker)).unwrap();
            assert_eq!(Rc::strong_count(&tracker), 3);
        }
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn slab_never_full() {
        let mut storage = slab::Slab::with_capacity(1);
        for i in 0..64u64 {
            Storage::try_insert(&mut storage, i).unwrap();
        }
        assert_eq!(Storage::len(&storage), 64);
        assert_eq!(Storage::remove(&mut storage, 3), Some(3));
        assert_eq!(Storage::remove(&mut storage, 3), None);
    }

    #[test]
    fn borrowed_storage_forwards() {
        fn insert_through<S: Storage<u64>>(mut storage: S, value: u64) -> S::Key {
            storage.try_insert(value).unwrap()
        }

        let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(2);
        let key = insert_through(&mut storage, 5);

        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get(key), Some(&5));
    }
}
