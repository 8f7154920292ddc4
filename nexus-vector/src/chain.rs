//! Link bookkeeping for a vector's nodes.
//!
//! A [`Chain`] only tracks head, tail and length. The nodes themselves live
//! in a [`Storage`] passed to every call, which must be the same storage
//! instance for the whole life of the chain.

use std::marker::PhantomData;

use crate::{Key, Lifecycle, Node, Storage, VectorError};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Chain<K: Key> {
    head: K,
    tail: K,
    len: usize,
}

/// Returns the node behind a key the chain handed out.
///
/// # Panics
///
/// Panics if the key is not in storage, which means the chain was used with
/// a different storage instance.
#[inline]
fn node<T, S, K>(storage: &S, key: K) -> &Node<T, K>
where
    S: Storage<Node<T, K>, Key = K> + ?Sized,
    K: Key,
{
    storage.get(key).expect("chain key missing from storage")
}

#[inline]
fn node_mut<T, S, K>(storage: &mut S, key: K) -> &mut Node<T, K>
where
    S: Storage<Node<T, K>, Key = K> + ?Sized,
    K: Key,
{
    storage.get_mut(key).expect("chain key missing from storage")
}

impl<K: Key> Chain<K> {
    pub(crate) const fn new() -> Self {
        Self {
            head: K::NONE,
            tail: K::NONE,
            len: 0,
        }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn head(&self) -> Option<K> {
        self.head.get()
    }

    #[inline]
    pub(crate) fn tail(&self) -> Option<K> {
        self.tail.get()
    }

    // ========================================================================
    // Linking (no alloc/dealloc)
    // ========================================================================

    /// Links an unlinked node at the back.
    pub(crate) fn link_back<T, S>(&mut self, storage: &mut S, key: K)
    where
        S: Storage<Node<T, K>, Key = K> + ?Sized,
    {
        let node = node_mut(storage, key);
        node.prev = self.tail;
        node.next = K::NONE;

        if self.tail.is_some() {
            node_mut(storage, self.tail).next = key;
        } else {
            self.head = key;
        }

        self.tail = key;
        self.len += 1;
    }

    /// Links an unlinked node at the front.
    pub(crate) fn link_front<T, S>(&mut self, storage: &mut S, key: K)
    where
        S: Storage<Node<T, K>, Key = K> + ?Sized,
    {
        let node = node_mut(storage, key);
        node.next = self.head;
        node.prev = K::NONE;

        if self.head.is_some() {
            node_mut(storage, self.head).prev = key;
        } else {
            self.tail = key;
        }

        self.head = key;
        self.len += 1;
    }

    /// Links an unlinked node immediately before `before`.
    pub(crate) fn link_before<T, S>(&mut self, storage: &mut S, before: K, key: K)
    where
        S: Storage<Node<T, K>, Key = K> + ?Sized,
    {
        let prev = node(storage, before).prev;
        let node = node_mut(storage, key);
        node.next = before;
        node.prev = prev;

        node_mut(storage, before).prev = key;

        if prev.is_some() {
            node_mut(storage, prev).next = key;
        } else {
            self.head = key;
        }

        self.len += 1;
    }

    /// Unlinks a node of this chain, leaving it in storage.
    pub(crate) fn unlink<T, S>(&mut self, storage: &mut S, key: K)
    where
        S: Storage<Node<T, K>, Key = K> + ?Sized,
    {
        let node = node_mut(storage, key);
        let prev = core::mem::replace(&mut node.prev, K::NONE);
        let next = core::mem::replace(&mut node.next, K::NONE);

        if prev.is_some() {
            node_mut(storage, prev).next = next;
        } else {
            self.head = next;
        }

        if next.is_some() {
            node_mut(storage, next).prev = prev;
        } else {
            self.tail = prev;
        }

        self.len -= 1;
    }

    /// Moves every node of `other` to the end of this chain. O(1).
    ///
    /// Both chains must live in the same storage. `other` is empty afterwards.
    pub(crate) fn append<T, S>(&mut self, storage: &mut S, other: &mut Self)
    where
        S: Storage<Node<T, K>, Key = K> + ?Sized,
    {
        if other.len == 0 {
            return;
        }

        if self.len == 0 {
            *self = *other;
        } else {
            node_mut(storage, self.tail).next = other.head;
            node_mut(storage, other.head).prev = self.tail;
            self.tail = other.tail;
            self.len += other.len;
        }

        *other = Self::new();
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Key of the node at position `index`, walking from the nearer end.
    pub(crate) fn key_at<T, S>(&self, storage: &S, index: usize) -> Option<K>
    where
        S: Storage<Node<T, K>, Key = K> + ?Sized,
    {
        if index >= self.len {
            return None;
        }

        let key = if index <= self.len / 2 {
            (0..index).fold(self.head, |key, _| node(storage, key).next)
        } else {
            (index + 1..self.len).fold(self.tail, |key, _| node(storage, key).prev)
        };
        Some(key)
    }

    pub(crate) fn iter<'a, T, S>(&self, storage: &'a S) -> Iter<'a, T, S, K>
    where
        S: Storage<Node<T, K>, Key = K>,
    {
        Iter {
            storage,
            front: self.head,
            back: self.tail,
            remaining: self.len,
            _marker: PhantomData,
        }
    }

    /// Applies `f` to every element, head to tail.
    pub(crate) fn for_each_mut<T, S, F>(&self, storage: &mut S, mut f: F)
    where
        S: Storage<Node<T, K>, Key = K> + ?Sized,
        F: FnMut(&mut T),
    {
        let mut key = self.head;
        while key.is_some() {
            let node = node_mut(storage, key);
            f(&mut node.data);
            key = node.next;
        }
    }

    /// Reverses the chain in place by swapping every node's links.
    pub(crate) fn reverse<T, S>(&mut self, storage: &mut S)
    where
        S: Storage<Node<T, K>, Key = K> + ?Sized,
    {
        let mut key = self.head;
        while key.is_some() {
            let node = node_mut(storage, key);
            core::mem::swap(&mut node.prev, &mut node.next);
            // Former next.
            key = node.prev;
        }

        core::mem::swap(&mut self.head, &mut self.tail);
    }

    /// Destroys every node through `hooks` and resets to empty.
    ///
    /// Returns the number of released elements.
    pub(crate) fn clear<T, S, H>(&mut self, storage: &mut S, hooks: &H) -> usize
    where
        S: Storage<Node<T, K>, Key = K> + ?Sized,
        H: Lifecycle<T>,
    {
        let released = self.len;
        let mut key = self.head;
        while key.is_some() {
            let node = storage.remove(key).expect("chain key missing from storage");
            key = node.next;
            node.destroy(hooks);
        }

        *self = Self::new();
        released
    }

    /// Verifies the link invariants against storage.
    pub(crate) fn check<T, S>(&self, storage: &S) -> Result<(), VectorError>
    where
        S: Storage<Node<T, K>, Key = K> + ?Sized,
    {
        let corrupt = |key: K| VectorError::CorruptChain {
            slot: key.as_usize(),
        };

        if (self.len == 0) != self.head.is_none() || (self.len == 0) != self.tail.is_none() {
            return Err(corrupt(self.head));
        }

        let mut prev = K::NONE;
        let mut key = self.head;
        let mut seen = 0;
        while key.is_some() {
            // A cycle or a stale length both overrun the count.
            if seen == self.len {
                return Err(corrupt(key));
            }
            let node = storage.get(key).ok_or_else(|| corrupt(key))?;
            if node.prev != prev {
                return Err(corrupt(key));
            }
            prev = key;
            key = node.next;
            seen += 1;
        }

        if seen != self.len || prev != self.tail {
            return Err(corrupt(prev));
        }
        Ok(())
    }
}

// =============================================================================
// Iterator
// =============================================================================

/// Iterator over references to a vector's elements.
pub struct Iter<'a, T, S, K: Key> {
    storage: &'a S,
    front: K,
    back: K,
    remaining: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T: 'a, S, K: Key + 'a> Iterator for Iter<'a, T, S, K>
where
    S: Storage<Node<T, K>, Key = K>,
{
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let storage: &'a S = self.storage;
        let node = node(storage, self.front);
        self.front = node.next;
        self.remaining -= 1;

        Some(&node.data)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: 'a, S, K: Key + 'a> DoubleEndedIterator for Iter<'a, T, S, K>
where
    S: Storage<Node<T, K>, Key = K>,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let storage: &'a S = self.storage;
        let node = node(storage, self.back);
        self.back = node.prev;
        self.remaining -= 1;

        Some(&node.data)
    }
}

impl<'a, T: 'a, S, K: Key + 'a> ExactSizeIterator for Iter<'a, T, S, K> where
    S: Storage<Node<T, K>, Key = K>
{
}

impl<T, S, K: Key> core::fmt::Debug for Iter<'_, T, S, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoxedStorage, ByClone};

    type Nodes = BoxedStorage<Node<u64, u32>>;

    fn build(storage: &mut Nodes, values: &[u64]) -> Chain<u32> {
        let mut chain = Chain::new();
        for value in values {
            let key = Node::spawn(storage, value, &ByClone).unwrap();
            chain.link_back(storage, key);
        }
        chain
    }

    fn values(chain: &Chain<u32>, storage: &Nodes) -> Vec<u64> {
        chain.iter(storage).copied().collect()
    }

    #[test]
    fn new_chain_is_empty() {
        let storage = Nodes::with_capacity(4);
        let chain: Chain<u32> = Chain::new();

        assert_eq!(chain.len(), 0);
        assert!(chain.head().is_none());
        assert!(chain.tail().is_none());
        assert!(chain.check(&storage).is_ok());
    }

    #[test]
    fn link_front_and_back() {
        let mut storage = Nodes::with_capacity(8);
        let mut chain = build(&mut storage, &[2, 3]);

        let key = Node::spawn(&mut storage, &1, &ByClone).unwrap();
        chain.link_front(&mut storage, key);

        assert_eq!(values(&chain, &storage), vec![1, 2, 3]);
        assert_eq!(chain.head(), Some(key));
        assert!(chain.check(&storage).is_ok());
    }

    #[test]
    fn link_before_middle_and_head() {
        let mut storage = Nodes::with_capacity(8);
        let mut chain = build(&mut storage, &[1, 3]);

        let three = chain.key_at(&storage, 1).unwrap();
        let two = Node::spawn(&mut storage, &2, &ByClone).unwrap();
        chain.link_before(&mut storage, three, two);

        let one = chain.head().unwrap();
        let zero = Node::spawn(&mut storage, &0, &ByClone).unwrap();
        chain.link_before(&mut storage, one, zero);

        assert_eq!(values(&chain, &storage), vec![0, 1, 2, 3]);
        assert_eq!(chain.head(), Some(zero));
        assert!(chain.check(&storage).is_ok());
    }

    #[test]
    fn unlink_head_middle_tail() {
        let mut storage = Nodes::with_capacity(8);
        let mut chain = build(&mut storage, &[1, 2, 3, 4]);

        let middle = chain.key_at(&storage, 1).unwrap();
        chain.unlink(&mut storage, middle);
        assert_eq!(values(&chain, &storage), vec![1, 3, 4]);

        let head = chain.head().unwrap();
        chain.unlink(&mut storage, head);
        let tail = chain.tail().unwrap();
        chain.unlink(&mut storage, tail);

        assert_eq!(values(&chain, &storage), vec![3]);
        assert_eq!(chain.head(), chain.tail());
        assert!(chain.check(&storage).is_ok());
    }

    #[test]
    fn key_at_walks_from_both_ends() {
        let mut storage = Nodes::with_capacity(16);
        let chain = build(&mut storage, &[10, 11, 12, 13, 14, 15, 16]);

        for index in 0..7 {
            let key = chain.key_at(&storage, index).unwrap();
            assert_eq!(storage.get(key).unwrap().data, 10 + index as u64);
        }
        assert!(chain.key_at(&storage, 7).is_none());
    }

    #[test]
    fn append_splices_and_empties_other() {
        let mut storage = Nodes::with_capacity(8);
        let mut a = build(&mut storage, &[1, 2]);
        let mut b = build(&mut storage, &[3, 4]);

        a.append(&mut storage, &mut b);

        assert_eq!(values(&a, &storage), vec![1, 2, 3, 4]);
        assert_eq!(b.len(), 0);
        assert!(a.check(&storage).is_ok());
    }

    #[test]
    fn append_onto_empty() {
        let mut storage = Nodes::with_capacity(8);
        let mut a: Chain<u32> = Chain::new();
        let mut b = build(&mut storage, &[5, 6]);

        a.append(&mut storage, &mut b);

        assert_eq!(values(&a, &storage), vec![5, 6]);
        assert!(a.check(&storage).is_ok());
    }

    #[test]
    fn reverse_twice_is_identity() {
        let mut storage = Nodes::with_capacity(8);
        let mut chain = build(&mut storage, &[1, 2, 3]);

        chain.reverse(&mut storage);
        assert_eq!(values(&chain, &storage), vec![3, 2, 1]);
        assert!(chain.check(&storage).is_ok());

        chain.reverse(&mut storage);
        assert_eq!(values(&chain, &storage), vec![1, 2, 3]);
    }

    #[test]
    fn iter_double_ended() {
        let mut storage = Nodes::with_capacity(8);
        let chain = build(&mut storage, &[1, 2, 3, 4]);

        let mut iter = chain.iter(&storage);
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next_back(), Some(&3));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn clear_releases_storage() {
        let mut storage = Nodes::with_capacity(8);
        let mut chain = build(&mut storage, &[1, 2, 3]);

        assert_eq!(chain.clear(&mut storage, &ByClone), 3);
        assert_eq!(chain.len(), 0);
        assert!(storage.is_empty());
    }

    #[test]
    fn check_detects_stale_length() {
        let mut storage = Nodes::with_capacity(8);
        let mut chain = build(&mut storage, &[1, 2]);
        chain.len = 3;

        assert!(matches!(
            chain.check(&storage),
            Err(VectorError::CorruptChain { .. })
        ));
    }

    #[test]
    fn check_detects_broken_back_link() {
        let mut storage = Nodes::with_capacity(8);
        let chain = build(&mut storage, &[1, 2, 3]);

        let tail = chain.tail().unwrap();
        storage.get_mut(tail).unwrap().prev = u32::NONE;

        assert_eq!(
            chain.check(&storage),
            Err(VectorError::CorruptChain {
                slot: tail.as_usize()
            })
        );
    }
}
