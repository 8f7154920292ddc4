//! Chain links.

use crate::{Key, Lifecycle, Storage, VectorError};

/// One link of a vector's chain.
///
/// Wraps an element owned by the chain together with the keys of its
/// neighbors. Users reach the element through the vector's accessors; the
/// node itself only shows up in storage type signatures.
#[derive(Debug)]
pub struct Node<T, K: Key> {
    pub(crate) data: T,
    pub(crate) prev: K,
    pub(crate) next: K,
}

impl<T, K: Key> Node<T, K> {
    /// Creates a node holding the lifecycle's copy of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::AllocationFailure`] if the cloner fails.
    #[inline]
    pub fn create<H: Lifecycle<T>>(
        data: &T,
        prev: K,
        next: K,
        hooks: &H,
    ) -> Result<Self, VectorError> {
        let data = hooks
            .clone_element(data)
            .ok_or(VectorError::AllocationFailure)?;
        Ok(Self { data, prev, next })
    }

    /// Releases the element through the destroyer, then the node.
    #[inline]
    pub fn destroy<H: Lifecycle<T>>(self, hooks: &H) {
        hooks.destroy_element(self.data);
    }

    /// Returns the element.
    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Key of the previous node, `None` at the head.
    #[inline]
    pub fn prev(&self) -> Option<K> {
        self.prev.get()
    }

    /// Key of the next node, `None` at the tail.
    #[inline]
    pub fn next(&self) -> Option<K> {
        self.next.get()
    }

    /// Creates an unlinked node for `data` and places it in `storage`.
    ///
    /// A clone that does not fit is handed back to the destroyer, so nothing
    /// leaks on either failure path.
    pub(crate) fn spawn<S, H>(storage: &mut S, data: &T, hooks: &H) -> Result<K, VectorError>
    where
        S: Storage<Self, Key = K>,
        H: Lifecycle<T>,
    {
        let node = Self::create(data, K::NONE, K::NONE, hooks).inspect_err(|_| {
            tracing::trace!("cloner failed to produce an element");
        })?;

        storage.try_insert(node).map_err(|full| {
            tracing::trace!(stored = storage.len(), "node storage is full");
            full.into_inner().destroy(hooks);
            VectorError::AllocationFailure
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoxedStorage, ByClone, Hooks};
    use std::cell::Cell;

    #[test]
    fn create_clones_through_hooks() {
        let hooks = Hooks::with_cloner(|v: &u32| Some(v + 1));
        let node: Node<u32, u32> = Node::create(&1, u32::NONE, 4, &hooks).unwrap();

        assert_eq!(*node.data(), 2);
        assert_eq!(node.prev(), None);
        assert_eq!(node.next(), Some(4));
    }

    #[test]
    fn create_reports_cloner_failure() {
        let hooks = Hooks::with_cloner(|_: &u32| None);
        let result: Result<Node<u32, u32>, _> = Node::create(&1, u32::NONE, u32::NONE, &hooks);
        assert_eq!(result.unwrap_err(), VectorError::AllocationFailure);
    }

    #[test]
    fn destroy_runs_destroyer() {
        let released = Cell::new(0u32);
        let hooks = Hooks::new(|v: &u32| Some(*v), |v: u32| released.set(released.get() + v));

        let node: Node<u32, u32> = Node::create(&7, u32::NONE, u32::NONE, &hooks).unwrap();
        node.destroy(&hooks);

        assert_eq!(released.get(), 7);
    }

    #[test]
    fn spawn_into_full_storage_releases_clone() {
        let released = Cell::new(0);
        let hooks = Hooks::new(|v: &u32| Some(*v), |_: u32| released.set(released.get() + 1));
        let mut storage: BoxedStorage<Node<u32, u32>> = BoxedStorage::with_capacity(1);

        let key = Node::spawn(&mut storage, &1, &hooks).unwrap();
        assert_eq!(storage.get(key).map(Node::data), Some(&1));

        let err = Node::spawn(&mut storage, &2, &hooks).unwrap_err();
        assert_eq!(err, VectorError::AllocationFailure);
        assert_eq!(released.get(), 1);
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn spawn_is_unlinked() {
        let mut storage = slab::Slab::new();
        let key = Node::spawn(&mut storage, &"x", &ByClone).unwrap();
        let node: &Node<&str, usize> = &storage[key];

        assert!(node.prev().is_none());
        assert!(node.next().is_none());
    }
}
