//! Sequence container over a node chain.
//!
//! A [`Vector`] pairs a chain of [`Node`]s with the storage holding them and
//! the [`Lifecycle`] hooks governing its elements.
//!
//! # Residency
//!
//! The storage parameter decides who owns the node memory:
//!
//! - **Heap-resident**: the vector owns its storage (`slab::Slab` by default,
//!   or a fixed-capacity [`BoxedStorage`]). Dropping the vector releases
//!   every element and the storage.
//! - **In-place**: the vector borrows caller-provided storage
//!   ([`Vector::in_place`]). Dropping the vector releases its elements; the
//!   storage outlives it and can be reused.
//!
//! ```
//! use nexus_vector::{ByClone, SlabNodes, Vector};
//!
//! let mut nodes: SlabNodes<u32> = SlabNodes::new();
//! {
//!     let mut v = Vector::in_place(&mut nodes, ByClone);
//!     v.append(&10).unwrap();
//!     v.prepend(&20).unwrap();
//!     v.append(&30).unwrap();
//!     assert_eq!(v.iter().copied().collect::<Vec<_>>(), [20, 10, 30]);
//!
//!     v.remove(0).unwrap();
//!     assert_eq!(v.at(0), Ok(&10));
//! }
//! // Elements are gone, the storage is still ours.
//! assert!(nodes.is_empty());
//! ```
//!
//! # Indexing
//!
//! Positional operations (`insert`, `remove`, `at`) walk the chain from the
//! nearer end, so they are O(n). `append`, `prepend`, `pop_front` and
//! `pop_back` are O(1).

use std::io;
use std::marker::PhantomData;

use crate::chain::{Chain, Iter};
use crate::{BoxedStorage, ByClone, Key, Lifecycle, Node, Storage, VectorError};

/// Growable node storage, the default for heap-resident vectors.
pub type SlabNodes<T> = slab::Slab<Node<T, usize>>;

/// Fixed-capacity node storage.
pub type BoxedNodes<T, K = u32> = BoxedStorage<Node<T, K>, K>;

/// Heap-resident vector over growable storage.
///
/// [`copy`](Vector::copy), [`map`](Vector::map) and
/// [`filter`](Vector::filter) produce this type.
pub type HeapVector<T, H = ByClone> = Vector<T, SlabNodes<T>, H, usize>;

/// Heap-resident vector over fixed-capacity storage.
pub type BoxedVector<T, H = ByClone> = Vector<T, BoxedNodes<T>, H, u32>;

/// Vector over caller-provided growable storage.
pub type InPlaceVector<'a, T, H = ByClone> = Vector<T, &'a mut SlabNodes<T>, H, usize>;

/// A doubly-linked sequence container.
///
/// # Type Parameters
///
/// - `T`: Element type
/// - `S`: Node storage, owned or `&mut` borrowed (default [`SlabNodes<T>`])
/// - `H`: Element lifecycle (default [`ByClone`])
/// - `K`: Node key type, fixed by the storage (default `usize`)
///
/// # Example
///
/// ```
/// use nexus_vector::{HeapVector, Vector};
///
/// let mut v: HeapVector<u32> = Vector::new();
/// for x in [1, 2, 3, 4] {
///     v.append(&x).unwrap();
/// }
///
/// let evens = v.filter(|x| x % 2 == 0).unwrap();
/// let doubled = v.map(|x| *x *= 2).unwrap();
///
/// assert_eq!(evens.iter().copied().collect::<Vec<_>>(), [2, 4]);
/// assert_eq!(doubled.iter().copied().collect::<Vec<_>>(), [2, 4, 6, 8]);
/// assert_eq!(v.len(), 4);
/// ```
pub struct Vector<T, S = SlabNodes<T>, H = ByClone, K = usize>
where
    S: Storage<Node<T, K>, Key = K>,
    H: Lifecycle<T>,
    K: Key,
{
    storage: S,
    chain: Chain<K>,
    hooks: H,
    _marker: PhantomData<T>,
}

/// Result of [`Vector::reduce`].
///
/// Which variant comes back depends on the vector's lifecycle; see
/// [`Vector::reduce`].
#[derive(Debug, PartialEq, Eq)]
pub enum Reduced<'s, T> {
    /// The caller's seed, folded in place.
    Seed(&'s mut T),
    /// A clone of the seed, folded. The caller's seed is untouched.
    Owned(T),
}

impl<T> Reduced<'_, T> {
    /// Returns the accumulated value.
    pub fn value(&self) -> &T {
        match self {
            Reduced::Seed(seed) => seed,
            Reduced::Owned(value) => value,
        }
    }

    /// Returns `true` if the caller's seed was mutated.
    pub fn is_seed(&self) -> bool {
        matches!(self, Reduced::Seed(_))
    }
}

impl<T> core::ops::Deref for Reduced<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value()
    }
}

// =============================================================================
// Construction
// =============================================================================

impl<T: Clone> Vector<T> {
    /// Creates an empty heap-resident vector with `Clone` semantics.
    pub fn new() -> Self {
        Self::with_storage(SlabNodes::new(), ByClone)
    }

    /// Creates an empty heap-resident vector with room for `capacity`
    /// elements before the storage grows.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_storage(SlabNodes::with_capacity(capacity), ByClone)
    }
}

impl<T: Clone> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, H: Lifecycle<T>> Vector<T, SlabNodes<T>, H, usize> {
    /// Creates an empty heap-resident vector with custom hooks.
    pub fn with_hooks(hooks: H) -> Self {
        Self::with_storage(SlabNodes::new(), hooks)
    }
}

impl<'a, T, S, H, K> Vector<T, &'a mut S, H, K>
where
    S: Storage<Node<T, K>, Key = K>,
    H: Lifecycle<T>,
    K: Key,
{
    /// Creates an empty vector over caller-provided storage.
    ///
    /// The vector owns only the nodes it creates. Other values already in
    /// `storage` are left alone, so several in-place vectors can take turns
    /// on one storage.
    pub fn in_place(storage: &'a mut S, hooks: H) -> Self {
        Self::with_storage(storage, hooks)
    }
}

impl<T, S, H, K> Vector<T, S, H, K>
where
    S: Storage<Node<T, K>, Key = K>,
    H: Lifecycle<T>,
    K: Key,
{
    /// Creates an empty vector over `storage`.
    ///
    /// Use with an owned [`BoxedNodes`] for a fixed-capacity vector whose
    /// inserts fail with [`VectorError::AllocationFailure`] once full.
    ///
    /// ```
    /// use nexus_vector::{BoxedNodes, BoxedVector, ByClone, Vector, VectorError};
    ///
    /// let mut v: BoxedVector<u8> = Vector::with_storage(BoxedNodes::with_capacity(1), ByClone);
    /// v.append(&1).unwrap();
    /// assert_eq!(v.append(&2), Err(VectorError::AllocationFailure));
    /// assert_eq!(v.len(), 1);
    /// ```
    pub fn with_storage(storage: S, hooks: H) -> Self {
        Self {
            storage,
            chain: Chain::new(),
            hooks,
            _marker: PhantomData,
        }
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns `true` if there are no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chain.len() == 0
    }

    /// Returns the size in bytes of one element.
    #[inline]
    pub fn element_size(&self) -> usize {
        size_of::<T>()
    }

    /// Returns the lifecycle hooks.
    #[inline]
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Returns the node storage.
    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Appends a copy of `data` at the back. O(1).
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::AllocationFailure`] if the cloner fails or the
    /// storage is full. The vector is unchanged.
    #[inline]
    pub fn append(&mut self, data: &T) -> Result<(), VectorError> {
        let key = Node::spawn(&mut self.storage, data, &self.hooks)?;
        self.chain.link_back(&mut self.storage, key);
        Ok(())
    }

    /// Prepends a copy of `data` at the front. O(1).
    ///
    /// # Errors
    ///
    /// Same as [`append`](Self::append).
    #[inline]
    pub fn prepend(&mut self, data: &T) -> Result<(), VectorError> {
        let key = Node::spawn(&mut self.storage, data, &self.hooks)?;
        self.chain.link_front(&mut self.storage, key);
        Ok(())
    }

    /// Inserts a copy of `data` so that it ends up at position `index`.
    ///
    /// `index == 0` prepends, `index == len()` appends.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IndexOutOfRange`] if `index > len()`, or
    /// [`VectorError::AllocationFailure`] as for [`append`](Self::append).
    pub fn insert(&mut self, index: usize, data: &T) -> Result<(), VectorError> {
        let len = self.len();
        if index == 0 {
            return self.prepend(data);
        }
        if index == len {
            return self.append(data);
        }

        let before = self
            .chain
            .key_at(&self.storage, index)
            .ok_or(VectorError::IndexOutOfRange { index, len })?;
        let key = Node::spawn(&mut self.storage, data, &self.hooks)?;
        self.chain.link_before(&mut self.storage, before, key);
        Ok(())
    }

    /// Appends copies of every element of `iter`, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing element and returns its error. Elements
    /// appended before the failure stay.
    pub fn extend_from<'x, I>(&mut self, iter: I) -> Result<(), VectorError>
    where
        I: IntoIterator<Item = &'x T>,
        T: 'x,
    {
        iter.into_iter().try_for_each(|data| self.append(data))
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Removes the element at `index` and releases it through the destroyer.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IndexOutOfRange`] if `index >= len()`.
    pub fn remove(&mut self, index: usize) -> Result<(), VectorError> {
        let key = self.key_at(index)?;
        self.chain.unlink(&mut self.storage, key);
        self.storage
            .remove(key)
            .expect("chain key missing from storage")
            .destroy(&self.hooks);
        Ok(())
    }

    /// Removes and returns the front element.
    ///
    /// The element is moved out, not destroyed; the caller owns it.
    pub fn pop_front(&mut self) -> Option<T> {
        let key = self.chain.head()?;
        self.chain.unlink(&mut self.storage, key);
        self.storage.remove(key).map(|node| node.data)
    }

    /// Removes and returns the back element.
    ///
    /// The element is moved out, not destroyed; the caller owns it.
    pub fn pop_back(&mut self) -> Option<T> {
        let key = self.chain.tail()?;
        self.chain.unlink(&mut self.storage, key);
        self.storage.remove(key).map(|node| node.data)
    }

    /// Releases every element through the destroyer. The vector stays usable.
    pub fn clear(&mut self) {
        let released = self.chain.clear(&mut self.storage, &self.hooks);
        if released > 0 {
            tracing::debug!(released, "vector cleared");
        }
    }

    /// Releases every element, then the vector itself.
    ///
    /// Owned storage is freed with the vector; borrowed storage returns to
    /// the caller. Dropping the vector has the same effect.
    pub fn destroy(mut self) {
        let released = self.chain.clear(&mut self.storage, &self.hooks);
        tracing::debug!(released, "vector destroyed");
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Returns a reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IndexOutOfRange`] if `index >= len()`.
    pub fn at(&self, index: usize) -> Result<&T, VectorError> {
        let key = self.key_at(index)?;
        self.storage
            .get(key)
            .map(Node::data)
            .ok_or(VectorError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    /// Returns a mutable reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IndexOutOfRange`] if `index >= len()`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, VectorError> {
        let len = self.len();
        let key = self.key_at(index)?;
        self.storage
            .get_mut(key)
            .map(|node| &mut node.data)
            .ok_or(VectorError::IndexOutOfRange { index, len })
    }

    /// Returns a reference to the front element.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.storage.get(self.chain.head()?).map(Node::data)
    }

    /// Returns a reference to the back element.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.storage.get(self.chain.tail()?).map(Node::data)
    }

    /// Returns an iterator over references to elements, front to back.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, S, K> {
        self.chain.iter(&self.storage)
    }

    /// Verifies that the chain is acyclic, doubly consistent and matches
    /// the recorded length.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::CorruptChain`] naming the first bad node.
    pub fn check_links(&self) -> Result<(), VectorError> {
        self.chain.check(&self.storage)
    }

    #[inline]
    fn key_at(&self, index: usize) -> Result<K, VectorError> {
        self.chain
            .key_at(&self.storage, index)
            .ok_or(VectorError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    // ========================================================================
    // Functional operations
    // ========================================================================

    /// Applies `action` to every element in place, front to back.
    pub fn foreach<F: FnMut(&mut T)>(&mut self, action: F) {
        self.chain.for_each_mut(&mut self.storage, action);
    }

    /// Reverses the order of elements in place. O(n), no allocation.
    pub fn reverse(&mut self) {
        self.chain.reverse(&mut self.storage);
    }

    /// Folds the elements front to back into a seed.
    ///
    /// `accumulator(acc, element)` updates `acc` in place.
    ///
    /// The seed is treated differently depending on the lifecycle:
    ///
    /// - Lifecycles with a custom cloner ([`Lifecycle::CLONES_SEED`], e.g.
    ///   [`Hooks`](crate::Hooks)) clone the seed first. The caller's seed is
    ///   left untouched and [`Reduced::Owned`] is returned.
    /// - Without a cloner ([`ByClone`], [`ByCloneThen`](crate::ByCloneThen))
    ///   the fold goes straight into the caller's seed, returned as
    ///   [`Reduced::Seed`].
    ///
    /// ```
    /// use nexus_vector::{HeapVector, Vector};
    ///
    /// let mut v: HeapVector<i32> = Vector::new();
    /// v.extend_from(&[10, 20, 30]).unwrap();
    ///
    /// let mut seed = 0;
    /// let sum = v.reduce(Some(&mut seed), |acc, x| *acc += x).unwrap();
    /// assert_eq!(*sum, 60);
    /// assert_eq!(seed, 60);
    /// ```
    ///
    /// # Errors
    ///
    /// - [`VectorError::EmptyContainer`] if there are no elements
    /// - [`VectorError::NullArgument`] if `seed` is `None`
    /// - [`VectorError::AllocationFailure`] if cloning the seed fails
    pub fn reduce<'s, F>(
        &self,
        seed: Option<&'s mut T>,
        mut accumulator: F,
    ) -> Result<Reduced<'s, T>, VectorError>
    where
        F: FnMut(&mut T, &T),
    {
        if self.is_empty() {
            return Err(VectorError::EmptyContainer);
        }
        let seed = seed.ok_or(VectorError::NullArgument)?;

        if <H as Lifecycle<T>>::CLONES_SEED {
            let mut acc = self
                .hooks
                .clone_element(seed)
                .ok_or(VectorError::AllocationFailure)?;
            self.iter().for_each(|element| accumulator(&mut acc, element));
            Ok(Reduced::Owned(acc))
        } else {
            self.iter().for_each(|element| accumulator(seed, element));
            Ok(Reduced::Seed(seed))
        }
    }

    /// Writes `[e0, e1, ...]` and a newline to `out`, rendering each
    /// element with `printer`.
    ///
    /// ```
    /// use nexus_vector::{HeapVector, Vector};
    /// use std::io::Write;
    ///
    /// let mut v: HeapVector<i32> = Vector::new();
    /// v.extend_from(&[11, 21, 31]).unwrap();
    ///
    /// let mut out = Vec::new();
    /// v.print(&mut out, |w, x| write!(w, "{x}")).unwrap();
    /// assert_eq!(out, b"[11, 21, 31]\n");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the first I/O error from `out` or `printer`.
    pub fn print<W, F>(&self, out: &mut W, mut printer: F) -> io::Result<()>
    where
        W: io::Write + ?Sized,
        F: FnMut(&mut W, &T) -> io::Result<()>,
    {
        out.write_all(b"[")?;
        for (i, element) in self.iter().enumerate() {
            if i > 0 {
                out.write_all(b", ")?;
            }
            printer(out, element)?;
        }
        out.write_all(b"]\n")
    }

    /// Appends copies of every element of `src`, in order. `src` is not
    /// modified.
    ///
    /// Copies are made with this vector's hooks, which keep governing every
    /// node it holds. The copies are staged in a separate chain and spliced
    /// on only once all of them exist, so a failure leaves this vector
    /// unchanged. Merging into an empty vector appends everything.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::AllocationFailure`] if any copy fails.
    pub fn merge<S2, H2, K2>(&mut self, src: &Vector<T, S2, H2, K2>) -> Result<(), VectorError>
    where
        S2: Storage<Node<T, K2>, Key = K2>,
        H2: Lifecycle<T>,
        K2: Key,
    {
        let mut staged = Chain::new();
        for data in src.iter() {
            match Node::spawn(&mut self.storage, data, &self.hooks) {
                Ok(key) => staged.link_back(&mut self.storage, key),
                Err(err) => {
                    let released = staged.clear(&mut self.storage, &self.hooks);
                    tracing::trace!(released, "merge aborted");
                    return Err(err);
                }
            }
        }

        let merged = staged.len();
        self.chain.append(&mut self.storage, &mut staged);
        tracing::trace!(merged, len = self.len(), "merge spliced");
        Ok(())
    }
}

impl<T, S, H, K> Vector<T, S, H, K>
where
    S: Storage<Node<T, K>, Key = K>,
    H: Lifecycle<T> + Clone,
    K: Key,
{
    /// Deep-copies into a new heap-resident vector with the same hooks.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::AllocationFailure`] if any copy fails. Copies
    /// made so far are released.
    pub fn copy(&self) -> Result<HeapVector<T, H>, VectorError> {
        let mut copy = Vector::with_storage(SlabNodes::with_capacity(self.len()), self.hooks.clone());
        copy.extend_from(self.iter())?;
        Ok(copy)
    }

    /// Copies, then applies `transform` to every element of the copy.
    ///
    /// # Errors
    ///
    /// Same as [`copy`](Self::copy).
    pub fn map<F: FnMut(&mut T)>(&self, transform: F) -> Result<HeapVector<T, H>, VectorError> {
        let mut mapped = self.copy()?;
        mapped.foreach(transform);
        Ok(mapped)
    }

    /// Copies the elements satisfying `predicate` into a new heap-resident
    /// vector, preserving their order.
    ///
    /// # Errors
    ///
    /// Same as [`copy`](Self::copy).
    pub fn filter<F: FnMut(&T) -> bool>(
        &self,
        mut predicate: F,
    ) -> Result<HeapVector<T, H>, VectorError> {
        let mut filtered = Vector::with_hooks(self.hooks.clone());
        filtered.extend_from(self.iter().filter(|element| predicate(*element)))?;
        Ok(filtered)
    }
}

impl<T, S, H, K> Drop for Vector<T, S, H, K>
where
    S: Storage<Node<T, K>, Key = K>,
    H: Lifecycle<T>,
    K: Key,
{
    fn drop(&mut self) {
        self.chain.clear(&mut self.storage, &self.hooks);
    }
}

impl<T, S, H, K> core::fmt::Debug for Vector<T, S, H, K>
where
    T: core::fmt::Debug,
    S: Storage<Node<T, K>, Key = K>,
    H: Lifecycle<T>,
    K: Key,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T, S, H, K> IntoIterator for &'a Vector<T, S, H, K>
where
    S: Storage<Node<T, K>, Key = K>,
    H: Lifecycle<T>,
    K: Key,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, S, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
