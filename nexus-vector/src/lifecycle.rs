//! Per-container element lifecycle.
//!
//! Every element entering a [`Vector`](crate::Vector) is produced by the
//! container's cloner, and every element leaving it through removal, clearing
//! or drop is handed to the container's destroyer. Both are fixed for the
//! lifetime of the container through its `H: Lifecycle<T>` parameter.

/// Clone/destroy behavior for the elements of one container.
///
/// # Example
///
/// ```
/// use nexus_vector::{Hooks, Lifecycle};
///
/// // Refuse to clone empty strings, log every release.
/// let hooks = Hooks::new(
///     |s: &String| (!s.is_empty()).then(|| s.clone()),
///     |s: String| println!("releasing {s}"),
/// );
///
/// assert_eq!(hooks.clone_element(&"a".to_string()), Some("a".to_string()));
/// assert_eq!(hooks.clone_element(&String::new()), None);
/// ```
pub trait Lifecycle<T> {
    /// Whether `reduce` clones its seed before folding.
    ///
    /// `true` for custom cloners, `false` when elements are copied with `Clone`
    /// ([`ByClone`], [`ByCloneThen`]). See
    /// [`Vector::reduce`](crate::Vector::reduce).
    const CLONES_SEED: bool = true;

    /// Produces an owned copy of `value`.
    ///
    /// Returns `None` if the copy could not be made; the container reports
    /// this as [`VectorError::AllocationFailure`](crate::VectorError::AllocationFailure).
    fn clone_element(&self, value: &T) -> Option<T>;

    /// Releases an element the container no longer holds.
    #[inline]
    fn destroy_element(&self, value: T) {
        drop(value);
    }
}

/// Plain `Clone` copies and ordinary drop. The default lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByClone;

impl<T: Clone> Lifecycle<T> for ByClone {
    const CLONES_SEED: bool = false;

    #[inline]
    fn clone_element(&self, value: &T) -> Option<T> {
        Some(value.clone())
    }
}

/// Lifecycle built from a cloner and a destroyer closure.
#[derive(Clone, Copy)]
pub struct Hooks<C, D> {
    cloner: C,
    destroyer: D,
}

impl<C, D> Hooks<C, D> {
    /// Combines a cloner (`Fn(&T) -> Option<T>`) and a destroyer (`Fn(T)`).
    pub const fn new(cloner: C, destroyer: D) -> Self {
        Self { cloner, destroyer }
    }
}

impl<C> Hooks<C, ()> {
    /// Custom cloner, elements released by ordinary drop.
    pub fn with_cloner<T>(cloner: C) -> Hooks<C, fn(T)>
    where
        C: Fn(&T) -> Option<T>,
    {
        Hooks::new(cloner, drop::<T> as fn(T))
    }
}

impl<D> Hooks<(), D> {
    /// Custom destroyer, elements copied with `Clone`.
    ///
    /// No cloner is configured, so [`Vector::reduce`](crate::Vector::reduce)
    /// folds into the caller's seed as it does for [`ByClone`].
    pub fn with_destroyer<T>(destroyer: D) -> ByCloneThen<D>
    where
        T: Clone,
        D: Fn(T),
    {
        ByCloneThen { destroyer }
    }
}

/// `Clone` copies, released through a destroyer closure.
///
/// Built by [`Hooks::with_destroyer`].
#[derive(Clone, Copy)]
pub struct ByCloneThen<D> {
    destroyer: D,
}

impl<T, D> Lifecycle<T> for ByCloneThen<D>
where
    T: Clone,
    D: Fn(T),
{
    const CLONES_SEED: bool = false;

    #[inline]
    fn clone_element(&self, value: &T) -> Option<T> {
        Some(value.clone())
    }

    #[inline]
    fn destroy_element(&self, value: T) {
        (self.destroyer)(value);
    }
}

impl<D> core::fmt::Debug for ByCloneThen<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ByCloneThen").finish_non_exhaustive()
    }
}

impl<T, C, D> Lifecycle<T> for Hooks<C, D>
where
    C: Fn(&T) -> Option<T>,
    D: Fn(T),
{
    #[inline]
    fn clone_element(&self, value: &T) -> Option<T> {
        (self.cloner)(value)
    }

    #[inline]
    fn destroy_element(&self, value: T) {
        (self.destroyer)(value);
    }
}

impl<C, D> core::fmt::Debug for Hooks<C, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn by_clone_copies() {
        let value = vec![1, 2, 3];
        let copy = ByClone.clone_element(&value).unwrap();
        assert_eq!(copy, value);
        assert!(!<ByClone as Lifecycle<Vec<i32>>>::CLONES_SEED);
    }

    #[test]
    fn hooks_route_through_closures() {
        let released = Cell::new(0);
        let hooks = Hooks::new(|v: &i32| Some(*v * 2), |_: i32| released.set(released.get() + 1));

        assert_eq!(hooks.clone_element(&4), Some(8));
        hooks.destroy_element(8);
        hooks.destroy_element(9);
        assert_eq!(released.get(), 2);
    }

    #[test]
    fn with_cloner_drops_normally() {
        let hooks = Hooks::with_cloner(|v: &String| Some(v.to_uppercase()));
        assert_eq!(hooks.clone_element(&"ab".to_string()), Some("AB".to_string()));
        hooks.destroy_element("gone".to_string());
    }

    #[test]
    fn with_destroyer_clones_and_releases() {
        let released = Cell::new(0);
        let hooks = Hooks::with_destroyer(|v: u32| released.set(released.get() + v));

        assert_eq!(hooks.clone_element(&5u32), Some(5));
        hooks.destroy_element(5u32);
        assert_eq!(released.get(), 5);
        assert!(!<ByCloneThen<fn(u32)> as Lifecycle<u32>>::CLONES_SEED);
    }

    #[test]
    fn failing_cloner() {
        let hooks = Hooks::with_cloner(|_: &u8| None);
        assert_eq!(hooks.clone_element(&1), None);
    }
}
