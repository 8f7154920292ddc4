//! Node handles.
//!
//! Nodes refer to their neighbors by storage key rather than by pointer.
//! A reserved sentinel (`NONE`) stands in for "no neighbor", which keeps
//! a [`Node`](crate::Node) at two plain integers of link overhead instead of
//! two `Option`s.

/// Integer handle of a node inside a [`Storage`](crate::Storage).
///
/// # Example
///
/// ```
/// use nexus_vector::Key;
///
/// let key: u32 = 7;
/// assert!(key.is_some());
/// assert!(u32::NONE.is_none());
/// assert_eq!(u32::from_usize(7).as_usize(), 7);
/// ```
pub trait Key: Copy + Eq + core::fmt::Debug {
    /// Sentinel meaning "no node". Never handed out by a storage.
    const NONE: Self;

    /// Converts a slot position into a key.
    fn from_usize(val: usize) -> Self;

    /// Returns the slot position this key addresses.
    fn as_usize(self) -> usize;

    /// Returns `true` if this is the sentinel.
    #[inline]
    fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Returns `true` if this addresses a slot.
    #[inline]
    fn is_some(self) -> bool {
        !self.is_none()
    }

    /// Maps the sentinel to `None`.
    #[inline]
    fn get(self) -> Option<Self> {
        if self.is_none() { None } else { Some(self) }
    }
}

macro_rules! impl_key_for_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Key for $ty {
                const NONE: Self = <$ty>::MAX;

                #[inline]
                fn from_usize(val: usize) -> Self {
                    debug_assert!(val < <$ty>::MAX as usize, "key overflows {}", stringify!($ty));
                    val as Self
                }

                #[inline]
                fn as_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_key_for_unsigned!(u16, u32, u64, usize);
