//! Doubly-linked sequence container over keyed node storage.
//!
//! A [`Vector`] is an ordered sequence built from linked nodes. Each node
//! sits in a slab-style arena and refers to its neighbors by key, so the
//! container has no raw pointers and no `unsafe`.
//!
//! Every container carries a [`Lifecycle`]: a cloner that produces the copy
//! stored for each inserted element, and a destroyer that receives every
//! element the container releases. Inserting never takes ownership of the
//! caller's value.
//!
//! # Quick Start
//!
//! ```
//! use nexus_vector::{HeapVector, Vector};
//!
//! let mut v: HeapVector<u32> = Vector::new();
//! v.append(&10).unwrap();
//! v.prepend(&20).unwrap();
//! v.insert(1, &15).unwrap();
//!
//! assert_eq!(v.iter().copied().collect::<Vec<_>>(), [20, 15, 10]);
//! assert_eq!(v.at(2), Ok(&10));
//! ```
//!
//! # Custom Hooks
//!
//! ```
//! use nexus_vector::{Hooks, HeapVector, Vector, VectorError};
//!
//! // Negative values cannot be copied.
//! let hooks = Hooks::with_cloner(|x: &i64| (*x >= 0).then_some(*x));
//! let mut v: HeapVector<i64, _> = Vector::with_hooks(hooks);
//!
//! v.append(&1).unwrap();
//! assert_eq!(v.append(&-1), Err(VectorError::AllocationFailure));
//! assert_eq!(v.len(), 1);
//! ```
//!
//! # Storage Options
//!
//! | Storage | Capacity | Residency |
//! |---------|----------|-----------|
//! | [`SlabNodes`] | Growable | Heap, owned by the vector (default) |
//! | [`BoxedNodes`] | Fixed (runtime) | Heap, owned by the vector |
//! | `&mut SlabNodes` / `&mut BoxedNodes` | As above | Borrowed, see [`Vector::in_place`] |
//!
//! A full [`BoxedNodes`] makes inserts fail with
//! [`VectorError::AllocationFailure`] instead of growing.
//!
//! # Errors
//!
//! Fallible operations return [`VectorError`] and leave the container as it
//! was before the call.

#![warn(missing_docs)]

mod chain;
pub mod error;
pub mod key;
pub mod lifecycle;
mod node;
pub mod storage;
pub mod vector;

pub use chain::Iter;
pub use error::VectorError;
pub use key::Key;
pub use lifecycle::{ByClone, ByCloneThen, Hooks, Lifecycle};
pub use node::Node;
pub use storage::{BoxedStorage, Full, Storage};
pub use vector::{
    BoxedNodes, BoxedVector, HeapVector, InPlaceVector, Reduced, SlabNodes, Vector,
};
