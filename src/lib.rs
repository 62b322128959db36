//! chained-slots: an array-backed doubly linked list that keeps its free
//! storage inside the same buffer, and a fixed-bucket chained hash table
//! built from many of those lists.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: measure the raw per-operation cost of hash and comparator
//!   strategies on a chained table whose chains are cache-friendly lists.
//! - Layers:
//!   - SlotList<T>: one `Vec` of slots holding two disjoint circular lists
//!     (used and free) linked by integer positions. Slot 0 is a permanent
//!     sentinel. Tracks whether live elements are laid out in list order so
//!     index lookup can skip the walk.
//!   - HashTable<T>: `bucket_count` independent SlotLists; routes by
//!     `hash % bucket_count`, scans with a caller-supplied comparator and
//!     never stores duplicates.
//!
//! Constraints
//! - Single-threaded: no locking; sharing across threads is the caller's
//!   business.
//! - Positions are plain indices: valid until the slot is removed, and
//!   invalidated wholesale by `grow` and `linearize`.
//! - Every mutating call either completes or returns an error with the
//!   structure untouched.
//! - Free slots hold the caller's poison value and a `Free` state tag; the
//!   tag, not the value, decides liveness.
//!
//! Hashing and comparison
//! - The table never hashes. Callers pass a `u64` computed by any function
//!   honouring the contract in [`hash_fn`].
//! - Comparators implement [`Comparator`]; any `Fn(&T, &T) -> Ordering`
//!   qualifies. [`ExactEq`] with [`WideKey`] is the fixed-width fast path.
//!
//! Diagnostics
//! - `validate()` returns a [`Defects`] mask; link checks are debug-only.
//!   Debug builds validate after every list mutation and panic on
//!   corruption.
//! - `SlotList::dump()` renders the full slot layout for external tools.
//! - Growth and teardown are reported through `tracing`; install a
//!   subscriber to see them.
//!
//! Notes and non-goals
//! - No whole-table rehash: the bucket count is fixed, and the load factor
//!   is the caller's business.
//! - No removal from the table; lists support removal directly.

mod compare;
mod config;
mod error;
pub mod hash_fn;
mod hash_table;
mod position;
mod slot_list;
mod slot_list_proptest;

// Public surface
pub use compare::{Comparator, ExactEq, WideKey};
pub use config::{TableConfig, DEFAULT_BUCKET_CAPACITY, DEFAULT_BUCKET_COUNT};
pub use error::{Defects, ListError};
pub use hash_table::{HashTable, InsertOutcome};
pub use position::Position;
pub use slot_list::{Iter, ListDump, SlotList};
