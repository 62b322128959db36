//! Error and diagnostic types shared by the list and the table.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// Errors returned by [`SlotList`](crate::SlotList) and
/// [`HashTable`](crate::HashTable) operations.
///
/// A call that returns an error has not mutated the structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ListError {
    /// Backing storage could not be obtained.
    #[error("failed to allocate storage for {requested} slots")]
    Allocation { requested: usize },

    /// A capacity, position or size argument was rejected up front.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The free list is exhausted; grow the list before inserting again.
    #[error("no free slot left in a list of capacity {capacity}")]
    CapacityExceeded { capacity: usize },

    /// The position does not hold a live element.
    #[error("position {0} does not hold a live element")]
    NotFound(usize),

    /// A logical index fell outside the list.
    #[error("index {index} is out of range for a list of {len} elements")]
    OutOfRange { index: isize, len: usize },

    /// Structural corruption was detected; the structure must not be
    /// mutated further.
    #[error("structure is in an invalid state: {0}")]
    InvalidState(Defects),
}

/// Bitmask of structural defects reported by `validate()`.
///
/// Diagnostic only: an empty mask means no defect was found, never that the
/// structure is proven sound (link checks run in debug builds only).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Defects(u8);

impl Defects {
    pub const NONE: Defects = Defects(0);
    /// The backing array is missing.
    pub const MISSING_STORAGE: Defects = Defects(1 << 0);
    /// `size` reached or passed `capacity`.
    pub const SIZE_OVERFLOW: Defects = Defects(1 << 1);
    /// The free-list head is outside the array, or disagrees with `size`.
    pub const FREE_HEAD_OUT_OF_BOUNDS: Defects = Defects(1 << 2);
    /// Some slot's `prev.next` or `next.prev` does not lead back to it.
    pub const BROKEN_LINKS: Defects = Defects(1 << 3);
    /// Slot state tags disagree with `size` or with the sentinel.
    pub const STATE_MISMATCH: Defects = Defects(1 << 4);

    const DESCRIPTIONS: [(Defects, &'static str); 5] = [
        (Self::MISSING_STORAGE, "backing storage is missing"),
        (Self::SIZE_OVERFLOW, "size is not smaller than capacity"),
        (Self::FREE_HEAD_OUT_OF_BOUNDS, "first free slot is invalid"),
        (Self::BROKEN_LINKS, "slot links are inconsistent"),
        (Self::STATE_MISMATCH, "slot states disagree with size"),
    ];

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_clean(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, other: Defects) -> bool {
        self.0 & other.0 == other.0
    }

    /// Human-readable descriptions of every flag set in this mask.
    pub fn descriptions(self) -> impl Iterator<Item = &'static str> {
        Self::DESCRIPTIONS
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, text)| text)
    }
}

impl BitOr for Defects {
    type Output = Defects;
    fn bitor(self, rhs: Defects) -> Defects {
        Defects(self.0 | rhs.0)
    }
}

impl BitOrAssign for Defects {
    fn bitor_assign(&mut self, rhs: Defects) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Defects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Defects({:#07b})", self.0)
    }
}

impl fmt::Display for Defects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return f.write_str("OK");
        }
        for (i, text) in self.descriptions().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            f.write_str(text)?;
        }
        Ok(())
    }
}
