//! Position handles into a slot list's backing array.

use core::fmt;

/// Stable reference to one slot of a [`SlotList`](crate::SlotList).
///
/// A position stays valid until the slot it names is removed; after that
/// the same index may be handed out again for a different value. Growth
/// and linearization move elements, so positions taken before either call
/// must be looked up again.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Position(usize);

impl Position {
    /// The permanently reserved slot anchoring the used list. Inserting
    /// after it prepends.
    pub const SENTINEL: Position = Position(0);

    pub const fn new(index: usize) -> Self {
        Position(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }

    #[inline]
    pub const fn is_sentinel(self) -> bool {
        self.0 == 0
    }
}

impl From<usize> for Position {
    fn from(index: usize) -> Self {
        Position(index)
    }
}

impl From<Position> for usize {
    fn from(p: Position) -> Self {
        p.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
