//! SlotList: array-backed doubly linked list with an embedded free list.
//!
//! One `Vec` of slots hosts two disjoint circular lists threaded through
//! the same `next`/`prev` index fields:
//! - the used list, anchored at the permanent sentinel in slot 0;
//! - the free list, anchored at `free_head`.
//!
//! Every slot carries a state tag. Reachability from the sentinel is never
//! taken as proof of liveness; the tag is checked instead.
//!
//! Linearized lists
//! - While `linearized` holds, the live elements occupy a run of physical
//!   slots that is contiguous modulo the range `1..capacity` and follows
//!   list order, and the free list holds the remaining slots in physical
//!   order starting right after the tail. Index lookup is then O(1).
//! - Appending after the tail or prepending after the sentinel picks the
//!   free slot adjacent to that end, and removing the head or the tail
//!   returns the slot to the matching end of the free list, so those
//!   operations keep the flag. Any other mutation clears it until the next
//!   `linearize()`.

use crate::error::{Defects, ListError};
use crate::position::Position;
use core::fmt;
use tracing::{debug, error, trace};

const SENTINEL: usize = 0;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SlotState {
    Sentinel,
    Used,
    Free,
}

#[derive(Clone, Debug)]
struct Slot<T> {
    next: usize,
    prev: usize,
    state: SlotState,
    content: T,
}

/// Fixed-capacity list whose elements live in one contiguous buffer.
///
/// `capacity` counts the sentinel, so a list can hold `capacity - 1`
/// elements before [`push`](SlotList::push) has to grow it.
#[derive(Clone)]
pub struct SlotList<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<usize>,
    len: usize,
    linearized: bool,
    poison: T,
}

impl<T: Clone> SlotList<T> {
    /// Build a list of `capacity` slots. Slot 0 becomes the self-linked
    /// sentinel and slots `1..capacity` form the free ring.
    pub fn with_capacity(capacity: usize, poison: T) -> Result<Self, ListError> {
        if capacity == 0 {
            return Err(ListError::InvalidArgument(
                "capacity must leave room for the sentinel slot",
            ));
        }
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| ListError::Allocation {
                requested: capacity,
            })?;

        slots.push(Slot {
            next: SENTINEL,
            prev: SENTINEL,
            state: SlotState::Sentinel,
            content: poison.clone(),
        });
        for i in 1..capacity {
            slots.push(Slot {
                next: if i + 1 < capacity { i + 1 } else { 1 },
                prev: if i > 1 { i - 1 } else { capacity - 1 },
                state: SlotState::Free,
                content: poison.clone(),
            });
        }

        let list = Self {
            slots,
            free_head: (capacity > 1).then_some(1),
            len: 0,
            linearized: true,
            poison,
        };
        list.debug_validate();
        Ok(list)
    }

    /// Consume the list, refusing if it reports corruption.
    ///
    /// Storage is released either way; the error tells the caller that
    /// something upstream broke the structure.
    pub fn destroy(self) -> Result<(), ListError> {
        let defects = self.validate();
        if !defects.is_clean() {
            error!(%defects, "destroying a corrupted slot list");
            return Err(ListError::InvalidState(defects));
        }
        Ok(())
    }

    /// Splice `value` into the used list right after `after`.
    ///
    /// `Position::SENTINEL` prepends. Returns the position of the new
    /// element. Fails with `CapacityExceeded` when no free slot is left.
    pub fn insert(&mut self, value: T, after: Position) -> Result<Position, ListError> {
        let after = after.index();
        if after >= self.slots.len() {
            return Err(ListError::InvalidArgument(
                "insert position is outside the list",
            ));
        }
        if self.slots[after].state == SlotState::Free {
            return Err(ListError::NotFound(after));
        }
        if self.free_head.is_none() {
            return Err(ListError::CapacityExceeded {
                capacity: self.slots.len(),
            });
        }

        let pos = self.splice_in(value, after);
        self.debug_validate();
        Ok(Position::new(pos))
    }

    /// Grow when full, then append `value` after the tail.
    pub fn push(&mut self, value: T) -> Result<Position, ListError> {
        if self.len >= self.slots.len() - 1 {
            let doubled = self
                .slots
                .len()
                .checked_mul(2)
                .ok_or(ListError::Allocation {
                    requested: usize::MAX,
                })?;
            self.grow(doubled.max(2))?;
        }
        self.insert(value, self.tail())
    }

    /// Unsplice the element at `pos`, return its slot to the free list and
    /// hand back the stored value.
    pub fn remove(&mut self, pos: Position) -> Result<T, ListError> {
        let p = pos.index();
        match self.slots.get(p) {
            Some(slot) if slot.state == SlotState::Used => {}
            _ => return Err(ListError::NotFound(p)),
        }

        let Slot { next, prev, .. } = self.slots[p];
        self.unlink(p);

        if self.linearized && next == SENTINEL {
            self.free_push_front(p);
        } else if self.linearized && prev == SENTINEL {
            self.free_push_back(p);
        } else {
            self.linearized = false;
            self.free_push_front(p);
        }

        let slot = &mut self.slots[p];
        slot.state = SlotState::Free;
        let value = core::mem::replace(&mut slot.content, self.poison.clone());
        self.len -= 1;

        self.debug_validate();
        Ok(value)
    }

    /// Position of the element at logical `index`; negative indices count
    /// from the tail (`-1` is the last element).
    ///
    /// On an empty list only index 0 is accepted and yields the sentinel.
    /// O(1) while linearized, O(len) otherwise.
    pub fn find_position(&self, index: isize) -> Result<Position, ListError> {
        let len = self.len as isize;
        if self.len == 0 {
            return if index == 0 {
                Ok(Position::SENTINEL)
            } else {
                Err(ListError::OutOfRange { index, len: 0 })
            };
        }
        if index >= len || index < -len {
            return Err(ListError::OutOfRange {
                index,
                len: self.len,
            });
        }

        if self.linearized {
            let ring = (self.slots.len() - 1) as isize;
            let (start, offset) = if index >= 0 {
                (self.slots[SENTINEL].next, index)
            } else {
                (self.slots[SENTINEL].prev, index + 1)
            };
            let p = (start as isize - 1 + offset).rem_euclid(ring) + 1;
            return Ok(Position::new(p as usize));
        }

        let mut cur;
        if index >= 0 {
            cur = self.slots[SENTINEL].next;
            for _ in 0..index {
                cur = self.slots[cur].next;
            }
        } else {
            cur = self.slots[SENTINEL].prev;
            for _ in 0..(-index - 1) {
                cur = self.slots[cur].prev;
            }
        }
        Ok(Position::new(cur))
    }

    /// Reorder slots in place so the i-th element sits in slot `i + 1` and
    /// the free slots follow in physical order.
    pub fn linearize(&mut self) -> Result<(), ListError> {
        let defects = self.validate();
        if !defects.is_clean() {
            error!(%defects, "refusing to linearize a corrupted slot list");
            return Err(ListError::InvalidState(defects));
        }
        trace!(len = self.len, capacity = self.slots.len(), "linearizing slot list");

        let mut cur = self.slots[SENTINEL].next;
        for target in 1..=self.len {
            if cur != target {
                self.swap_slots(cur, target);
            }
            cur = self.slots[target].next;
        }

        let capacity = self.slots.len();
        let first = self.len + 1;
        if first < capacity {
            for i in first..capacity {
                let slot = &mut self.slots[i];
                slot.next = if i + 1 < capacity { i + 1 } else { first };
                slot.prev = if i > first { i - 1 } else { capacity - 1 };
            }
            self.free_head = Some(first);
        } else {
            self.free_head = None;
        }
        self.linearized = true;

        self.debug_validate();
        Ok(())
    }

    /// Move every element, in list order, into a fresh buffer of
    /// `new_capacity` slots. The result is linearized; positions change.
    pub fn grow(&mut self, new_capacity: usize) -> Result<(), ListError> {
        if new_capacity <= self.len {
            return Err(ListError::InvalidArgument(
                "new capacity must exceed the current size",
            ));
        }
        debug!(
            from = self.slots.len(),
            to = new_capacity,
            len = self.len,
            "growing slot list"
        );

        let mut fresh = Self::with_capacity(new_capacity, self.poison.clone())?;
        let mut cur = self.slots[SENTINEL].next;
        while cur != SENTINEL {
            let slot = &mut self.slots[cur];
            let value = core::mem::replace(&mut slot.content, self.poison.clone());
            cur = slot.next;
            let tail = fresh.slots[SENTINEL].prev;
            fresh.splice_in(value, tail);
        }

        *self = fresh;
        self.debug_validate();
        Ok(())
    }

    /// Snapshot of the internal layout for logging or visualization.
    pub fn dump(&self) -> ListDump<'_, T> {
        ListDump { list: self }
    }

    /// Place `value` in a free slot linked after `after`.
    ///
    /// Caller guarantees a free slot exists and `after` is live or the
    /// sentinel.
    fn splice_in(&mut self, value: T, after: usize) -> usize {
        let tail = self.slots[SENTINEL].prev;
        let pos = if self.linearized && after == tail {
            self.free_take_front()
        } else if self.linearized && after == SENTINEL {
            self.free_take_back()
        } else {
            self.linearized = false;
            self.free_take_front()
        };

        self.link_after(pos, after);
        let slot = &mut self.slots[pos];
        slot.state = SlotState::Used;
        slot.content = value;
        self.len += 1;
        pos
    }

    /// Exchange the records of slots `a` and `b`, then repoint every link
    /// so each element keeps its neighbours at their new addresses.
    fn swap_slots(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
        let remap = |x: usize| {
            if x == a {
                b
            } else if x == b {
                a
            } else {
                x
            }
        };
        for p in [a, b] {
            let slot = &mut self.slots[p];
            slot.next = remap(slot.next);
            slot.prev = remap(slot.prev);
        }
        for p in [a, b] {
            let Slot { next, prev, .. } = self.slots[p];
            self.slots[prev].next = p;
            self.slots[next].prev = p;
        }
        if let Some(f) = &mut self.free_head {
            *f = remap(*f);
        }
    }
}

impl<T> SlotList<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total slots, sentinel included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_linearized(&self) -> bool {
        self.linearized
    }

    /// Position of the first element, or the sentinel when empty.
    #[inline]
    pub fn head(&self) -> Position {
        Position::new(self.slots[SENTINEL].next)
    }

    /// Position of the last element, or the sentinel when empty.
    #[inline]
    pub fn tail(&self) -> Position {
        Position::new(self.slots[SENTINEL].prev)
    }

    /// Content of the slot at `pos`.
    ///
    /// Liveness is only asserted in debug builds; a free slot yields the
    /// poison value in release builds.
    pub fn get(&self, pos: Position) -> Result<&T, ListError> {
        let slot = self
            .slots
            .get(pos.index())
            .ok_or(ListError::InvalidArgument("position is outside the list"))?;
        debug_assert!(
            slot.state == SlotState::Used,
            "reading slot {} which holds no element",
            pos.index()
        );
        Ok(&slot.content)
    }

    /// Mutable content of the slot at `pos`, with the same checks as
    /// [`get`](SlotList::get). Use [`contains`](SlotList::contains) first
    /// when `pos` may name a removed element.
    pub fn get_mut(&mut self, pos: Position) -> Result<&mut T, ListError> {
        let slot = self
            .slots
            .get_mut(pos.index())
            .ok_or(ListError::InvalidArgument("position is outside the list"))?;
        debug_assert!(
            slot.state == SlotState::Used,
            "writing slot {} which holds no element",
            pos.index()
        );
        Ok(&mut slot.content)
    }

    /// Whether `pos` currently holds an element.
    pub fn contains(&self, pos: Position) -> bool {
        self.slots
            .get(pos.index())
            .is_some_and(|s| s.state == SlotState::Used)
    }

    /// Element following `pos` in list order, `None` at the tail.
    pub fn next(&self, pos: Position) -> Option<Position> {
        let slot = self.slots.get(pos.index())?;
        if slot.state == SlotState::Free || slot.next == SENTINEL {
            return None;
        }
        Some(Position::new(slot.next))
    }

    /// Element preceding `pos` in list order, `None` at the head.
    pub fn prev(&self, pos: Position) -> Option<Position> {
        let slot = self.slots.get(pos.index())?;
        if slot.state == SlotState::Free || slot.prev == SENTINEL {
            return None;
        }
        Some(Position::new(slot.prev))
    }

    /// Elements from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cur: self.slots[SENTINEL].next,
            remaining: self.len,
        }
    }

    /// Report structural defects. The per-slot link and state checks cost
    /// O(capacity) and only run in debug builds.
    pub fn validate(&self) -> Defects {
        let mut defects = Defects::NONE;
        let capacity = self.slots.len();
        if capacity == 0 {
            return Defects::MISSING_STORAGE;
        }
        if self.len >= capacity {
            defects |= Defects::SIZE_OVERFLOW;
        }
        match self.free_head {
            Some(f) if f == SENTINEL || f >= capacity => {
                defects |= Defects::FREE_HEAD_OUT_OF_BOUNDS
            }
            None if self.len + 1 < capacity => defects |= Defects::FREE_HEAD_OUT_OF_BOUNDS,
            _ => {}
        }

        #[cfg(debug_assertions)]
        {
            let mut used = 0;
            for (i, slot) in self.slots.iter().enumerate() {
                if slot.next >= capacity
                    || slot.prev >= capacity
                    || self.slots[slot.next].prev != i
                    || self.slots[slot.prev].next != i
                {
                    defects |= Defects::BROKEN_LINKS;
                }
                match slot.state {
                    SlotState::Used => used += 1,
                    SlotState::Sentinel if i != SENTINEL => defects |= Defects::STATE_MISMATCH,
                    _ => {}
                }
            }
            if used != self.len || self.slots[SENTINEL].state != SlotState::Sentinel {
                defects |= Defects::STATE_MISMATCH;
            }
        }

        defects
    }

    #[inline]
    fn debug_validate(&self) {
        #[cfg(debug_assertions)]
        {
            let defects = self.validate();
            assert!(defects.is_clean(), "slot list corrupted: {defects}");
        }
    }

    fn unlink(&mut self, p: usize) {
        let Slot { next, prev, .. } = self.slots[p];
        self.slots[prev].next = next;
        self.slots[next].prev = prev;
    }

    fn link_after(&mut self, p: usize, anchor: usize) {
        let next = self.slots[anchor].next;
        self.slots[p].prev = anchor;
        self.slots[p].next = next;
        self.slots[anchor].next = p;
        self.slots[next].prev = p;
    }

    fn make_lone_free(&mut self, p: usize) {
        self.slots[p].next = p;
        self.slots[p].prev = p;
        self.free_head = Some(p);
    }

    // The free ring runs from the slot after the tail to the slot before
    // the head while linearized, so its front feeds appends and its back
    // feeds prepends.

    fn free_take_front(&mut self) -> usize {
        let Some(f) = self.free_head else {
            unreachable!("free list checked non-empty by the caller")
        };
        let next = self.slots[f].next;
        if next == f {
            self.free_head = None;
        } else {
            self.unlink(f);
            self.free_head = Some(next);
        }
        f
    }

    fn free_take_back(&mut self) -> usize {
        let Some(f) = self.free_head else {
            unreachable!("free list checked non-empty by the caller")
        };
        let back = self.slots[f].prev;
        if back == f {
            self.free_head = None;
        } else {
            self.unlink(back);
        }
        back
    }

    fn free_push_front(&mut self, p: usize) {
        match self.free_head {
            None => self.make_lone_free(p),
            Some(f) => {
                let back = self.slots[f].prev;
                self.link_after(p, back);
                self.free_head = Some(p);
            }
        }
    }

    fn free_push_back(&mut self, p: usize) {
        match self.free_head {
            None => self.make_lone_free(p),
            Some(f) => {
                let back = self.slots[f].prev;
                self.link_after(p, back);
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SlotList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|(_, v)| v)).finish()
    }
}

/// Iterator over `(Position, &T)` from head to tail.
pub struct Iter<'a, T> {
    list: &'a SlotList<T>,
    cur: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Position, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let slot = &self.list.slots[self.cur];
        let item = (Position::new(self.cur), &slot.content);
        self.cur = slot.next;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a SlotList<T> {
    type Item = (Position, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Text rendering of a list's full layout, one line per slot.
pub struct ListDump<'a, T> {
    list: &'a SlotList<T>,
}

impl<T: fmt::Debug> fmt::Display for ListDump<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = self.list;
        let defects = list.validate();
        writeln!(
            f,
            "status: {}",
            if defects.is_clean() { "OK" } else { "CORRUPT" }
        )?;
        for text in defects.descriptions() {
            writeln!(f, "  {text}")?;
        }
        match list.free_head {
            Some(p) => writeln!(f, "first free = {p}")?,
            None => writeln!(f, "first free = none")?,
        }
        writeln!(f, "size       = {}", list.len)?;
        writeln!(f, "capacity   = {}", list.slots.len())?;
        writeln!(f, "linearized = {}", list.linearized)?;
        for (i, slot) in list.slots.iter().enumerate() {
            let tag = match slot.state {
                SlotState::Sentinel => "SENTINEL",
                SlotState::Used => "VALUE",
                SlotState::Free => "POISON",
            };
            writeln!(
                f,
                "[{i:5}] = {:?} ({tag}), next [{}], prev [{}]",
                slot.content, slot.next, slot.prev
            )?;
        }
        Ok(())
    }
}
