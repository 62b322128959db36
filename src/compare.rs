//! Equality strategies used by `HashTable` to resolve chains.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// Decides whether a stored element matches a probe.
///
/// Implementations must be total, deterministic and free of side effects.
/// Any `Fn(&T, &T) -> Ordering` is a comparator that treats
/// `Ordering::Equal` as a match, the way `strcmp`-style functions report
/// equality with zero.
pub trait Comparator<T: ?Sized> {
    fn matches(&self, stored: &T, probe: &T) -> bool;
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn matches(&self, stored: &T, probe: &T) -> bool {
        self(stored, probe) == Ordering::Equal
    }
}

/// Exact equality through `PartialEq`. Paired with [`WideKey`] this is the
/// fixed-width fast path: one lane-wise comparison, no ordering work.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactEq;

impl<T: ?Sized + PartialEq> Comparator<T> for ExactEq {
    #[inline]
    fn matches(&self, stored: &T, probe: &T) -> bool {
        stored == probe
    }
}

/// 32-byte key padded with zeros, aligned for whole-register comparison.
#[derive(Clone, Copy, Eq)]
#[repr(C, align(32))]
pub struct WideKey([u8; 32]);

impl WideKey {
    pub const WIDTH: usize = 32;
    pub const ZERO: WideKey = WideKey([0; 32]);

    /// Copy up to [`WIDTH`](WideKey::WIDTH) bytes of `bytes`; the rest is
    /// zero filled.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 32];
        let n = bytes.len().min(Self::WIDTH);
        raw[..n].copy_from_slice(&bytes[..n]);
        WideKey(raw)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The key as four little-endian 64-bit lanes.
    #[inline]
    pub fn lanes(&self) -> [u64; 4] {
        bytemuck::cast::<[u8; 32], [u64; 4]>(self.0).map(u64::from_le)
    }
}

impl PartialEq for WideKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        let a = self.lanes();
        let b = other.lanes();
        ((a[0] ^ b[0]) | (a[1] ^ b[1]) | (a[2] ^ b[2]) | (a[3] ^ b[3])) == 0
    }
}

impl Hash for WideKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Default for WideKey {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<&str> for WideKey {
    fn from(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }
}

impl fmt::Debug for WideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.0.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        write!(f, "WideKey({:?})", String::from_utf8_lossy(&self.0[..end]))
    }
}
