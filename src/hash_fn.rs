//! Hash functions over byte ranges.
//!
//! Every function here is pure, deterministic and reads only the slice it
//! is given. They range from deliberately poor (constant, first byte,
//! length) to well mixed (`murmur`), so a table can be used to compare
//! chain-length distributions across them.
//!
//! `murmur` is the portable reference. `murmur_words` is the fast path for
//! keys that are already laid out as 64-bit lanes and must agree with
//! `murmur` on the same bytes.

/// Signature shared by every hash function in this module.
pub type HashFn = fn(&[u8]) -> u64;

const BIG_PRIME: u64 = 95_966_417;
const STEP_MULTIPLIER: u64 = 52_196_849;

const MURMUR_SEED: u64 = 0xBAAD_F00D_DEAD_BEEF;
const MURMUR_M1: u64 = 0xDED1_5DED;
const MURMUR_M2: u64 = 0xCADA_B8A9;
const MURMUR_M3: u64 = 0x112C_13AB;
const MURMUR_ADD: u64 = 0x0314_1592_6535_8979;

/// Every named hash function, for callers that sweep across them.
pub const ALL: [(&str, HashFn); 10] = [
    ("constant", constant),
    ("first_byte", first_byte),
    ("length", length),
    ("sum", sum),
    ("rotate_left", rotate_left),
    ("rotate_right", rotate_right),
    ("poly", poly),
    ("identity", identity),
    ("multiplicative", multiplicative),
    ("murmur", murmur),
];

pub fn constant(_bytes: &[u8]) -> u64 {
    1
}

pub fn first_byte(bytes: &[u8]) -> u64 {
    bytes.first().copied().map_or(0, u64::from)
}

/// Length up to the first NUL byte.
pub fn length(bytes: &[u8]) -> u64 {
    bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len()) as u64
}

pub fn sum(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &b| acc.wrapping_add(u64::from(b)))
}

pub fn rotate_left(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &b| acc.rotate_left(1) ^ u64::from(b))
}

pub fn rotate_right(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &b| acc.rotate_right(1) ^ u64::from(b))
}

pub fn poly(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| {
        (acc + u64::from(b)) * STEP_MULTIPLIER % BIG_PRIME
    })
}

/// First eight bytes as a little-endian integer, zero padded.
pub fn identity(bytes: &[u8]) -> u64 {
    load_word(bytes)
}

pub fn multiplicative(bytes: &[u8]) -> u64 {
    identity(bytes).wrapping_mul(BIG_PRIME)
}

/// Murmur-style mixer over little-endian 64-bit words. A trailing partial
/// word is zero padded.
pub fn murmur(bytes: &[u8]) -> u64 {
    bytes
        .chunks(8)
        .map(load_word)
        .fold(MURMUR_SEED, murmur_step)
}

/// `murmur` over words that are already loaded. Equal to `murmur` on the
/// little-endian bytes of `words`.
pub fn murmur_words(words: &[u64]) -> u64 {
    words.iter().copied().fold(MURMUR_SEED, murmur_step)
}

#[inline(always)]
fn murmur_step(state: u64, word: u64) -> u64 {
    let mut cur = word.wrapping_mul(MURMUR_M1).rotate_left(31);
    cur = cur.wrapping_mul(MURMUR_M2) ^ state;
    cur.rotate_left(15)
        .wrapping_mul(MURMUR_M3)
        .wrapping_add(MURMUR_ADD)
}

#[inline]
fn load_word(bytes: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    let n = bytes.len().min(8);
    raw[..n].copy_from_slice(&bytes[..n]);
    u64::from_le_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::WideKey;

    #[test]
    fn trivial_hashes() {
        assert_eq!(constant(b"anything"), 1);
        assert_eq!(first_byte(b"abc"), u64::from(b'a'));
        assert_eq!(first_byte(b""), 0);
        assert_eq!(length(b"abc\0\0\0"), 3);
        assert_eq!(length(b"abcd"), 4);
        assert_eq!(sum(b"ab"), 97 + 98);
    }

    #[test]
    fn rotating_hashes_depend_on_order() {
        assert_ne!(rotate_left(b"ab"), rotate_left(b"ba"));
        assert_ne!(rotate_right(b"ab"), rotate_right(b"ba"));
        assert_eq!(rotate_left(b"ab"), (97u64 << 1) ^ 98);
    }

    #[test]
    fn poly_stays_below_prime() {
        for word in [&b"a"[..], b"hello world", &[0xffu8; 64]] {
            assert!(poly(word) < BIG_PRIME);
        }
        assert_eq!(poly(b"a"), 97 * STEP_MULTIPLIER % BIG_PRIME);
    }

    #[test]
    fn identity_reads_at_most_one_word() {
        assert_eq!(identity(&[1, 0, 0, 0, 0, 0, 0, 0, 9]), 1);
        assert_eq!(identity(&[2]), 2);
        assert_eq!(multiplicative(&[2]), 2 * BIG_PRIME);
    }

    #[test]
    fn murmur_pads_partial_word() {
        assert_eq!(murmur(b"abc"), murmur(b"abc\0\0\0\0\0"));
        assert_ne!(murmur(b"abc"), murmur(b"abd"));
        assert_eq!(murmur(b""), MURMUR_SEED);
    }

    /// Invariant: the word fast path matches the portable reference.
    #[test]
    fn murmur_words_matches_reference() {
        for text in ["", "a", "hashing", "a somewhat longer key for lanes"] {
            let key = WideKey::from(text);
            let words: Vec<u64> = key
                .as_bytes()
                .chunks(8)
                .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
                .collect();
            assert_eq!(murmur_words(&words), murmur(key.as_bytes()));
        }
    }

    #[test]
    fn all_functions_are_deterministic() {
        for (name, f) in ALL {
            assert_eq!(f(b"repeatable"), f(b"repeatable"), "{name}");
        }
    }
}
