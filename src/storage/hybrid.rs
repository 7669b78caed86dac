//! Inline + overflow word storage.
//!
//! Word 0 is a plain `u64` owned by the host; words `1..` live in an overflow `Vec<u64>` at index
//! `k - 1`. A host with fewer than 65 bits in use never allocates.
//!
//! Any struct with a `u64` field and a `Vec<u64>` field can get this layout through
//! [`hybrid_word_storage!`](crate::hybrid_word_storage); [`CompactBits`] is the standalone
//! version of such a host.

use std::fmt;

use datasize::DataSize;

use crate::bitvec::{words_eq, BitVec, BitVecMut};
use crate::errors::BitsError;
use crate::storage::{grown_len, trimmed_len, try_grow};

/// Implements [`WordStorage`](crate::storage::WordStorage) and
/// [`WordStorageMut`](crate::storage::WordStorageMut) for a host type, storing word 0 in the
/// `u64` field `$inline` and the remaining words in the `Vec<u64>` field `$overflow`.
///
/// ```
/// use compact_bits::{hybrid_word_storage, BitVec, BitVecMut};
///
/// #[derive(Default)]
/// struct Order {
///     id: u64,
///     flags: u64,
///     more_flags: Vec<u64>,
/// }
///
/// hybrid_word_storage!(Order, flags, more_flags);
///
/// let mut order = Order::default();
/// order.set(3).unwrap();
/// order.set(130).unwrap();
/// assert_eq!(order.flags, 1 << 3);
/// assert_eq!(order.cardinality(), 2);
/// ```
#[macro_export]
macro_rules! hybrid_word_storage {
    ($host:ty, $inline:ident, $overflow:ident) => {
        impl $crate::storage::WordStorage for $host {
            #[inline]
            fn word(&self, index: usize) -> u64 {
                $crate::storage::hybrid::word(self.$inline, &self.$overflow, index)
            }

            #[inline]
            fn word_count(&self) -> usize {
                1 + self.$overflow.len()
            }
        }

        impl $crate::storage::WordStorageMut for $host {
            #[inline]
            fn set_word(&mut self, index: usize, value: u64) {
                let (inline, overflow) = (&mut self.$inline, &mut self.$overflow);
                $crate::storage::hybrid::set_word(inline, overflow, index, value)
            }

            fn ensure_capacity(&mut self, min_words: usize) -> Result<(), $crate::BitsError> {
                $crate::storage::hybrid::ensure_capacity(&mut self.$overflow, min_words)
            }

            fn trim(&mut self) {
                $crate::storage::hybrid::trim(&mut self.$overflow)
            }
        }
    };
}

#[doc(hidden)]
#[inline]
pub fn word(inline: u64, overflow: &[u64], index: usize) -> u64 {
    match index {
        0 => inline,
        _ => overflow.get(index - 1).copied().unwrap_or(0),
    }
}

#[doc(hidden)]
#[inline]
pub fn set_word(inline: &mut u64, overflow: &mut [u64], index: usize, value: u64) {
    match index {
        0 => *inline = value,
        _ => overflow[index - 1] = value,
    }
}

#[doc(hidden)]
pub fn ensure_capacity(overflow: &mut Vec<u64>, min_words: usize) -> Result<(), BitsError> {
    // Word 0 is always addressable.
    if min_words <= 1 {
        return Ok(());
    }
    let min_overflow = min_words - 1;
    if overflow.len() >= min_overflow {
        return Ok(());
    }
    let new_len = grown_len(overflow.len(), min_overflow);
    try_grow(overflow, new_len, new_len.saturating_add(1))
}

#[doc(hidden)]
pub fn trim(overflow: &mut Vec<u64>) {
    let len = trimmed_len(overflow);
    if len == 0 {
        if overflow.capacity() != 0 {
            log::trace!("releasing overflow buffer of {} words", overflow.capacity());
            *overflow = Vec::new();
        }
    } else {
        overflow.truncate(len);
    }
}

/// A bit vector that keeps its first 64 bits inline and spills the rest to the heap.
#[derive(Clone, Default, DataSize)]
pub struct CompactBits {
    inline: u64,
    overflow: Vec<u64>,
}

hybrid_word_storage!(CompactBits, inline, overflow);

impl CompactBits {
    pub const fn new() -> CompactBits {
        CompactBits {
            inline: 0,
            overflow: Vec::new(),
        }
    }

    pub fn from_words(words: &[u64]) -> Result<CompactBits, BitsError> {
        let mut bits = CompactBits::new();
        bits.fill(words)?;
        Ok(bits)
    }

    /// Whether an overflow buffer is currently allocated.
    pub fn is_spilled(&self) -> bool {
        self.overflow.capacity() != 0
    }

    /// Allocated overflow words, including growth headroom.
    pub fn overflow_capacity(&self) -> usize {
        self.overflow.capacity()
    }
}

impl PartialEq for CompactBits {
    fn eq(&self, other: &CompactBits) -> bool {
        words_eq(self, other)
    }
}

impl Eq for CompactBits {}

impl fmt::Debug for CompactBits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.ones()).finish()
    }
}
