//! Word storage backends.
//!
//! The bit-vector algorithms in [`crate::bitvec`] only ever talk to storage through these two
//! traits. A backend decides where each 64-bit word physically lives; the algorithms never know
//! whether word `k` is inline in the host, on the heap, or somewhere else.

pub mod heap;
pub mod hybrid;

pub use self::heap::HeapWords;
pub use self::hybrid::CompactBits;

use crate::errors::BitsError;

pub const BITS_PER_WORD: usize = 64;
pub const ADDRESS_BITS_PER_WORD: u32 = 6;

#[inline]
pub fn word_index(bit: usize) -> usize {
    bit >> ADDRESS_BITS_PER_WORD
}

#[inline]
pub fn bit_offset(bit: usize) -> u32 {
    (bit & (BITS_PER_WORD - 1)) as u32
}

/// Read access to a sequence of words.
pub trait WordStorage {
    /// Returns word `index`, or 0 if `index >= self.word_count()`.
    fn word(&self, index: usize) -> u64;

    /// Number of addressable words. Bits at or beyond `word_count() * 64` are implicitly zero.
    fn word_count(&self) -> usize;
}

/// Write access to a sequence of words.
pub trait WordStorageMut: WordStorage {
    /// Overwrites word `index`.
    ///
    /// Callers must make `index` addressable with [`ensure_capacity`](Self::ensure_capacity)
    /// first; writing past `word_count()` panics. Writing zero never shrinks the storage.
    fn set_word(&mut self, index: usize, value: u64);

    /// Guarantees `word_count() >= min_words`, growing geometrically.
    ///
    /// On error the storage is left untouched.
    fn ensure_capacity(&mut self, min_words: usize) -> Result<(), BitsError>;

    /// Drops trailing zero words.
    fn trim(&mut self) {}
}

/// Length to grow a buffer of `current` words to so that it holds at least `min` words.
#[inline]
pub(crate) fn grown_len(current: usize, min: usize) -> usize {
    let doubled = if current == 0 { 1 } else { current.saturating_mul(2) };
    doubled.max(min)
}

/// Grows `words` to `new_len` zeroed words, reserving before touching the buffer.
pub(crate) fn try_grow(
    words: &mut Vec<u64>,
    new_len: usize,
    total_words: usize,
) -> Result<(), BitsError> {
    debug_assert!(new_len >= words.len());
    words
        .try_reserve_exact(new_len - words.len())
        .map_err(|_| BitsError::CapacityExhausted { words: total_words })?;
    log::trace!("growing word buffer from {} to {} words", words.len(), new_len);
    words.resize(new_len, 0);
    Ok(())
}

/// Number of words left after dropping trailing zeros.
#[inline]
pub(crate) fn trimmed_len(words: &[u64]) -> usize {
    words.iter().rposition(|&w| w != 0).map_or(0, |i| i + 1)
}
