//! Bit-set operations over any [`WordStorage`].
//!
//! [`BitVec`] and [`BitVecMut`] are implemented for every storage backend, so the same code runs
//! against inline, heap or host-defined layouts and is monomorphized per backend. All results are
//! identical to a plain array of booleans that is zero beyond `size()`.

use crate::errors::{check_range, BitIndex, BitsError};
use crate::storage::{
    bit_offset, trimmed_len, word_index, WordStorage, WordStorageMut, ADDRESS_BITS_PER_WORD,
    BITS_PER_WORD,
};

const WORD_MASK: u64 = u64::MAX;

/// Bits at offset `>= bit_offset(from)` within the first word of a range.
#[inline]
fn first_word_mask(from: usize) -> u64 {
    WORD_MASK << bit_offset(from)
}

/// Bits at offset `< bit_offset(to)` within the last word of a range, where the last word is
/// `word_index(to - 1)`. A word-aligned `to` covers the whole word.
#[inline]
fn last_word_mask(to: usize) -> u64 {
    match bit_offset(to) {
        0 => WORD_MASK,
        offset => WORD_MASK >> (BITS_PER_WORD as u32 - offset),
    }
}

#[inline]
fn bit_mask(index: usize) -> u64 {
    1 << bit_offset(index)
}

#[inline]
fn word_start(word_index: usize) -> usize {
    word_index << ADDRESS_BITS_PER_WORD
}

pub trait BitVec: WordStorage {
    fn get<I: BitIndex>(&self, index: I) -> Result<bool, BitsError> {
        let index = index.bit_index()?;
        Ok(self.word(word_index(index)) & bit_mask(index) != 0)
    }

    /// Lowest set bit at or after `from`, or `None` if there is none within `size()`.
    fn next_set_bit<I: BitIndex>(&self, from: I) -> Result<Option<usize>, BitsError> {
        let from = from.bit_index()?;
        Ok(next_one(self, from))
    }

    /// Lowest clear bit at or after `from`.
    ///
    /// Never fails to find one: when every addressable bit from `from` on is set, the result is
    /// `size()`, the first bit of the implicit zero tail. A `from >= size()` is returned as is.
    fn next_clear_bit<I: BitIndex>(&self, from: I) -> Result<usize, BitsError> {
        let from = from.bit_index()?;
        let count = self.word_count();
        let mut index = word_index(from);
        if index >= count {
            return Ok(from);
        }
        let mut word = !self.word(index) & first_word_mask(from);
        loop {
            if word != 0 {
                return Ok(word_start(index) + word.trailing_zeros() as usize);
            }
            index += 1;
            if index >= count {
                return Ok(word_start(count));
            }
            word = !self.word(index);
        }
    }

    /// One past the highest set bit, or 0 if no bit is set.
    fn length(&self) -> usize {
        (0..self.word_count())
            .rev()
            .map(|i| (i, self.word(i)))
            .find(|&(_, word)| word != 0)
            .map_or(0, |(i, word)| word_start(i) + BITS_PER_WORD - word.leading_zeros() as usize)
    }

    fn is_empty(&self) -> bool {
        (0..self.word_count()).all(|i| self.word(i) == 0)
    }

    fn cardinality(&self) -> usize {
        (0..self.word_count())
            .map(|i| self.word(i).count_ones() as usize)
            .sum()
    }

    /// Addressable bits, `word_count() * 64`.
    fn size(&self) -> usize {
        word_start(self.word_count())
    }

    /// Exactly `word_count()` words, least significant first.
    fn to_word_array(&self) -> Vec<u64> {
        (0..self.word_count()).map(|i| self.word(i)).collect()
    }

    /// Like [`to_word_array`](Self::to_word_array) without trailing zero words.
    fn to_compact_words(&self) -> Vec<u64> {
        let mut words = self.to_word_array();
        words.truncate(trimmed_len(&words));
        words
    }

    /// Iterates over the indices of set bits in increasing order.
    fn ones(&self) -> Ones<'_, Self> {
        Ones { bits: self, next: 0 }
    }
}

impl<T: WordStorage + ?Sized> BitVec for T {}

pub trait BitVecMut: WordStorageMut {
    fn set<I: BitIndex>(&mut self, index: I) -> Result<(), BitsError> {
        let index = index.bit_index()?;
        let w = word_index(index);
        self.ensure_capacity(w + 1)?;
        let word = self.word(w) | bit_mask(index);
        self.set_word(w, word);
        Ok(())
    }

    fn set_to<I: BitIndex>(&mut self, index: I, value: bool) -> Result<(), BitsError> {
        if value {
            self.set(index)
        } else {
            self.clear(index)
        }
    }

    /// Sets every bit in `[from, to)`, growing the storage as needed.
    fn set_range<F: BitIndex, T: BitIndex>(&mut self, from: F, to: T) -> Result<(), BitsError> {
        let (from, to) = check_range(from, to)?;
        if from == to {
            return Ok(());
        }
        let first = word_index(from);
        let last = word_index(to - 1);
        self.ensure_capacity(last + 1)?;
        let first_mask = first_word_mask(from);
        let last_mask = last_word_mask(to);
        if first == last {
            let word = self.word(first) | (first_mask & last_mask);
            self.set_word(first, word);
        } else {
            let word = self.word(first) | first_mask;
            self.set_word(first, word);
            for i in first + 1..last {
                self.set_word(i, WORD_MASK);
            }
            let word = self.word(last) | last_mask;
            self.set_word(last, word);
        }
        Ok(())
    }

    fn set_range_to<F: BitIndex, T: BitIndex>(
        &mut self,
        from: F,
        to: T,
        value: bool,
    ) -> Result<(), BitsError> {
        if value {
            self.set_range(from, to)
        } else {
            self.clear_range(from, to)
        }
    }

    /// Clears bit `index`. Never grows the storage.
    fn clear<I: BitIndex>(&mut self, index: I) -> Result<(), BitsError> {
        let index = index.bit_index()?;
        let w = word_index(index);
        if w >= self.word_count() {
            return Ok(());
        }
        let word = self.word(w) & !bit_mask(index);
        self.set_word(w, word);
        Ok(())
    }

    /// Clears every bit in `[from, to)`.
    ///
    /// Unlike [`set_range`](Self::set_range) this never grows the storage: the part of the range
    /// beyond `size()` is already zero and is skipped.
    fn clear_range<F: BitIndex, T: BitIndex>(&mut self, from: F, to: T) -> Result<(), BitsError> {
        let (from, mut to) = check_range(from, to)?;
        if from == to {
            return Ok(());
        }
        let count = self.word_count();
        let first = word_index(from);
        if first >= count {
            return Ok(());
        }
        let mut last = word_index(to - 1);
        if last >= count {
            log::trace!("clearing [{}, {}) clamped to {} words", from, to, count);
            last = count - 1;
            to = word_start(count);
        }
        let first_mask = first_word_mask(from);
        let last_mask = last_word_mask(to);
        if first == last {
            let word = self.word(first) & !(first_mask & last_mask);
            self.set_word(first, word);
        } else {
            let word = self.word(first) & !first_mask;
            self.set_word(first, word);
            for i in first + 1..last {
                self.set_word(i, 0);
            }
            let word = self.word(last) & !last_mask;
            self.set_word(last, word);
        }
        Ok(())
    }

    /// Zeroes every addressable word. The word count is kept until [`trim`](WordStorageMut::trim).
    fn clear_all(&mut self) {
        for i in 0..self.word_count() {
            self.set_word(i, 0);
        }
    }

    /// Replaces the whole content with `words`, least significant first, and trims.
    fn fill(&mut self, words: &[u64]) -> Result<(), BitsError> {
        let len = trimmed_len(words);
        self.ensure_capacity(len)?;
        for (i, &word) in words[..len].iter().enumerate() {
            self.set_word(i, word);
        }
        for i in len..self.word_count() {
            self.set_word(i, 0);
        }
        self.trim();
        log::debug!(
            "filled {} words ({} trailing zero words ignored), word count now {}",
            len,
            words.len() - len,
            self.word_count()
        );
        Ok(())
    }
}

impl<T: WordStorageMut + ?Sized> BitVecMut for T {}

/// Logical equality of two word sequences, treating missing words as zero.
pub fn words_eq<A, B>(a: &A, b: &B) -> bool
where
    A: WordStorage + ?Sized,
    B: WordStorage + ?Sized,
{
    let count = a.word_count().max(b.word_count());
    (0..count).all(|i| a.word(i) == b.word(i))
}

fn next_one<S: WordStorage + ?Sized>(bits: &S, from: usize) -> Option<usize> {
    let count = bits.word_count();
    let mut index = word_index(from);
    if index >= count {
        return None;
    }
    let mut word = bits.word(index) & first_word_mask(from);
    loop {
        if word != 0 {
            return Some(word_start(index) + word.trailing_zeros() as usize);
        }
        index += 1;
        if index >= count {
            return None;
        }
        word = bits.word(index);
    }
}

/// Iterator over set bit indices, see [`BitVec::ones`].
pub struct Ones<'a, S: ?Sized> {
    bits: &'a S,
    next: usize,
}

impl<S: WordStorage + ?Sized> Iterator for Ones<'_, S> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let found = next_one(self.bits, self.next)?;
        self.next = found + 1;
        Some(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CompactBits, HeapWords};
    use pretty_assertions::assert_eq;

    fn bits_of<S: BitVec>(bits: &S, upto: usize) -> Vec<usize> {
        (0..upto).filter(|&i| bits.get(i).unwrap()).collect()
    }

    #[test]
    fn test_masks() {
        assert_eq!(first_word_mask(0), u64::MAX);
        assert_eq!(first_word_mask(60), 0xF000_0000_0000_0000);
        assert_eq!(last_word_mask(64), u64::MAX);
        assert_eq!(last_word_mask(70), 0x3F);
        assert_eq!(last_word_mask(1), 1);
        assert_eq!(first_word_mask(5) & last_word_mask(10), 0b11_1110_0000);
    }

    fn check_set_get<S: BitVecMut + BitVec + Default>() {
        let mut bits = S::default();
        for i in [0, 31, 63, 64, 100, 127] {
            bits.set(i).unwrap();
        }
        assert_eq!(bits_of(&bits, 200), vec![0, 31, 63, 64, 100, 127]);
        assert!(!bits.get(128).unwrap());
        assert!(!bits.get(1_000_000).unwrap());
        bits.clear(31).unwrap();
        bits.set_to(100, false).unwrap();
        bits.set_to(101, true).unwrap();
        assert_eq!(bits_of(&bits, 200), vec![0, 63, 64, 101, 127]);
    }

    #[test]
    fn test_set_get() {
        check_set_get::<CompactBits>();
        check_set_get::<HeapWords>();
    }

    fn check_ranges<S: BitVecMut + BitVec + Default>() {
        let mut bits = S::default();
        bits.set_range(5, 10).unwrap();
        assert_eq!(bits_of(&bits, 64), vec![5, 6, 7, 8, 9]);

        let mut bits = S::default();
        bits.set_range(60, 70).unwrap();
        assert_eq!(bits_of(&bits, 128), (60..70).collect::<Vec<_>>());

        let mut bits = S::default();
        bits.set_range(100, 164).unwrap();
        assert_eq!(bits.cardinality(), 64);
        assert_eq!(bits.next_set_bit(0).unwrap(), Some(100));
        assert_eq!(bits.length(), 164);

        let mut bits = S::default();
        bits.set_range(0, 200).unwrap();
        assert_eq!(bits.cardinality(), 200);
        bits.clear_range(50, 100).unwrap();
        let expected: Vec<usize> = (0..50).chain(100..200).collect();
        assert_eq!(bits_of(&bits, 300), expected);

        bits.set_range_to(0, 64, false).unwrap();
        bits.set_range_to(300, 301, true).unwrap();
        assert_eq!(bits.next_set_bit(0).unwrap(), Some(100));
        assert_eq!(bits.length(), 301);
    }

    #[test]
    fn test_ranges() {
        check_ranges::<CompactBits>();
        check_ranges::<HeapWords>();
    }

    #[test]
    fn test_empty_range_is_noop() {
        let mut bits = HeapWords::default();
        bits.set_range(500, 500).unwrap();
        bits.clear_range(500, 500).unwrap();
        assert_eq!(bits.word_count(), 0);
    }

    #[test]
    fn test_word_aligned_ranges() {
        let mut bits = CompactBits::new();
        bits.set_range(64, 128).unwrap();
        assert_eq!(bits.to_word_array(), vec![0, u64::MAX]);
        bits.set_range(0, 64).unwrap();
        bits.clear_range(0, 128).unwrap();
        assert!(bits.is_empty());
        bits.set_range(0, 192).unwrap();
        bits.clear_range(64, 128).unwrap();
        assert_eq!(&bits.to_word_array()[..3], &[u64::MAX, 0, u64::MAX]);
    }

    #[test]
    fn test_clear_beyond_capacity_does_not_grow() {
        let mut bits = CompactBits::new();
        bits.set_range(10, 20).unwrap();
        bits.clear(5000).unwrap();
        bits.clear_range(1000, 5000).unwrap();
        assert_eq!(bits.word_count(), 1);
        bits.clear_range(15, 5000).unwrap();
        assert_eq!(bits.word_count(), 1);
        assert_eq!(bits_of(&bits, 64), (10..15).collect::<Vec<_>>());
    }

    #[test]
    fn test_argument_errors() {
        let mut bits = CompactBits::new();
        assert_eq!(bits.set(-1), Err(BitsError::NegativeIndex(-1)));
        assert_eq!(bits.get(-1), Err(BitsError::NegativeIndex(-1)));
        assert_eq!(bits.clear(-7i64), Err(BitsError::NegativeIndex(-7)));
        assert_eq!(bits.next_set_bit(-1), Err(BitsError::NegativeIndex(-1)));
        assert_eq!(bits.next_clear_bit(-2), Err(BitsError::NegativeIndex(-2)));
        assert_eq!(bits.set_range(10, 5), Err(BitsError::InvalidRange { from: 10, to: 5 }));
        assert_eq!(bits.set_range(-1, 10), Err(BitsError::NegativeIndex(-1)));
        assert_eq!(bits.set_range(10, -5), Err(BitsError::NegativeIndex(-5)));
        assert_eq!(bits.clear_range(3, 2), Err(BitsError::InvalidRange { from: 3, to: 2 }));
        // Nothing was applied.
        assert!(bits.is_empty());
        assert_eq!(bits.word_count(), 1);
    }

    #[test]
    fn test_cardinality_length_is_empty() {
        let mut bits = CompactBits::new();
        assert!(bits.is_empty());
        bits.set(0).unwrap();
        bits.set(1).unwrap();
        bits.set(64).unwrap();
        assert_eq!(bits.cardinality(), 3);
        bits.clear(1).unwrap();
        assert_eq!(bits.cardinality(), 2);

        let mut bits = CompactBits::new();
        bits.set(0).unwrap();
        assert_eq!(bits.length(), 1);
        bits.set(10).unwrap();
        assert_eq!(bits.length(), 11);
        bits.set(100).unwrap();
        assert_eq!(bits.length(), 101);
        bits.clear(100).unwrap();
        assert_eq!(bits.length(), 11);
        bits.clear_all();
        assert_eq!(bits.length(), 0);
        assert!(bits.is_empty());
        assert_eq!(bits.cardinality(), 0);
    }

    #[test]
    fn test_clear_all_keeps_word_count() {
        let mut bits = HeapWords::default();
        bits.set_range(0, 100).unwrap();
        let count = bits.word_count();
        bits.clear_all();
        assert!(bits.is_empty());
        assert_eq!(bits.word_count(), count);
        bits.trim();
        assert_eq!(bits.word_count(), 0);
    }

    #[test]
    fn test_empty_vectors() {
        let hybrid = CompactBits::new();
        assert_eq!(hybrid.size(), 64);
        assert!(hybrid.is_empty());
        assert_eq!(hybrid.cardinality(), 0);
        assert_eq!(hybrid.next_clear_bit(0).unwrap(), 0);
        assert_eq!(hybrid.next_set_bit(0).unwrap(), None);

        let heap = HeapWords::new();
        assert_eq!(heap.size(), 0);
        assert!(heap.is_empty());
        assert_eq!(heap.cardinality(), 0);
        assert_eq!(heap.next_clear_bit(0).unwrap(), 0);
        assert_eq!(heap.to_word_array(), Vec::<u64>::new());
    }

    #[test]
    fn test_next_set_bit() {
        let mut bits = CompactBits::new();
        for i in [5, 10, 100] {
            bits.set(i).unwrap();
        }
        assert_eq!(bits.next_set_bit(0).unwrap(), Some(5));
        assert_eq!(bits.next_set_bit(5).unwrap(), Some(5));
        assert_eq!(bits.next_set_bit(6).unwrap(), Some(10));
        assert_eq!(bits.next_set_bit(50).unwrap(), Some(100));
        assert_eq!(bits.next_set_bit(101).unwrap(), None);
        assert_eq!(bits.next_set_bit(200).unwrap(), None);
    }

    #[test]
    fn test_next_clear_bit() {
        let mut bits = CompactBits::new();
        bits.set_range(0, 10).unwrap();
        assert_eq!(bits.next_clear_bit(0).unwrap(), 10);
        assert_eq!(bits.next_clear_bit(5).unwrap(), 10);
        assert_eq!(bits.next_clear_bit(10).unwrap(), 10);
        assert_eq!(bits.next_clear_bit(11).unwrap(), 11);

        let mut bits = CompactBits::new();
        bits.set_range(0, 64).unwrap();
        assert_eq!(bits.next_clear_bit(0).unwrap(), 64);
        bits.set_range(64, 128).unwrap();
        assert_eq!(bits.next_clear_bit(3).unwrap(), bits.size());
        assert_eq!(bits.next_clear_bit(500).unwrap(), 500);
        assert_eq!(bits.next_clear_bit(128).unwrap(), 128);
        assert_eq!(bits.next_clear_bit(130).unwrap(), 130);
        assert_eq!(HeapWords::new().next_clear_bit(77).unwrap(), 77);
    }

    #[test]
    fn test_fill_and_export() {
        let mut bits = CompactBits::new();
        bits.fill(&[0xFF, 0x00, 0x0F]).unwrap();
        assert_eq!(bits.to_word_array(), vec![0xFF, 0x00, 0x0F]);
        assert_eq!(bits.cardinality(), 12);

        bits.fill(&[0x01, 0x00, 0x00]).unwrap();
        assert_eq!(bits.to_word_array(), vec![0x01]);

        let mut heap = HeapWords::new();
        heap.set(1000).unwrap();
        heap.fill(&[0, 0x80]).unwrap();
        assert_eq!(heap.to_word_array(), vec![0, 0x80]);
        heap.fill(&[]).unwrap();
        assert_eq!(heap.word_count(), 0);
    }

    #[test]
    fn test_compact_words() {
        let mut bits = CompactBits::new();
        bits.set(0).unwrap();
        bits.set(64).unwrap();
        bits.set(128).unwrap();
        assert_eq!(bits.to_word_array(), vec![1, 1, 1]);
        bits.set(500).unwrap();
        bits.clear(500).unwrap();
        assert!(bits.to_word_array().len() > 3);
        assert_eq!(bits.to_compact_words(), vec![1, 1, 1]);
        assert_eq!(CompactBits::new().to_compact_words(), Vec::<u64>::new());
    }

    #[test]
    fn test_ones() {
        let mut bits = CompactBits::new();
        for i in [0, 63, 64, 65, 191, 400] {
            bits.set(i).unwrap();
        }
        assert_eq!(bits.ones().collect::<Vec<_>>(), vec![0, 63, 64, 65, 191, 400]);
        assert_eq!(HeapWords::new().ones().count(), 0);
    }

    #[test]
    fn test_words_eq_across_backends() {
        let mut hybrid = CompactBits::new();
        let mut heap = HeapWords::new();
        hybrid.set_range(3, 90).unwrap();
        heap.set_range(3, 90).unwrap();
        heap.set(2000).unwrap();
        assert!(!words_eq(&hybrid, &heap));
        heap.clear(2000).unwrap();
        assert!(words_eq(&hybrid, &heap));
    }
}
