use std::fmt;

use datasize::DataSize;

use crate::bitvec::{words_eq, BitVec};
use crate::errors::BitsError;
use crate::storage::{grown_len, trimmed_len, try_grow, WordStorage, WordStorageMut};

/// All words in one heap-allocated buffer. Starts out with no words at all.
#[derive(Clone, Default, DataSize)]
pub struct HeapWords {
    words: Vec<u64>,
}

impl HeapWords {
    pub const fn new() -> HeapWords {
        HeapWords { words: Vec::new() }
    }

    /// Creates storage with `count` zeroed, addressable words.
    pub fn with_words(count: usize) -> Result<HeapWords, BitsError> {
        let mut words = Vec::new();
        try_grow(&mut words, count, count)?;
        Ok(HeapWords { words })
    }

    pub fn as_words(&self) -> &[u64] {
        &self.words
    }
}

impl WordStorage for HeapWords {
    #[inline]
    fn word(&self, index: usize) -> u64 {
        self.words.get(index).copied().unwrap_or(0)
    }

    #[inline]
    fn word_count(&self) -> usize {
        self.words.len()
    }
}

impl WordStorageMut for HeapWords {
    #[inline]
    fn set_word(&mut self, index: usize, value: u64) {
        self.words[index] = value;
    }

    fn ensure_capacity(&mut self, min_words: usize) -> Result<(), BitsError> {
        if self.words.len() >= min_words {
            return Ok(());
        }
        let new_len = grown_len(self.words.len(), min_words);
        try_grow(&mut self.words, new_len, new_len)
    }

    fn trim(&mut self) {
        let len = trimmed_len(&self.words);
        self.words.truncate(len);
    }
}

impl PartialEq for HeapWords {
    fn eq(&self, other: &HeapWords) -> bool {
        words_eq(self, other)
    }
}

impl Eq for HeapWords {}

impl fmt::Debug for HeapWords {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.ones()).finish()
    }
}
