//! Storage-agnostic bit vectors.
//!
//! The bit-set algorithms ([`BitVec`], [`BitVecMut`]) are written once against the
//! [`WordStorage`] / [`WordStorageMut`] traits and work with any backend that implements them:
//!
//! * [`CompactBits`] keeps word 0 inline and spills further words into an overflow buffer, so a
//!   vector that never uses more than 64 bits never allocates.
//! * [`HeapWords`] keeps all words in a single heap buffer.
//! * Any host struct can adopt the inline + overflow layout for its own fields with
//!   [`hybrid_word_storage!`], or implement the storage traits by hand.
//!
//! ```
//! use compact_bits::{BitVec, BitVecMut, CompactBits};
//!
//! let mut bits = CompactBits::new();
//! bits.set_range(60, 70)?;
//! assert_eq!(bits.cardinality(), 10);
//! assert_eq!(bits.next_clear_bit(60)?, 70);
//! assert_eq!(bits.to_word_array(), vec![0xF000_0000_0000_0000, 0x3F]);
//! # Ok::<(), compact_bits::BitsError>(())
//! ```
mod errors;
pub mod storage;
pub mod bitvec;

pub use crate::bitvec::{BitVec, BitVecMut, Ones};
pub use crate::errors::{BitIndex, BitsError};
pub use crate::storage::{CompactBits, HeapWords, WordStorage, WordStorageMut};
