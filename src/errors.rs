use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitsError {
    #[error("bit index < 0: {0}")]
    NegativeIndex(i64),
    /// Only reachable where `usize` is narrower than 64 bits, for `u64`/`i64` indices.
    #[error("bit index does not fit in usize")]
    IndexOverflow,
    #[error("from index {from} > to index {to}")]
    InvalidRange { from: usize, to: usize },
    #[error("failed to grow word storage to {words} words")]
    CapacityExhausted { words: usize },
}

macro_rules! ensure {
    ($cond:expr, $e:expr) => {
        if !($cond) {
            return Err($e);
        }
    };
}

/// Conversion of caller-supplied indices into bit positions.
///
/// Signed types reject negative values with [`BitsError::NegativeIndex`] before any word is read
/// or written.
pub trait BitIndex: Copy {
    fn bit_index(self) -> Result<usize, BitsError>;
}

macro_rules! signed_bit_index {
    ($($t:ty),*) => {
        $(
            impl BitIndex for $t {
                #[inline]
                fn bit_index(self) -> Result<usize, BitsError> {
                    ensure!(self >= 0, BitsError::NegativeIndex(self as i64));
                    usize::try_from(self).map_err(|_| BitsError::IndexOverflow)
                }
            }
        )*
    };
}

macro_rules! unsigned_bit_index {
    ($($t:ty),*) => {
        $(
            impl BitIndex for $t {
                #[inline]
                fn bit_index(self) -> Result<usize, BitsError> {
                    usize::try_from(self).map_err(|_| BitsError::IndexOverflow)
                }
            }
        )*
    };
}

signed_bit_index!(i8, i16, i32, i64, isize);
unsigned_bit_index!(u8, u16, u32, u64, usize);

/// Validates a half-open range `[from, to)`.
pub(crate) fn check_range<F: BitIndex, T: BitIndex>(
    from: F,
    to: T,
) -> Result<(usize, usize), BitsError> {
    let from = from.bit_index()?;
    let to = to.bit_index()?;
    ensure!(from <= to, BitsError::InvalidRange { from, to });
    Ok((from, to))
}
