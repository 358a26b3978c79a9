//! Checksum over the 16-bit measurement word.
//!
//! The sensor follows each two-byte measurement with a CRC8 computed by
//! polynomial division using the generator `x^8 + x^5 + x^4 + 1`
//! (`0b1_0011_0001`), with an initial value of zero and no reflection or
//! final XOR. See the "CRC checksum" section of the HTU21D(F) datasheet.

/// The 9-bit generator polynomial, `x^8 + x^5 + x^4 + 1`.
pub const POLYNOMIAL: u32 = 0b1_0011_0001;

/// Shift that places the top bit of [`POLYNOMIAL`] at bit 31.
const POLYNOMIAL_ALIGNMENT: u32 = 23;

/// Width of the checksum, and so of the zero padding below the data word.
const CHECKSUM_BITS: u32 = 8;

// The padded 16-bit word and the aligned generator must both fit the
// 32-bit working register without losing any high bits.
const _: () = assert!((POLYNOMIAL << POLYNOMIAL_ALIGNMENT) >> POLYNOMIAL_ALIGNMENT == POLYNOMIAL);
const _: () = assert!(u16::BITS + CHECKSUM_BITS <= u32::BITS);

/// Bit-serial polynomial division of `word`, with `append` in the low
/// byte of the dividend.
///
/// Appending zero yields the checksum for `word`; appending a checksum
/// yields zero if (and only if) that checksum is correct.
const fn divide(word: u16, append: u8) -> u8 {
    let mut remainder: u32 = ((word as u32) << CHECKSUM_BITS) | append as u32;
    let mut divisor: u32 = POLYNOMIAL << POLYNOMIAL_ALIGNMENT;
    let mut bit: u32 = 1 << (u32::BITS - 1);

    while bit >= 1 << CHECKSUM_BITS {
        if remainder & bit != 0 {
            // XOR takes the place of subtraction in polynomial division.
            remainder ^= divisor;
        }
        bit >>= 1;
        divisor >>= 1;
    }

    // Every bit at or above CHECKSUM_BITS has been cleared by now.
    remainder as u8
}

/// Calculate the checksum the sensor should send after `word`.
///
/// # Example usage
///
/// ```rust
/// // Example taken from the datasheet.
/// assert_eq!(htu21d_rjw::crc::compute(0x683A), 0x7C);
/// ```
#[must_use]
pub const fn compute(word: u16) -> u8 {
    divide(word, 0)
}

/// Divide `word` with its received `check` byte appended.
///
/// The result is 0 if `check` is the correct checksum for `word`. Any
/// other value means the data or the checksum were corrupted; the exact
/// non-zero value carries no further meaning.
#[must_use]
pub const fn verify(word: u16, check: u8) -> u8 {
    divide(word, check)
}

/// A wrapper around [`verify`] that relieves the caller of having
/// to compare the result to 0.
pub(crate) fn validate(word: u16, check: u8) -> Result<(), u8> {
    match verify(word, check) {
        0 => Ok(()),
        x => Err(x),
    }
}
