//! ITU-R M.493 10-bit symbol codec
//!
//! A symbol is 7 information bits sent least-significant bit first, followed
//! by a 3-bit check field sent most-significant bit first. The check field is
//! the number of zero bits among the 7 information bits.

use crate::error::{AtisError, Result};
use crate::{DATA_BITS, SYMBOL_BITS};

/// Raw bits of one symbol, in transmission order
pub type SymbolBits = [u8; SYMBOL_BITS];

/// ATIS format specifier
pub const FORMAT_ATIS: u8 = 121;

/// End of sequence ("other calls")
pub const END_OF_SEQUENCE: u8 = 127;

/// First RX phasing symbol; the rest count down to 104
pub const PHASING_RX_FIRST: u8 = 111;

fn zero_count(value: u8) -> u8 {
    DATA_BITS as u8 - (value & 0x7F).count_ones() as u8
}

/// Decode one symbol, rejecting it when the check field does not match
pub fn decode(bits: &SymbolBits) -> Result<u8> {
    let value = bits[..DATA_BITS]
        .iter()
        .enumerate()
        .fold(0u8, |acc, (i, &bit)| acc | ((bit & 1) << i));

    let check = bits[DATA_BITS..]
        .iter()
        .fold(0u8, |acc, &bit| (acc << 1) | (bit & 1));

    let zeros = zero_count(value);
    if check == zeros {
        Ok(value)
    } else {
        Err(AtisError::InvalidSymbol { check, zeros })
    }
}

/// Encode a symbol value (0-127) into its transmitted bit order
pub fn encode(value: u8) -> Result<SymbolBits> {
    if value > 0x7F {
        return Err(AtisError::SymbolOutOfRange(value));
    }

    let mut bits = [0u8; SYMBOL_BITS];
    for (i, bit) in bits[..DATA_BITS].iter_mut().enumerate() {
        *bit = (value >> i) & 1;
    }

    let zeros = zero_count(value);
    bits[7] = (zeros >> 2) & 1;
    bits[8] = (zeros >> 1) & 1;
    bits[9] = zeros & 1;

    Ok(bits)
}
