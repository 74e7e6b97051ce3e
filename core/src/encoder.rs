use crate::error::{AtisError, Result};
use crate::fsk::FskModulator;
use crate::symbol::{self, END_OF_SEQUENCE, FORMAT_ATIS, PHASING_RX_FIRST};
use crate::{DIVERSITY_OFFSET, IDENTIFIER_SYMBOLS, PHASING_SYMBOL, SYMBOL_BITS};

/// Alternating bits ahead of the phasing sequence
pub const DOT_PATTERN_BITS: usize = 20;

/// DX/RX pairs in the phasing sequence
pub const PHASING_PAIRS: usize = 6;

/// RX slots between a DX symbol and its repetition
const RX_LAG: usize = (DIVERSITY_OFFSET - 1) / 2;

/// ATIS burst generator
///
/// Burst layout:
/// - dot pattern (alternating bits)
/// - phasing: DX = 125, RX counting down from 111
/// - message M = [121, 121, five digit pairs, 127, 127, 127] as DX/RX
///   pairs, where RX slot i repeats M[i - 2] so every symbol appears again
///   five symbol slots later
pub struct BurstEncoder {
    fsk: FskModulator,
}

impl BurstEncoder {
    pub fn new() -> Self {
        Self {
            fsk: FskModulator::new(),
        }
    }

    pub fn with_modulator(fsk: FskModulator) -> Self {
        Self { fsk }
    }

    /// Split a 9- or 10-digit identifier into five digit pairs
    ///
    /// A 9-digit identifier gets a leading zero.
    pub fn identifier_symbols(identifier: &str) -> Result<[u8; IDENTIFIER_SYMBOLS]> {
        if !identifier.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AtisError::InvalidIdentifier(format!(
                "{:?} contains non-digit characters",
                identifier
            )));
        }

        let padded = match identifier.len() {
            9 => format!("0{}", identifier),
            10 => identifier.to_string(),
            n => {
                return Err(AtisError::InvalidIdentifier(format!(
                    "expected 9 or 10 digits, got {}",
                    n
                )))
            }
        };

        let mut pairs = [0u8; IDENTIFIER_SYMBOLS];
        for (pair, chunk) in pairs.iter_mut().zip(padded.as_bytes().chunks(2)) {
            *pair = (chunk[0] - b'0') * 10 + (chunk[1] - b'0');
        }
        Ok(pairs)
    }

    /// Symbol sequence of a burst, dot pattern excluded
    pub fn encode_symbols(&self, identifier: &str) -> Result<Vec<u8>> {
        let pairs = Self::identifier_symbols(identifier)?;

        let mut message = vec![FORMAT_ATIS, FORMAT_ATIS];
        message.extend_from_slice(&pairs);
        message.extend_from_slice(&[END_OF_SEQUENCE; 3]);

        let mut symbols = Vec::with_capacity(2 * (PHASING_PAIRS + message.len()));
        let mut rx_phasing = PHASING_RX_FIRST;

        for _ in 0..PHASING_PAIRS {
            symbols.push(PHASING_SYMBOL);
            symbols.push(rx_phasing);
            rx_phasing -= 1;
        }

        for (i, &dx) in message.iter().enumerate() {
            symbols.push(dx);
            if i >= RX_LAG {
                symbols.push(message[i - RX_LAG]);
            } else {
                symbols.push(rx_phasing);
                rx_phasing -= 1;
            }
        }

        Ok(symbols)
    }

    /// Bit sequence of a burst, in transmission order
    pub fn encode_bits(&self, identifier: &str) -> Result<Vec<u8>> {
        let symbols = self.encode_symbols(identifier)?;

        let mut bits = Vec::with_capacity(DOT_PATTERN_BITS + symbols.len() * SYMBOL_BITS);
        bits.extend((0..DOT_PATTERN_BITS).map(|i| ((i + 1) % 2) as u8));
        for value in symbols {
            bits.extend_from_slice(&symbol::encode(value)?);
        }
        Ok(bits)
    }

    /// Modulated audio for a burst
    pub fn encode(&mut self, identifier: &str) -> Result<Vec<i16>> {
        let bits = self.encode_bits(identifier)?;
        Ok(self.fsk.modulate(&bits))
    }
}

impl Default for BurstEncoder {
    fn default() -> Self {
        Self::new()
    }
}
