//! Time-diversity de-duplication
//!
//! Every message symbol is transmitted twice, the copy `DIVERSITY_OFFSET`
//! symbol slots after the first. With DX and RX slots interleaved, the
//! receiver sees each value in alternating positions, so it keeps every
//! other symbol starting at the first digit symbol it decodes.

use crate::{IDENTIFIER_SYMBOLS, MAX_DIGIT_SYMBOL};
use log::{debug, trace};

/// Collects the digit pairs of one identifier after frame lock
#[derive(Debug, Clone, Default)]
pub struct DiversityCollector {
    started: bool,
    position: usize,
    digits: Vec<u8>,
}

impl DiversityCollector {
    pub fn new() -> Self {
        Self {
            started: false,
            position: 0,
            digits: Vec::with_capacity(IDENTIFIER_SYMBOLS),
        }
    }

    /// Feed one decoded symbol value
    ///
    /// Returns the finished identifier on the read that completes
    /// `IDENTIFIER_SYMBOLS` digit pairs. Every later call returns `None`.
    pub fn accept(&mut self, value: u8) -> Option<String> {
        if self.is_complete() {
            trace!("symbol {} after completion ignored", value);
            return None;
        }

        if !self.started {
            // Phasing and format specifier symbols before the first digit pair
            if value > MAX_DIGIT_SYMBOL {
                trace!("pre-data symbol {} ignored", value);
                return None;
            }
            debug!("first digit symbol {}, collecting", value);
            self.started = true;
            self.position = 0;
        }

        let position = self.position;
        self.position += 1;

        if position % 2 == 1 {
            trace!("skip {} at position {}", value, position);
            return None;
        }
        if value > MAX_DIGIT_SYMBOL {
            trace!("read position {} held non-digit {}", position, value);
            return None;
        }

        trace!("read {:02} at position {}", value, position);
        self.digits.push(value);
        if self.is_complete() {
            Some(render_identifier(&self.digits))
        } else {
            None
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_complete(&self) -> bool {
        self.digits.len() == IDENTIFIER_SYMBOLS
    }

    /// Digit pairs read so far
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }
}

/// Concatenate digit pairs as zero-padded decimals, then normalize
pub fn render_identifier(pairs: &[u8]) -> String {
    let raw: String = pairs.iter().map(|pair| format!("{:02}", pair)).collect();
    normalize_identifier(&raw).to_string()
}

/// Drop the leading zero of a 10-character identifier (9-digit MMSI form)
pub fn normalize_identifier(raw: &str) -> &str {
    if raw.len() == 10 && raw.starts_with('0') {
        &raw[1..]
    } else {
        raw
    }
}
