use crate::error::{AtisError, Result};
use crate::symbol::SymbolBits;
use crate::SYMBOL_BITS;
use heapless::Deque;

/// Default ring size: lookback of one symbol plus margin
pub const BIT_RING_CAPACITY: usize = 32;

/// Bounded FIFO of classified bits awaiting symbol decode
///
/// Pushing into a full ring fails with `RingOverflow` instead of
/// overwriting unread bits.
#[derive(Debug, Clone)]
pub struct BitRing<const N: usize = BIT_RING_CAPACITY> {
    bits: Deque<u8, N>,
}

impl<const N: usize> BitRing<N> {
    const CAPACITY_CHECK: () = assert!(N > SYMBOL_BITS, "ring must hold more than one symbol");

    pub fn new() -> Self {
        let () = Self::CAPACITY_CHECK;
        Self { bits: Deque::new() }
    }

    pub fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Append a bit at the tail
    pub fn push(&mut self, bit: u8) -> Result<()> {
        self.bits
            .push_back(bit & 1)
            .map_err(|_| AtisError::RingOverflow { capacity: N })
    }

    /// Bit at `offset` from the head, without consuming it
    pub fn peek(&self, offset: usize) -> Option<u8> {
        self.bits.iter().nth(offset).copied()
    }

    /// Remove and return the oldest bit
    pub fn pop(&mut self) -> Option<u8> {
        self.bits.pop_front()
    }

    /// Oldest `SYMBOL_BITS` bits, left in place
    pub fn peek_symbol(&self) -> Option<SymbolBits> {
        if self.bits.len() < SYMBOL_BITS {
            return None;
        }
        let mut symbol = [0u8; SYMBOL_BITS];
        for (slot, &bit) in symbol.iter_mut().zip(self.bits.iter()) {
            *slot = bit;
        }
        Some(symbol)
    }

    /// Remove the oldest `SYMBOL_BITS` bits
    pub fn pop_symbol(&mut self) -> Option<SymbolBits> {
        let symbol = self.peek_symbol()?;
        for _ in 0..SYMBOL_BITS {
            self.bits.pop_front();
        }
        Some(symbol)
    }

    pub fn clear(&mut self) {
        self.bits.clear();
    }
}

impl<const N: usize> Default for BitRing<N> {
    fn default() -> Self {
        Self::new()
    }
}
