use crate::diversity::DiversityCollector;
use crate::error::{AtisError, Result};
use crate::ring::BitRing;
use crate::symbol;
use crate::PHASING_SYMBOL;
use log::debug;

/// Frame synchronization state
///
/// Only a locked tracker carries a symbol position and a collector.
#[derive(Debug, Clone)]
pub enum SyncState {
    /// Sliding bit by bit looking for the phasing symbol
    Searching,
    /// Aligned to symbol boundaries; the ring holds only the bits of the
    /// symbol in progress
    Locked { collector: DiversityCollector },
}

/// Something the tracker did in response to a bit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Phasing symbol found, symbol boundaries fixed
    Locked,
    /// A locked symbol failed its check field; back to searching
    SyncLost { check: u8, zeros: u8 },
    /// An identifier was completed; back to searching
    Decoded(String),
}

/// Acquires symbol alignment and feeds decoded symbols to the collector
///
/// While searching, every new bit triggers a decode attempt over the oldest
/// ten bits in the ring, discarding one bit per miss. A decoded phasing
/// symbol fixes the alignment. While locked, bits are grouped ten at a time
/// without overlap. A check-field failure drops the partial identifier and
/// returns to searching.
///
/// A random window that happens to decode as the phasing symbol is taken as
/// a real lock; the check fields of the following symbols are the only
/// protection against it.
#[derive(Debug, Clone)]
pub struct SyncTracker {
    ring: BitRing,
    state: SyncState,
}

impl SyncTracker {
    pub fn new() -> Self {
        Self {
            ring: BitRing::new(),
            state: SyncState::Searching,
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.state, SyncState::Locked { .. })
    }

    /// Bits held in the ring awaiting decode
    pub fn pending_bits(&self) -> usize {
        self.ring.len()
    }

    /// Bits received toward the current symbol while locked (0-9)
    pub fn bit_offset(&self) -> Option<usize> {
        match self.state {
            SyncState::Locked { .. } => Some(self.ring.len()),
            SyncState::Searching => None,
        }
    }

    /// Process one classified bit
    pub fn push_bit(&mut self, bit: u8) -> Result<Option<SyncEvent>> {
        self.ring.push(bit)?;

        let event = match &mut self.state {
            SyncState::Searching => {
                if acquire_phasing(&mut self.ring) {
                    Some(SyncEvent::Locked)
                } else {
                    None
                }
            }
            // Lock consumed the phasing symbol, so the ring fills from empty
            // and a full symbol is available exactly on every tenth bit
            SyncState::Locked { collector } => match self.ring.pop_symbol() {
                None => None,
                Some(bits) => match symbol::decode(&bits) {
                    Ok(value) => collector.accept(value).map(SyncEvent::Decoded),
                    Err(AtisError::InvalidSymbol { check, zeros }) => {
                        Some(SyncEvent::SyncLost { check, zeros })
                    }
                    Err(e) => return Err(e),
                },
            },
        };

        match &event {
            Some(SyncEvent::Locked) => {
                debug!("phasing symbol acquired, locked");
                self.state = SyncState::Locked {
                    collector: DiversityCollector::new(),
                };
            }
            Some(SyncEvent::SyncLost { check, zeros }) => {
                debug!("sync lost: check {} != zeros {}", check, zeros);
                self.state = SyncState::Searching;
            }
            Some(SyncEvent::Decoded(_)) => {
                self.state = SyncState::Searching;
            }
            None => {}
        }

        Ok(event)
    }

    /// Drop all buffered bits and return to searching
    pub fn reset(&mut self) {
        self.ring.clear();
        self.state = SyncState::Searching;
    }
}

impl Default for SyncTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Slide over the ring one bit at a time until a phasing symbol is at the head
///
/// On success the phasing symbol's bits are consumed. On failure at most
/// `SYMBOL_BITS - 1` bits remain.
fn acquire_phasing(ring: &mut BitRing) -> bool {
    while let Some(bits) = ring.peek_symbol() {
        if matches!(symbol::decode(&bits), Ok(PHASING_SYMBOL)) {
            ring.pop_symbol();
            return true;
        }
        ring.pop();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{encode, SymbolBits};
    use crate::SYMBOL_BITS;

    fn symbol_bits(values: &[u8]) -> Vec<u8> {
        values
            .iter()
            .flat_map(|&v| encode(v).unwrap())
            .collect()
    }

    fn push_all(tracker: &mut SyncTracker, bits: &[u8]) -> Vec<SyncEvent> {
        bits.iter()
            .filter_map(|&b| tracker.push_bit(b).unwrap())
            .collect()
    }

    #[test]
    fn test_starts_searching() {
        let tracker = SyncTracker::new();
        assert!(!tracker.is_locked());
        assert_eq!(tracker.pending_bits(), 0);
    }

    #[test]
    fn test_locks_on_phasing_symbol() {
        let mut tracker = SyncTracker::new();
        let events = push_all(&mut tracker, &symbol_bits(&[PHASING_SYMBOL]));

        assert_eq!(events, vec![SyncEvent::Locked]);
        assert!(tracker.is_locked());
        assert_eq!(tracker.pending_bits(), 0);
    }

    #[test]
    fn test_locks_at_any_bit_offset() {
        for lead in 0..SYMBOL_BITS {
            let mut bits = vec![0u8; lead];
            bits.extend(symbol_bits(&[PHASING_SYMBOL]));

            let mut tracker = SyncTracker::new();
            let events = push_all(&mut tracker, &bits);
            assert_eq!(events, vec![SyncEvent::Locked], "lead of {} bits", lead);
        }
    }

    #[test]
    fn test_search_keeps_fewer_than_one_symbol() {
        let mut tracker = SyncTracker::new();
        push_all(&mut tracker, &[1, 0].repeat(50));
        assert!(!tracker.is_locked());
        assert!(tracker.pending_bits() < SYMBOL_BITS);
    }

    #[test]
    fn test_other_valid_symbols_do_not_lock() {
        let mut tracker = SyncTracker::new();
        let events = push_all(&mut tracker, &symbol_bits(&[0, 0, 0, 0]));
        assert!(events.is_empty());
        assert!(!tracker.is_locked());
    }

    #[test]
    fn test_locked_groups_without_sliding() {
        let mut tracker = SyncTracker::new();
        push_all(&mut tracker, &symbol_bits(&[PHASING_SYMBOL]));

        assert_eq!(tracker.bit_offset(), Some(0));

        for (i, &bit) in symbol_bits(&[111, 110]).iter().enumerate() {
            tracker.push_bit(bit).unwrap();
            assert_eq!(
                tracker.bit_offset(),
                Some((i + 1) % SYMBOL_BITS),
                "lost lock on a valid symbol"
            );
        }
        assert_eq!(tracker.pending_bits(), 0);
    }

    #[test]
    fn test_invalid_symbol_drops_lock() {
        let mut tracker = SyncTracker::new();
        push_all(&mut tracker, &symbol_bits(&[PHASING_SYMBOL, 21, 121]));

        let mut bad: SymbolBits = encode(12).unwrap();
        bad[9] ^= 1;
        let events = push_all(&mut tracker, &bad);

        assert!(matches!(events.as_slice(), [SyncEvent::SyncLost { .. }]));
        assert!(!tracker.is_locked());
    }

    #[test]
    fn test_decodes_identifier_and_returns_to_search() {
        let mut tracker = SyncTracker::new();
        let stream = [
            PHASING_SYMBOL, 111, PHASING_SYMBOL, 110, 121, 105, 121, 104,
            21, 121, 12, 121, 34, 21, 56, 12, 78, 34,
        ];
        let events = push_all(&mut tracker, &symbol_bits(&stream));

        assert_eq!(
            events,
            vec![SyncEvent::Locked, SyncEvent::Decoded("2112345678".to_string())]
        );
        assert!(!tracker.is_locked());
    }

    #[test]
    fn test_reset() {
        let mut tracker = SyncTracker::new();
        push_all(&mut tracker, &symbol_bits(&[PHASING_SYMBOL]));
        tracker.push_bit(1).unwrap();
        tracker.reset();
        assert!(!tracker.is_locked());
        assert_eq!(tracker.pending_bits(), 0);
    }
}
