use crate::error::Result;
use crate::fsk::FskDemodulator;
use crate::sync::{SyncEvent, SyncTracker};
use crate::SAMPLES_PER_BIT;
use log::info;

/// Running counters for one decoder instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Bits classified from complete sample windows
    pub bits: u64,
    /// Times the phasing symbol was acquired
    pub locks: u64,
    /// Locked symbols rejected by their check field
    pub sync_losses: u64,
    /// Identifiers completed
    pub decoded: u64,
}

/// Streaming ATIS decoder
///
/// Owns all state for one input stream: the partial sample window, the
/// frame tracker and its bit ring. Samples go in one at a time or in
/// slices of any length; bit windows are cut at fixed multiples of
/// `SAMPLES_PER_BIT` from the first sample.
pub struct AtisDecoder {
    demod: FskDemodulator,
    window: Vec<i16>,
    tracker: SyncTracker,
    stats: DecoderStats,
}

impl AtisDecoder {
    pub fn new() -> Self {
        Self {
            demod: FskDemodulator::new(),
            window: Vec::with_capacity(SAMPLES_PER_BIT),
            tracker: SyncTracker::new(),
            stats: DecoderStats::default(),
        }
    }

    /// Feed one sample; returns an identifier when this sample completed one
    pub fn push_sample(&mut self, sample: i16) -> Result<Option<String>> {
        self.window.push(sample);
        if self.window.len() < SAMPLES_PER_BIT {
            return Ok(None);
        }

        let bit = self.demod.demodulate_bit(&self.window)?;
        self.window.clear();
        self.push_bit(bit)
    }

    /// Feed one already classified bit
    pub fn push_bit(&mut self, bit: u8) -> Result<Option<String>> {
        self.stats.bits += 1;

        match self.tracker.push_bit(bit)? {
            Some(SyncEvent::Locked) => {
                self.stats.locks += 1;
                Ok(None)
            }
            Some(SyncEvent::SyncLost { .. }) => {
                self.stats.sync_losses += 1;
                Ok(None)
            }
            Some(SyncEvent::Decoded(identifier)) => {
                self.stats.decoded += 1;
                info!("decoded ATIS identifier {}", identifier);
                Ok(Some(identifier))
            }
            None => Ok(None),
        }
    }

    /// Feed a block of samples, collecting every identifier it completes
    pub fn process(&mut self, samples: &[i16]) -> Result<Vec<String>> {
        let mut identifiers = Vec::new();
        for &sample in samples {
            if let Some(identifier) = self.push_sample(sample)? {
                identifiers.push(identifier);
            }
        }
        Ok(identifiers)
    }

    pub fn is_locked(&self) -> bool {
        self.tracker.is_locked()
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Samples held toward the next bit window
    pub fn pending_samples(&self) -> usize {
        self.window.len()
    }

    /// Return to the freshly constructed state
    pub fn reset(&mut self) {
        self.window.clear();
        self.tracker.reset();
        self.stats = DecoderStats::default();
    }
}

impl Default for AtisDecoder {
    fn default() -> Self {
        Self::new()
    }
}
