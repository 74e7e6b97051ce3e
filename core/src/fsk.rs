use crate::error::{AtisError, Result};
use crate::{MARK_FREQ_HZ, SAMPLES_PER_BIT, SPACE_FREQ_HZ};
use std::f32::consts::PI;

// Binary FSK at 1200 baud (ITU-R M.493 VHF DSC)
//
// - Mark (bit 1): 1300 Hz
// - Space (bit 0): 2100 Hz
// - 20 samples per bit at 24 kHz, so bit boundaries always fall on a sample
//
// The demodulator compares the Goertzel power of the two tones over exactly
// one bit period. There is no amplitude or SNR gate: silence and noise
// still produce a bit.

/// Default peak amplitude of generated tones
pub const DEFAULT_AMPLITUDE: i16 = 8000;

/// Phase-continuous FSK modulator
///
/// Produces `SAMPLES_PER_BIT` signed 16-bit samples per bit. The oscillator
/// phase carries over between bits and between calls, so consecutive calls
/// append cleanly to one waveform.
pub struct FskModulator {
    sample_rate: f32,
    amplitude: f32,
    phase: f32,
}

impl FskModulator {
    pub fn new() -> Self {
        Self::with_amplitude(DEFAULT_AMPLITUDE)
    }

    pub fn with_amplitude(amplitude: i16) -> Self {
        Self {
            sample_rate: crate::SAMPLE_RATE as f32,
            amplitude: amplitude.unsigned_abs() as f32,
            phase: 0.0,
        }
    }

    /// Modulate a sequence of bits (any non-zero value is a mark)
    pub fn modulate(&mut self, bits: &[u8]) -> Vec<i16> {
        let mut samples = Vec::with_capacity(bits.len() * SAMPLES_PER_BIT);
        for &bit in bits {
            let freq = if bit != 0 { MARK_FREQ_HZ } else { SPACE_FREQ_HZ };
            let step = 2.0 * PI * freq / self.sample_rate;

            for _ in 0..SAMPLES_PER_BIT {
                samples.push((self.amplitude * self.phase.sin()).round() as i16);
                self.phase = (self.phase + step) % (2.0 * PI);
            }
        }
        samples
    }

    /// Restart the oscillator at zero phase
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// FSK demodulator - one bit decision per sample window
pub struct FskDemodulator {
    sample_rate: f32,
}

impl FskDemodulator {
    pub fn new() -> Self {
        Self {
            sample_rate: crate::SAMPLE_RATE as f32,
        }
    }

    /// Signal power at `freq` over the window (Goertzel, magnitude squared)
    fn goertzel(&self, samples: &[i16], freq: f32) -> f32 {
        let omega = 2.0 * PI * freq / self.sample_rate;
        let coeff = 2.0 * omega.cos();

        let mut q1 = 0.0;
        let mut q2 = 0.0;

        for &sample in samples {
            let q0 = coeff * q1 - q2 + sample as f32;
            q2 = q1;
            q1 = q0;
        }

        q1 * q1 + q2 * q2 - q1 * q2 * coeff
    }

    /// Mark wins only on strictly greater power; ties, silence included, are space
    fn classify(&self, window: &[i16]) -> u8 {
        let mark = self.goertzel(window, MARK_FREQ_HZ);
        let space = self.goertzel(window, SPACE_FREQ_HZ);
        if mark > space {
            1
        } else {
            0
        }
    }

    /// Classify exactly one bit period of samples
    ///
    /// Returns 1 when mark power exceeds space power, otherwise 0.
    pub fn demodulate_bit(&self, samples: &[i16]) -> Result<u8> {
        if samples.len() != SAMPLES_PER_BIT {
            return Err(AtisError::InvalidInputSize {
                expected: SAMPLES_PER_BIT,
                actual: samples.len(),
            });
        }

        Ok(self.classify(samples))
    }

    /// Demodulate consecutive bit windows; a trailing partial window is dropped
    pub fn demodulate(&self, samples: &[i16]) -> Vec<u8> {
        samples
            .chunks_exact(SAMPLES_PER_BIT)
            .map(|window| self.classify(window))
            .collect()
    }
}

impl Default for FskModulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for FskDemodulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn tone(freq: f32, amplitude: f32) -> Vec<i16> {
        (0..SAMPLES_PER_BIT)
            .map(|i| {
                let t = i as f32 / crate::SAMPLE_RATE as f32;
                (amplitude * (2.0 * PI * freq * t).sin()) as i16
            })
            .collect()
    }

    #[test]
    fn test_mark_tone_is_one() {
        let demod = FskDemodulator::new();
        assert_eq!(demod.demodulate_bit(&tone(MARK_FREQ_HZ, 8000.0)).unwrap(), 1);
    }

    #[test]
    fn test_space_tone_is_zero() {
        let demod = FskDemodulator::new();
        assert_eq!(demod.demodulate_bit(&tone(SPACE_FREQ_HZ, 8000.0)).unwrap(), 0);
    }

    #[test]
    fn test_silence_is_zero() {
        let demod = FskDemodulator::new();
        assert_eq!(demod.demodulate_bit(&[0i16; SAMPLES_PER_BIT]).unwrap(), 0);
    }

    #[test]
    fn test_invalid_window_size() {
        let demod = FskDemodulator::new();
        let result = demod.demodulate_bit(&[0i16; SAMPLES_PER_BIT - 1]);
        assert!(matches!(
            result,
            Err(AtisError::InvalidInputSize { expected: 20, actual: 19 })
        ));
    }

    #[test]
    fn test_modulator_output_length() {
        let mut modulator = FskModulator::new();
        let samples = modulator.modulate(&[1, 0, 1]);
        assert_eq!(samples.len(), 3 * SAMPLES_PER_BIT);
    }

    #[test]
    fn test_fsk_roundtrip_random_bits() {
        let mut rng = StdRng::seed_from_u64(7);
        let bits: Vec<u8> = (0..2000).map(|_| rng.gen_range(0..=1)).collect();

        let mut modulator = FskModulator::new();
        let samples = modulator.modulate(&bits);
        let demod = FskDemodulator::new();

        assert_eq!(demod.demodulate(&samples), bits);
    }

    #[test]
    fn test_fsk_gain_invariance() {
        let bits = [1, 1, 0, 1, 0, 0, 0, 1, 0, 1, 1, 0];
        let demod = FskDemodulator::new();

        for amplitude in [100, DEFAULT_AMPLITUDE, 30000] {
            let mut modulator = FskModulator::with_amplitude(amplitude);
            let samples = modulator.modulate(&bits);
            assert_eq!(demod.demodulate(&samples), bits, "amplitude {}", amplitude);
        }
    }

    #[test]
    fn test_trailing_partial_window_dropped() {
        let mut modulator = FskModulator::new();
        let mut samples = modulator.modulate(&[1, 0]);
        samples.extend_from_slice(&[1000; SAMPLES_PER_BIT / 2]);

        let demod = FskDemodulator::new();
        assert_eq!(demod.demodulate(&samples), vec![1, 0]);
    }

    #[test]
    fn test_phase_continuity_across_calls() {
        let mut modulator = FskModulator::new();
        let first = modulator.modulate(&[1]);
        let second = modulator.modulate(&[0]);

        // Largest per-sample step for a 2100 Hz tone at 8000 peak is ~4300
        let jump = (second[0] as i32 - first[SAMPLES_PER_BIT - 1] as i32).abs();
        assert!(jump < 4500, "discontinuity of {} at call boundary", jump);
    }

    #[test]
    fn test_bulk_and_single_window_agree() {
        let mut rng = StdRng::seed_from_u64(5);
        let samples: Vec<i16> = (0..SAMPLES_PER_BIT * 200).map(|_| rng.gen()).collect();

        let demod = FskDemodulator::new();
        let single: Vec<u8> = samples
            .chunks_exact(SAMPLES_PER_BIT)
            .map(|window| demod.demodulate_bit(window).unwrap())
            .collect();
        assert_eq!(demod.demodulate(&samples), single);
    }

    #[test]
    fn test_noise_window_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(99);
        let window: Vec<i16> = (0..SAMPLES_PER_BIT).map(|_| rng.gen()).collect();

        let demod = FskDemodulator::new();
        let first = demod.demodulate_bit(&window).unwrap();
        let second = demod.demodulate_bit(&window).unwrap();
        assert!(first <= 1);
        assert_eq!(first, second);
    }
}
