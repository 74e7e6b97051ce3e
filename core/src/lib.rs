//! ATIS receiver library
//!
//! Recovers the vessel identifier carried by an ATIS burst (ITU-R M.493 DSC
//! symbol format, 1200 baud FSK) from a stream of baseband audio samples.

pub mod error;
pub mod fsk;
pub mod symbol;
pub mod ring;
pub mod diversity;
pub mod sync;
pub mod decoder;
pub mod encoder;
pub mod stream;
pub mod sink;

pub use decoder::{AtisDecoder, DecoderStats};
pub use encoder::BurstEncoder;
pub use error::{AtisError, Result};
pub use fsk::{FskDemodulator, FskModulator};
pub use sink::{ConsoleSink, Sink, UdpSink};
pub use stream::{run, PcmReader};

// Signaling configuration
pub const SAMPLE_RATE: usize = 24000;
pub const BAUD_RATE: usize = 1200;
pub const SAMPLES_PER_BIT: usize = SAMPLE_RATE / BAUD_RATE; // 20

const _: () = assert!(
    SAMPLE_RATE % BAUD_RATE == 0,
    "sample rate must be an exact multiple of the baud rate"
);

/// Tone for a 1 bit (ITU "B")
pub const MARK_FREQ_HZ: f32 = 1300.0;
/// Tone for a 0 bit (ITU "Y")
pub const SPACE_FREQ_HZ: f32 = 2100.0;

// Symbol format
pub const SYMBOL_BITS: usize = 10;
pub const DATA_BITS: usize = 7;
pub const CHECK_BITS: usize = SYMBOL_BITS - DATA_BITS; // 3

/// DX phasing symbol marking the start of a burst
pub const PHASING_SYMBOL: u8 = 125;
/// Largest symbol value that carries a digit pair
pub const MAX_DIGIT_SYMBOL: u8 = 99;

// Time diversity
pub const DIVERSITY_OFFSET: usize = 5; // symbol slots between the two copies
pub const IDENTIFIER_SYMBOLS: usize = 5;
