use atis_core::{
    run, AtisDecoder, BurstEncoder, ConsoleSink, FskModulator, PcmReader, Sink, UdpSink,
    SAMPLES_PER_BIT, SAMPLE_RATE,
};
use clap::{ArgAction, Parser, Subcommand};
use hound::WavSpec;
use log::info;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Parser)]
#[command(name = "atis")]
#[command(about = "ATIS (ITU-R M.493 DSC) identifier decoder for 24 kHz baseband audio")]
struct Cli {
    /// Log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode signed 16-bit mono PCM at 24 kHz and forward identifiers over UDP
    Decode {
        /// Destination host for identifier datagrams
        host: String,

        /// Destination UDP port
        port: u16,

        /// Read from a file instead of stdin (.wav files are parsed, anything else is raw PCM)
        #[arg(short, long, value_name = "INPUT")]
        input: Option<PathBuf>,
    },

    /// Synthesize an ATIS burst for a 9- or 10-digit identifier
    Encode {
        /// Identifier digits
        identifier: String,

        /// Output file (WAV unless --raw; "-" with --raw writes to stdout)
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Write raw little-endian PCM instead of WAV
        #[arg(long)]
        raw: bool,

        /// Peak tone amplitude
        #[arg(short, long, default_value = "8000")]
        amplitude: i16,

        /// Silence before and after the burst, in milliseconds
        #[arg(short, long, default_value = "100")]
        silence_ms: u32,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(
        "Unsupported WAV format: {channels} channel(s), {sample_rate} Hz, {bits} bits \
         (expected mono 16-bit at {expected} Hz)"
    )]
    UnsupportedWav {
        channels: u16,
        sample_rate: u32,
        bits: u16,
        expected: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Decode { host, port, input } => decode_command(&host, port, input.as_deref())?,
        Commands::Encode {
            identifier,
            output,
            raw,
            amplitude,
            silence_ms,
        } => encode_command(&identifier, &output, raw, amplitude, silence_ms)?,
    }

    Ok(())
}

fn decode_command(
    host: &str,
    port: u16,
    input: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let udp = UdpSink::connect(host, port)?;
    info!("Forwarding identifiers to {}", udp.destination());

    let mut sinks: Vec<Box<dyn Sink>> = vec![Box::new(ConsoleSink::stdout()), Box::new(udp)];
    let mut decoder = AtisDecoder::new();

    let emitted = match input {
        Some(path) if is_wav(path) => {
            let samples = read_wav(path)?;
            info!("Read {} samples from {}", samples.len(), path.display());
            run(samples.into_iter().map(Ok), &mut decoder, &mut sinks)?
        }
        Some(path) => {
            let reader = BufReader::new(File::open(path)?);
            run(PcmReader::new(reader), &mut decoder, &mut sinks)?
        }
        None => {
            let stdin = io::stdin();
            run(PcmReader::new(stdin.lock()), &mut decoder, &mut sinks)?
        }
    };

    let stats = decoder.stats();
    info!(
        "End of input: {} identifier(s), {} bits, {} locks, {} sync losses",
        emitted, stats.bits, stats.locks, stats.sync_losses
    );

    Ok(())
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

fn read_wav(path: &Path) -> Result<Vec<i16>, Box<dyn std::error::Error>> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    if spec.channels != 1
        || spec.sample_rate as usize != SAMPLE_RATE
        || spec.bits_per_sample != 16
        || spec.sample_format != hound::SampleFormat::Int
    {
        return Err(CliError::UnsupportedWav {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits: spec.bits_per_sample,
            expected: SAMPLE_RATE,
        }
        .into());
    }

    let samples: Result<Vec<i16>, _> = reader.into_samples::<i16>().collect();
    Ok(samples?)
}

fn encode_command(
    identifier: &str,
    output: &Path,
    raw: bool,
    amplitude: i16,
    silence_ms: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut encoder = BurstEncoder::with_modulator(FskModulator::with_amplitude(amplitude));
    let burst = encoder.encode(identifier)?;

    // Whole bit periods of silence keep the burst on the bit grid
    let silence_bits = SAMPLE_RATE * silence_ms as usize / 1000 / SAMPLES_PER_BIT;
    let padding = vec![0i16; silence_bits * SAMPLES_PER_BIT];

    let mut samples = Vec::with_capacity(burst.len() + 2 * padding.len());
    samples.extend_from_slice(&padding);
    samples.extend_from_slice(&burst);
    samples.extend_from_slice(&padding);

    if raw {
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        if output == Path::new("-") {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
            return Ok(());
        }
        let mut writer = BufWriter::new(File::create(output)?);
        writer.write_all(&bytes)?;
        writer.flush()?;
    } else {
        let spec = WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE as u32,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(output, spec)?;
        for &sample in &samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    println!(
        "Wrote {} samples ({} burst bits) for {} to {}",
        samples.len(),
        burst.len() / SAMPLES_PER_BIT,
        identifier,
        output.display()
    );
    Ok(())
}
