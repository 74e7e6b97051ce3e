use crate::decoder::AtisDecoder;
use crate::error::Result;
use crate::sink::Sink;
use std::io::{ErrorKind, Read};

/// Iterator over signed 16-bit little-endian mono samples
///
/// Ends at end of input. A trailing odd byte is dropped.
pub struct PcmReader<R: Read> {
    inner: R,
}

impl<R: Read> PcmReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> Iterator for PcmReader<R> {
    type Item = Result<i16>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut bytes = [0u8; 2];
        match self.inner.read_exact(&mut bytes) {
            Ok(()) => Some(Ok(i16::from_le_bytes(bytes))),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}

/// Pull samples until the stream ends, emitting each identifier to every sink
///
/// Returns the number of identifiers emitted.
pub fn run<I>(samples: I, decoder: &mut AtisDecoder, sinks: &mut [Box<dyn Sink>]) -> Result<usize>
where
    I: IntoIterator<Item = Result<i16>>,
{
    let mut emitted = 0;
    for sample in samples {
        if let Some(identifier) = decoder.push_sample(sample?)? {
            for sink in sinks.iter_mut() {
                sink.emit(&identifier);
            }
            emitted += 1;
        }
    }
    Ok(emitted)
}
