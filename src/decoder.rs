//! Sound file reader trait and error definitions
//!
//! `SoundFileReader` is the seam a format-dispatching sound source consumes:
//! probe a stream, open it, then seek and read in interleaved samples. This
//! crate ships one implementation, `Mp3Decoder`.

use thiserror::Error;

use crate::formats::StreamInfo;
use crate::stream::{InputStream, SoundStream};

/// Error type for reader operations
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The codec engine could not recognize or initialize the stream
    #[error("failed to open MPEG audio stream: {0}")]
    OpenFailed(String),
    /// The stream opened but reported no decodable samples
    #[error("MPEG audio stream contains no samples")]
    NoSamples,
    /// More channels than the format can carry
    #[error("unsupported channel count: {0} (MPEG audio is mono or stereo)")]
    UnsupportedChannelCount(u32),
    /// Engine-level seek failure
    #[error("seek failed: {0}")]
    SeekFailed(String),
    /// Corrupt or truncated audio data mid-stream
    #[error("invalid MPEG audio data: {0}")]
    InvalidData(String),
}

/// Result type for reader operations
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Sound file reader trait
///
/// One implementation per container/codec family. Sample positions and
/// counts are always in interleaved samples, not frames: one second of
/// 44.1 kHz stereo is 88200 samples.
pub trait SoundFileReader: Sized {
    /// Probe the start of a stream to see whether this reader handles it
    ///
    /// Reads from the current position and does not restore it; callers
    /// rewind before `open`.
    fn check(stream: &mut dyn InputStream) -> bool;

    /// Take ownership of a stream and parse its metadata
    ///
    /// The stream is released when the reader is dropped, on the error
    /// path included.
    fn open(stream: Box<dyn SoundStream>) -> DecodeResult<Self>;

    /// Properties parsed at open
    fn info(&self) -> &StreamInfo;

    /// Position the next read at `sample_index` interleaved samples
    ///
    /// Indices past the end clamp to the end; the following read returns 0.
    fn seek(&mut self, sample_index: u64);

    /// Decode up to `samples.len()` interleaved samples into `samples`
    ///
    /// Returns how many were written. Short counts are normal near the end
    /// of the stream or after a damaged frame; 0 means exhausted.
    fn read(&mut self, samples: &mut [i16]) -> u64;
}
