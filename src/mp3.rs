//! MPEG audio (MP3) sound file reader
//!
//! Detection looks at a 10-byte prefix: an ID3v2 tag header or a raw MPEG
//! frame header claims the stream. Opening parses channel count, sample
//! rate and totals without decoding the file through; reads then hand out
//! interleaved 16-bit samples in caller-sized chunks.

use crate::adapter::StreamAdapter;
use crate::decoder::{DecodeError, DecodeResult, SoundFileReader};
use crate::engine::{frame_header_valid, Mp3Engine};
use crate::formats::{SoundChannel, StreamInfo};
use crate::stream::{InputStream, SoundStream};

/// Returns true if `header` is a well-formed ID3v2 tag header
///
/// Layout: "ID3", two version bytes, one flags byte, four size bytes. The
/// low nibble of the flags byte and the high bit of every size byte must
/// be clear; the version bytes are unconstrained.
fn has_valid_id3_tag(header: &[u8; 10]) -> bool {
    header.starts_with(b"ID3")
        && (header[5] & 0x0F) == 0
        && (header[6] & 0x80) == 0
        && (header[7] & 0x80) == 0
        && (header[8] & 0x80) == 0
        && (header[9] & 0x80) == 0
}

/// Channel-role map for an MPEG audio stream with `channel_count` channels
///
/// Zero channels yields an empty map and a diagnostic. More than two
/// cannot occur in MPEG audio and is refused rather than guessed at.
fn channel_map_for(channel_count: u32) -> DecodeResult<Vec<SoundChannel>> {
    match channel_count {
        0 => {
            log::warn!("MPEG audio stream reports no channels");
            Ok(Vec::new())
        }
        1 => Ok(vec![SoundChannel::Mono]),
        2 => Ok(vec![SoundChannel::SideLeft, SoundChannel::SideRight]),
        n => {
            log::error!("unsupported number of channels in MPEG audio stream: {}", n);
            debug_assert!(false, "MPEG audio cannot carry {} channels", n);
            Err(DecodeError::UnsupportedChannelCount(n))
        }
    }
}

/// Streaming MP3 reader over a caller-supplied byte stream
pub struct Mp3Decoder {
    engine: Mp3Engine,
    info: StreamInfo,
    /// Next interleaved sample to read, in `0..=info.sample_count`
    position: u64,
}

impl Mp3Decoder {
    /// Interleaved sample index the next `read` starts at
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl SoundFileReader for Mp3Decoder {
    fn check(stream: &mut dyn InputStream) -> bool {
        // One read; a stream too short for the probe is not an MP3. A
        // malformed tag header still gets the frame-header test.
        let mut header = [0u8; 10];
        if stream.read(&mut header) < header.len() {
            return false;
        }
        has_valid_id3_tag(&header) || frame_header_valid(&header)
    }

    fn open(stream: Box<dyn SoundStream>) -> DecodeResult<Self> {
        let adapter = StreamAdapter::new(stream);
        let engine = Mp3Engine::open(Box::new(adapter))?;

        if engine.total_samples() == 0 {
            return Err(DecodeError::NoSamples);
        }

        let channel_count = engine.channels();
        let info = StreamInfo {
            channel_count,
            sample_rate: engine.sample_rate(),
            sample_count: engine.total_samples(),
            channel_map: channel_map_for(channel_count)?,
        };

        Ok(Self {
            engine,
            info,
            position: 0,
        })
    }

    fn info(&self) -> &StreamInfo {
        &self.info
    }

    fn seek(&mut self, sample_index: u64) {
        let target = sample_index.min(self.info.sample_count);
        if let Err(e) = self.engine.seek_to_sample(target) {
            log::debug!("mp3 seek to sample {} failed: {}", target, e);
        }
        // The engine is trusted to land where asked; track the clamped
        // position unconditionally.
        self.position = target;
    }

    fn read(&mut self, samples: &mut [i16]) -> u64 {
        let to_read = (samples.len() as u64).min(self.info.sample_count - self.position);
        if to_read == 0 {
            return 0;
        }
        let got = self.engine.read_samples(&mut samples[..to_read as usize]) as u64;
        self.position += got;
        got
    }
}
