//! MPEG audio codec engine
//!
//! Facade over symphonia's MPEG demuxer and decoder. The reader drives four
//! primitives: open a probed stream, seek to an interleaved sample, fill a
//! sample slice, and validate a raw frame header. Everything here works in
//! interleaved `i16` samples; frame/timestamp conversions stay internal.

use std::io;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_MP3};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::decoder::{DecodeError, DecodeResult};

/// Interleaved samples in one MPEG-1 Layer III stereo frame, the most the
/// decoder produces from a single packet
const MAX_FRAME_SAMPLES: usize = 2304;

/// Validates a raw 4-byte MPEG audio frame header
///
/// True when the sync pattern, version/layer combination, bitrate index and
/// sample-rate index are all plausible. Free-format streams (bitrate index
/// 0) pass; reserved indices do not.
pub(crate) fn frame_header_valid(header: &[u8]) -> bool {
    header.len() >= 4
        && header[0] == 0xFF
        && ((header[1] & 0xF0) == 0xF0 || (header[1] & 0xFE) == 0xE2)
        && ((header[1] >> 1) & 3) != 0
        && (header[2] >> 4) != 15
        && ((header[2] >> 2) & 3) != 3
}

/// Decoder state for one opened MPEG audio stream
pub(crate) struct Mp3Engine {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    channels: u32,
    sample_rate: u32,
    /// Total interleaved samples in the stream
    total_samples: u64,
    /// Decoded samples not yet handed to the caller
    carry: Vec<i16>,
    carry_pos: usize,
    sample_buf: Option<SampleBuffer<i16>>,
    /// Latched once the container is known to be exhausted
    at_end: bool,
}

impl Mp3Engine {
    /// Probe and open `source`, building codec state and stream totals
    pub(crate) fn open(source: Box<dyn MediaSource>) -> DecodeResult<Self> {
        let mss = MediaSourceStream::new(source, Default::default());

        let mut hint = Hint::new();
        hint.with_extension("mp3");

        // Gapless trimming keeps totals and packet timestamps consistent
        // with the samples decoding actually delivers.
        let format_opts = FormatOptions {
            enable_gapless: true,
            ..Default::default()
        };

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &format_opts, &MetadataOptions::default())
            .map_err(|e| DecodeError::OpenFailed(e.to_string()))?;
        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec == CODEC_TYPE_MP3)
            .ok_or_else(|| DecodeError::OpenFailed("no MPEG audio track".to_string()))?;
        let track_id = track.id;
        let params = track.codec_params.clone();

        let decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| DecodeError::OpenFailed(e.to_string()))?;

        let mut engine = Self {
            format,
            decoder,
            track_id,
            channels: params.channels.map_or(0, |c| c.count() as u32),
            sample_rate: params.sample_rate.unwrap_or(0),
            total_samples: 0,
            carry: Vec::new(),
            carry_pos: 0,
            sample_buf: None,
            at_end: false,
        };

        let total_frames = match params.n_frames {
            Some(n) if n > 0 => n,
            // Raw CBR streams carry no frame-count tag and the stream
            // contract has no byte length to estimate one from; walk the
            // packet headers once and rewind.
            _ => engine.scan_total_frames()?,
        };
        if engine.channels > 0 {
            engine.total_samples = total_frames.saturating_mul(u64::from(engine.channels));
        }

        Ok(engine)
    }

    /// Number of channels in the stream (0 when the codec reported none)
    pub(crate) fn channels(&self) -> u32 {
        self.channels
    }

    /// Sample rate in Hz
    pub(crate) fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total interleaved samples in the stream
    pub(crate) fn total_samples(&self) -> u64 {
        self.total_samples
    }

    /// Position decoding so the next `read_samples` starts at
    /// `sample_index` interleaved samples from the stream start
    ///
    /// The caller clamps `sample_index` to the stream totals; a value at
    /// the end latches the exhausted state without touching the container.
    pub(crate) fn seek_to_sample(&mut self, sample_index: u64) -> DecodeResult<()> {
        self.carry.clear();
        self.carry_pos = 0;

        if self.channels == 0 || sample_index >= self.total_samples {
            self.at_end = true;
            return Ok(());
        }
        self.at_end = false;

        let channels = u64::from(self.channels);
        let target_frame = sample_index / channels;

        let seeked = self
            .format
            .seek(
                SeekMode::Accurate,
                SeekTo::TimeStamp {
                    ts: target_frame,
                    track_id: self.track_id,
                },
            )
            .map_err(|e| DecodeError::SeekFailed(e.to_string()))?;
        self.decoder.reset();

        // The container lands on a packet boundary at or before the
        // target; decode and discard the remainder, including any
        // non-channel-aligned tail.
        let skipped_frames = target_frame.saturating_sub(seeked.actual_ts);
        self.discard_samples(skipped_frames * channels + sample_index % channels);
        Ok(())
    }

    /// Fill `out` with decoded interleaved samples, returning how many
    /// were written
    ///
    /// Stops short at end of stream or on a bitstream error; a short count
    /// is not an error at this layer.
    pub(crate) fn read_samples(&mut self, out: &mut [i16]) -> usize {
        if self.at_end && self.carry_pos >= self.carry.len() {
            return 0;
        }
        let mut written = 0;
        while written < out.len() {
            if self.carry_pos >= self.carry.len() {
                match self.decode_next_frame() {
                    Ok(true) => {}
                    Ok(false) => {
                        self.at_end = true;
                        break;
                    }
                    Err(e) => {
                        log::debug!("mp3 decode stopped early: {}", e);
                        break;
                    }
                }
            }
            let available = self.carry.len() - self.carry_pos;
            let n = available.min(out.len() - written);
            out[written..written + n]
                .copy_from_slice(&self.carry[self.carry_pos..self.carry_pos + n]);
            self.carry_pos += n;
            written += n;
        }
        written
    }

    /// Count frames by walking packet headers, then rewind to the start
    fn scan_total_frames(&mut self) -> DecodeResult<u64> {
        let mut frames = 0u64;
        loop {
            match self.format.next_packet() {
                Ok(packet) => {
                    if packet.track_id() == self.track_id {
                        frames += packet.dur();
                    }
                }
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(DecodeError::OpenFailed(e.to_string())),
            }
        }
        self.format
            .seek(
                SeekMode::Accurate,
                SeekTo::TimeStamp {
                    ts: 0,
                    track_id: self.track_id,
                },
            )
            .map_err(|e| DecodeError::OpenFailed(format!("rewind after frame scan: {}", e)))?;
        Ok(frames)
    }

    /// Decode the next packet of our track into the carry buffer
    ///
    /// `Ok(false)` means end of stream.
    fn decode_next_frame(&mut self) -> DecodeResult<bool> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(false);
                }
                Err(e) => return Err(DecodeError::InvalidData(e.to_string())),
            };
            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => return Err(DecodeError::InvalidData(e.to_string())),
            };
            if decoded.frames() == 0 {
                continue;
            }

            // Initialize or grow the conversion buffer, then stage the
            // packet's samples for the copy loop.
            let needed = decoded.capacity();
            let needs_alloc = match &self.sample_buf {
                Some(buf) => buf.capacity() < needed * decoded.spec().channels.count(),
                None => true,
            };
            if needs_alloc {
                self.sample_buf = Some(SampleBuffer::new(needed as u64, *decoded.spec()));
            }
            if let Some(buf) = &mut self.sample_buf {
                buf.copy_interleaved_ref(decoded);
                self.carry.clear();
                self.carry.extend_from_slice(buf.samples());
                self.carry_pos = 0;
            }
            return Ok(true);
        }
    }

    /// Decode and throw away `count` interleaved samples
    fn discard_samples(&mut self, mut count: u64) {
        let mut scratch = [0i16; MAX_FRAME_SAMPLES];
        while count > 0 {
            let want = count.min(scratch.len() as u64) as usize;
            let got = self.read_samples(&mut scratch[..want]);
            if got == 0 {
                break;
            }
            count -= got as u64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 0xFFFB: MPEG-1 Layer III; 0x90: 128 kbit/s, 44.1 kHz.
    #[test]
    fn test_frame_header_valid_layer3() {
        assert!(frame_header_valid(&[0xFF, 0xFB, 0x90, 0x00]));
    }

    #[test]
    fn test_frame_header_valid_mpeg2() {
        // 0xF2: MPEG-2 Layer III.
        assert!(frame_header_valid(&[0xFF, 0xF2, 0x90, 0x00]));
        // 0xE2: MPEG-2.5 Layer III.
        assert!(frame_header_valid(&[0xFF, 0xE2, 0x90, 0x00]));
    }

    #[test]
    fn test_frame_header_free_format_bitrate() {
        assert!(frame_header_valid(&[0xFF, 0xFB, 0x00, 0x00]));
    }

    #[test]
    fn test_frame_header_rejects_missing_sync() {
        assert!(!frame_header_valid(&[0x00, 0xFB, 0x90, 0x00]));
        assert!(!frame_header_valid(&[0xFF, 0x0B, 0x90, 0x00]));
    }

    #[test]
    fn test_frame_header_rejects_reserved_layer() {
        // Layer bits 00 are reserved.
        assert!(!frame_header_valid(&[0xFF, 0xF9, 0x90, 0x00]));
    }

    #[test]
    fn test_frame_header_rejects_bad_bitrate_index() {
        // Bitrate index 15 is invalid.
        assert!(!frame_header_valid(&[0xFF, 0xFB, 0xF0, 0x00]));
    }

    #[test]
    fn test_frame_header_rejects_bad_sample_rate_index() {
        // Sample-rate index 3 is reserved.
        assert!(!frame_header_valid(&[0xFF, 0xFB, 0x9C, 0x00]));
    }

    #[test]
    fn test_frame_header_rejects_short_slice() {
        assert!(!frame_header_valid(&[0xFF, 0xFB, 0x90]));
        assert!(!frame_header_valid(&[]));
    }
}
