//! Channel layouts and stream metadata for decoded audio

use std::time::Duration;

/// Role of one channel within an interleaved sample frame
///
/// Closed set of speaker positions. A stream's channel map lists one role
/// per channel, in interleave order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundChannel {
    Mono,
    FrontLeft,
    FrontRight,
    FrontCenter,
    FrontLeftOfCenter,
    FrontRightOfCenter,
    LowFrequencyEffects,
    BackLeft,
    BackRight,
    BackCenter,
    SideLeft,
    SideRight,
    TopCenter,
    TopFrontLeft,
    TopFrontRight,
    TopFrontCenter,
    TopBackLeft,
    TopBackRight,
    TopBackCenter,
}

/// Properties of an opened audio stream
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamInfo {
    /// Number of interleaved channels
    pub channel_count: u32,
    /// Samples per second, per channel
    pub sample_rate: u32,
    /// Total interleaved samples across the whole stream
    pub sample_count: u64,
    /// Role of each channel, in interleave order
    ///
    /// Empty when the stream reported no channels; otherwise its length
    /// equals `channel_count`.
    pub channel_map: Vec<SoundChannel>,
}

impl StreamInfo {
    /// Playback length of the stream
    pub fn duration(&self) -> Duration {
        if self.channel_count == 0 || self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let frames = self.sample_count / u64::from(self.channel_count);
        Duration::from_secs_f64(frames as f64 / f64::from(self.sample_rate))
    }
}
