//! Audio output abstraction.
//!
//! When the native library is not configured to play through its own audio
//! device, decoded PCM is handed to a host-registered [`AudioSink`]. The sink
//! is called on the native background thread and must not touch host-owned
//! objects.

use serde::{Deserialize, Serialize};

/// Sample encoding of delivered PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleType {
    Int16NativeEndian,
}

/// Stream metadata describing the decoded PCM format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_type: SampleType,
    /// Sample rate in hertz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
}

impl AudioFormat {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_type: SampleType::Int16NativeEndian,
            sample_rate,
            channels,
        }
    }

    /// Number of whole frames in an interleaved sample buffer.
    pub fn frames_in(&self, samples: &[i16]) -> usize {
        if self.channels == 0 {
            return 0;
        }
        samples.len() / self.channels as usize
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::new(44_100, 2)
    }
}

/// Receives decoded audio from the native library.
pub trait AudioSink: Send + Sync {
    /// Consumes interleaved samples and returns how many frames were taken.
    ///
    /// Returning fewer frames than offered asks the native side to redeliver
    /// the remainder later.
    fn deliver(&self, format: &AudioFormat, samples: &[i16]) -> usize;

    /// Drops any buffered audio, e.g. after a seek or stop.
    fn flush(&self) {}
}
