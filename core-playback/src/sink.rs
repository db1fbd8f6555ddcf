//! # Buffered Audio Sink
//!
//! An [`AudioSink`] that queues PCM frames delivered by the native library
//! until the host's audio output pulls them.
//!
//! ## Design
//!
//! - **Producer**: the native playback thread calls [`AudioSink::deliver`].
//! - **Consumer**: the host's audio callback calls [`BufferedSink::read`].
//! - **Capacity**: fixed, in frames. A full sink accepts only what fits and
//!   reports how many frames it took, so the native side resends the rest.
//!
//! ## Usage
//!
//! ```rust
//! use bridge_traits::{AudioFormat, AudioSink};
//! use core_playback::sink::BufferedSink;
//!
//! // Half a second of stereo audio at 44.1 kHz
//! let sink = BufferedSink::new(22_050);
//!
//! let format = AudioFormat::new(44_100, 2);
//! let accepted = sink.deliver(&format, &[100, -100, 200, -200]);
//! assert_eq!(accepted, 2);
//!
//! let mut output = vec![0i16; 1024];
//! assert_eq!(sink.read(&mut output), 4);
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use bridge_traits::{AudioFormat, AudioSink};
use parking_lot::Mutex;
use tracing::{debug, trace};

struct Buffer {
    samples: VecDeque<i16>,
    format: Option<AudioFormat>,
}

/// Bounded PCM queue between the native thread and the host audio output.
#[derive(Clone)]
pub struct BufferedSink {
    inner: Arc<Mutex<Buffer>>,
    capacity_frames: usize,
}

impl BufferedSink {
    /// Create a sink holding at most `capacity_frames` frames.
    pub fn new(capacity_frames: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Buffer {
                samples: VecDeque::new(),
                format: None,
            })),
            capacity_frames,
        }
    }

    /// Reads interleaved samples into `output`.
    ///
    /// Returns the number of samples written, always a whole number of frames.
    pub fn read(&self, output: &mut [i16]) -> usize {
        let mut buffer = self.inner.lock();
        let channels = buffer
            .format
            .map(|format| usize::from(format.channels.max(1)))
            .unwrap_or(1);
        let whole = (output.len().min(buffer.samples.len()) / channels) * channels;

        for (slot, sample) in output.iter_mut().zip(buffer.samples.drain(..whole)) {
            *slot = sample;
        }
        whole
    }

    /// Format of the most recent delivery.
    pub fn format(&self) -> Option<AudioFormat> {
        self.inner.lock().format
    }

    /// Frames currently queued.
    pub fn available_frames(&self) -> usize {
        let buffer = self.inner.lock();
        let channels = buffer
            .format
            .map(|format| usize::from(format.channels.max(1)))
            .unwrap_or(1);
        buffer.samples.len() / channels
    }

    pub fn capacity_frames(&self) -> usize {
        self.capacity_frames
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().samples.is_empty()
    }

    /// Returns the buffer fill level (0.0 to 1.0).
    pub fn fill_level(&self) -> f32 {
        if self.capacity_frames == 0 {
            return 1.0;
        }
        self.available_frames() as f32 / self.capacity_frames as f32
    }

    /// Discards every queued sample.
    pub fn clear(&self) {
        self.inner.lock().samples.clear();
    }
}

impl AudioSink for BufferedSink {
    fn deliver(&self, format: &AudioFormat, samples: &[i16]) -> usize {
        let mut buffer = self.inner.lock();

        if buffer.format.as_ref() != Some(format) {
            if !buffer.samples.is_empty() {
                debug!(?format, "Audio format changed, dropping queued samples");
                buffer.samples.clear();
            }
            buffer.format = Some(*format);
        }

        let channels = usize::from(format.channels.max(1));
        let queued_frames = buffer.samples.len() / channels;
        let free_frames = self.capacity_frames.saturating_sub(queued_frames);
        let accepted = format.frames_in(samples).min(free_frames);

        buffer
            .samples
            .extend(samples[..accepted * channels].iter().copied());
        trace!(accepted, offered = format.frames_in(samples), "Audio delivered");
        accepted
    }

    fn flush(&self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo() -> AudioFormat {
        AudioFormat::new(44_100, 2)
    }

    #[test]
    fn test_deliver_then_read() {
        let sink = BufferedSink::new(16);
        assert_eq!(sink.deliver(&stereo(), &[1, 2, 3, 4, 5, 6]), 3);
        assert_eq!(sink.available_frames(), 3);

        let mut output = [0i16; 4];
        assert_eq!(sink.read(&mut output), 4);
        assert_eq!(output, [1, 2, 3, 4]);
        assert_eq!(sink.available_frames(), 1);
    }

    #[test]
    fn test_full_sink_accepts_partial_delivery() {
        let sink = BufferedSink::new(2);
        assert_eq!(sink.deliver(&stereo(), &[1, 2, 3, 4, 5, 6]), 2);
        assert_eq!(sink.deliver(&stereo(), &[7, 8]), 0);
        assert!((sink.fill_level() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_read_returns_whole_frames() {
        let sink = BufferedSink::new(8);
        sink.deliver(&stereo(), &[1, 2, 3, 4]);

        let mut output = [0i16; 3];
        assert_eq!(sink.read(&mut output), 2);
        assert_eq!(sink.available_frames(), 1);
    }

    #[test]
    fn test_format_change_drops_queued_samples() {
        let sink = BufferedSink::new(8);
        sink.deliver(&stereo(), &[1, 2, 3, 4]);
        sink.deliver(&AudioFormat::new(48_000, 1), &[9]);

        assert_eq!(sink.format(), Some(AudioFormat::new(48_000, 1)));
        let mut output = [0i16; 8];
        assert_eq!(sink.read(&mut output), 1);
        assert_eq!(output[0], 9);
    }

    #[test]
    fn test_flush_clears() {
        let sink = BufferedSink::new(8);
        sink.deliver(&stereo(), &[1, 2]);
        sink.flush();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_deliver_from_another_thread() {
        let sink = BufferedSink::new(1024);
        let producer = sink.clone();
        std::thread::spawn(move || {
            for _ in 0..4 {
                producer.deliver(&stereo(), &[0; 64]);
            }
        })
        .join()
        .unwrap();
        assert_eq!(sink.available_frames(), 128);
    }
}
