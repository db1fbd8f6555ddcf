//! # Bridge Configuration Module
//!
//! Provides configuration management for the native bridge.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `BridgeConfig` instance holding the native session and the policies the
//! host applies on top of it. It enforces fail-fast validation so a host
//! cannot start without a native library to talk to.
//!
//! ## Required Dependencies
//!
//! - `NativeSession` - The native client library
//!
//! ## Optional Dependencies
//!
//! - `AudioSink` - Host audio output. Playback is refused without one unless
//!   `native_audio` is enabled.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{BridgeConfig, ReentryPolicy};
//! use std::sync::Arc;
//!
//! let config = BridgeConfig::builder()
//!     .native_session(Arc::new(MyNativeSession::new()))
//!     .reentry_policy(ReentryPolicy::Reject)
//!     .search_limit(20)
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Environment Overrides
//!
//! [`BridgeConfigBuilder::from_env`] reads `BRIDGE_SIGNAL_CAPACITY` (maximum
//! pending events, `0` for unbounded) and `BRIDGE_NATIVE_AUDIO` (`1`/`true`).

use crate::error::{Error, Result};
use bridge_traits::{AudioSink, NativeSession};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const ENV_SIGNAL_CAPACITY: &str = "BRIDGE_SIGNAL_CAPACITY";
pub const ENV_NATIVE_AUDIO: &str = "BRIDGE_NATIVE_AUDIO";

/// What a browse or search request does while the previous one is still
/// outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReentryPolicy {
    /// Fail with `OperationAlreadyInProgress`.
    #[default]
    Reject,
    /// Return without doing anything; the new callback is discarded.
    Ignore,
}

/// Default per-category paging for searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDefaults {
    pub offset: u32,
    pub limit: u32,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 10,
        }
    }
}

/// Cross-thread signal settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Hard limit on pending events. `None` is unbounded.
    pub capacity: Option<usize>,
    /// Events older than this when drained are logged as slow.
    pub slow_delivery_threshold: Duration,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            capacity: None,
            slow_delivery_threshold: Duration::from_millis(250),
        }
    }
}

impl SignalConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_slow_delivery_threshold(mut self, threshold: Duration) -> Self {
        self.slow_delivery_threshold = threshold;
        self
    }
}

/// Bridge configuration.
///
/// Use [`BridgeConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct BridgeConfig {
    /// The native client library (required)
    pub native_session: Arc<dyn NativeSession>,

    /// Host audio output (optional)
    pub audio_sink: Option<Arc<dyn AudioSink>>,

    /// The native library plays through its own audio device
    pub native_audio: bool,

    pub reentry_policy: ReentryPolicy,

    pub search_defaults: SearchDefaults,

    pub signal: SignalConfig,
}

impl BridgeConfig {
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Search limit is non-zero
    /// - Signal capacity, when set, is non-zero
    /// - An audio sink and native audio are not both configured
    pub fn validate(&self) -> Result<()> {
        if self.search_defaults.limit == 0 {
            return Err(Error::Config(
                "Search limit must be greater than 0".to_string(),
            ));
        }

        if self.signal.capacity == Some(0) {
            return Err(Error::Config(
                "Signal capacity must be greater than 0. Leave it unset for an unbounded queue."
                    .to_string(),
            ));
        }

        if self.native_audio && self.audio_sink.is_some() {
            return Err(Error::Config(
                "Native audio enabled but an AudioSink was also provided. \
                 Choose one audio output."
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// `true` when playback has somewhere to send audio.
    pub fn has_audio_output(&self) -> bool {
        self.native_audio || self.audio_sink.is_some()
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("native_session", &"<NativeSession>")
            .field("audio_sink", &self.audio_sink.as_ref().map(|_| "<AudioSink>"))
            .field("native_audio", &self.native_audio)
            .field("reentry_policy", &self.reentry_policy)
            .field("search_defaults", &self.search_defaults)
            .field("signal", &self.signal)
            .finish()
    }
}

fn native_session_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "NativeSession".to_string(),
        message: "A NativeSession implementation is required to issue browse, search \
                 and playback requests. Inject the native client library adapter, or \
                 the in-memory session for tests."
            .to_string(),
    }
}

/// Builder for [`BridgeConfig`].
#[derive(Default)]
pub struct BridgeConfigBuilder {
    native_session: Option<Arc<dyn NativeSession>>,
    audio_sink: Option<Arc<dyn AudioSink>>,
    native_audio: bool,
    reentry_policy: ReentryPolicy,
    search_defaults: SearchDefaults,
    signal: SignalConfig,
}

impl BridgeConfigBuilder {
    /// Starts a builder with values taken from the environment.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::default();

        if let Ok(raw) = std::env::var(ENV_SIGNAL_CAPACITY) {
            let capacity: usize = raw.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "{} must be a non-negative integer, got '{}'",
                    ENV_SIGNAL_CAPACITY, raw
                ))
            })?;
            builder.signal.capacity = (capacity > 0).then_some(capacity);
        }

        if let Ok(raw) = std::env::var(ENV_NATIVE_AUDIO) {
            builder.native_audio = matches!(raw.trim(), "1" | "true" | "TRUE" | "yes");
        }

        Ok(builder)
    }

    pub fn native_session(mut self, session: Arc<dyn NativeSession>) -> Self {
        self.native_session = Some(session);
        self
    }

    pub fn audio_sink(mut self, sink: Arc<dyn AudioSink>) -> Self {
        self.audio_sink = Some(sink);
        self
    }

    pub fn native_audio(mut self, enabled: bool) -> Self {
        self.native_audio = enabled;
        self
    }

    pub fn reentry_policy(mut self, policy: ReentryPolicy) -> Self {
        self.reentry_policy = policy;
        self
    }

    pub fn search_offset(mut self, offset: u32) -> Self {
        self.search_defaults.offset = offset;
        self
    }

    pub fn search_limit(mut self, limit: u32) -> Self {
        self.search_defaults.limit = limit;
        self
    }

    pub fn signal(mut self, signal: SignalConfig) -> Self {
        self.signal = signal;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// - `CapabilityMissing` if no native session was provided
    /// - `Config` if validation fails
    pub fn build(self) -> Result<BridgeConfig> {
        let native_session = self
            .native_session
            .ok_or_else(native_session_missing_error)?;

        let config = BridgeConfig {
            native_session,
            audio_sink: self.audio_sink,
            native_audio: self.native_audio,
            reentry_policy: self.reentry_policy,
            search_defaults: self.search_defaults,
            signal: self.signal,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::native::MockNativeSession;
    use bridge_traits::AudioFormat;

    struct NullSink;

    impl AudioSink for NullSink {
        fn deliver(&self, format: &AudioFormat, samples: &[i16]) -> usize {
            format.frames_in(samples)
        }
    }

    fn native() -> Arc<dyn NativeSession> {
        Arc::new(MockNativeSession::new())
    }

    #[test]
    fn test_builder_requires_native_session() {
        let result = BridgeConfig::builder().build();
        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "NativeSession");
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_defaults() {
        let config = BridgeConfig::builder()
            .native_session(native())
            .build()
            .unwrap();

        assert_eq!(config.reentry_policy, ReentryPolicy::Reject);
        assert_eq!(config.search_defaults, SearchDefaults { offset: 0, limit: 10 });
        assert_eq!(config.signal.capacity, None);
        assert!(!config.native_audio);
        assert!(!config.has_audio_output());
    }

    #[test]
    fn test_builder_with_all_fields() {
        let config = BridgeConfig::builder()
            .native_session(native())
            .audio_sink(Arc::new(NullSink))
            .reentry_policy(ReentryPolicy::Ignore)
            .search_offset(5)
            .search_limit(25)
            .signal(SignalConfig::default().with_capacity(64))
            .build()
            .unwrap();

        assert_eq!(config.reentry_policy, ReentryPolicy::Ignore);
        assert_eq!(config.search_defaults.offset, 5);
        assert_eq!(config.search_defaults.limit, 25);
        assert_eq!(config.signal.capacity, Some(64));
        assert!(config.has_audio_output());
    }

    #[test]
    fn test_validate_rejects_zero_search_limit() {
        let result = BridgeConfig::builder()
            .native_session(native())
            .search_limit(0)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let result = BridgeConfig::builder()
            .native_session(native())
            .signal(SignalConfig::default().with_capacity(0))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_two_audio_outputs() {
        let result = BridgeConfig::builder()
            .native_session(native())
            .native_audio(true)
            .audio_sink(Arc::new(NullSink))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_from_env_overrides() {
        std::env::set_var(ENV_SIGNAL_CAPACITY, "128");
        std::env::set_var(ENV_NATIVE_AUDIO, "true");
        let builder = BridgeConfigBuilder::from_env();
        std::env::set_var(ENV_SIGNAL_CAPACITY, "many");
        let invalid = BridgeConfigBuilder::from_env();
        std::env::remove_var(ENV_SIGNAL_CAPACITY);
        std::env::remove_var(ENV_NATIVE_AUDIO);

        let config = builder.unwrap().native_session(native()).build().unwrap();
        assert_eq!(config.signal.capacity, Some(128));
        assert!(config.native_audio);
        assert!(matches!(invalid, Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_hides_trait_objects() {
        let config = BridgeConfig::builder()
            .native_session(native())
            .build()
            .unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("<NativeSession>"));
        assert!(debug.contains("Reject"));
    }
}
