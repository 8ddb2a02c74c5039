// SPDX-License-Identifier: GPL-3.0-only

//! Haptic feedback.
//!
//! Key presses request a short vibration through a [`HapticSink`]. Pulses
//! are fire-and-forget: a sink that cannot vibrate reports an error, which
//! [`Haptics`] logs at debug level and drops.

use crate::config::Config;
use std::fmt;
use std::time::Duration;

/// Errors a haptic device can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HapticError {
    /// The device has no vibration capability.
    Unsupported,
    /// The device failed to vibrate.
    DeviceFailure(String),
}

impl fmt::Display for HapticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HapticError::Unsupported => write!(f, "haptic feedback is not supported"),
            HapticError::DeviceFailure(msg) => write!(f, "haptic device failure: {}", msg),
        }
    }
}

impl std::error::Error for HapticError {}

/// Something that can produce a vibration pulse.
pub trait HapticSink {
    fn pulse(&mut self, duration: Duration) -> Result<(), HapticError>;
}

/// A sink for devices without vibration.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl HapticSink for NoHaptics {
    fn pulse(&mut self, _duration: Duration) -> Result<(), HapticError> {
        Err(HapticError::Unsupported)
    }
}

/// A sink that records pulses in the trace log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHaptics {
    pulses: u64,
}

impl TracingHaptics {
    pub fn pulses(&self) -> u64 {
        self.pulses
    }
}

impl HapticSink for TracingHaptics {
    fn pulse(&mut self, duration: Duration) -> Result<(), HapticError> {
        self.pulses += 1;
        tracing::trace!("Haptic pulse {}ms", duration.as_millis());
        Ok(())
    }
}

/// Feedback settings plus the sink they drive.
pub struct Haptics {
    sink: Box<dyn HapticSink>,
    enabled: bool,
    duration: Duration,
}

impl fmt::Debug for Haptics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Haptics")
            .field("enabled", &self.enabled)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

impl Default for Haptics {
    fn default() -> Self {
        Self::new(Box::new(NoHaptics), &Config::default())
    }
}

impl Haptics {
    /// Creates feedback driven by `sink` with settings from `config`.
    pub fn new(sink: Box<dyn HapticSink>, config: &Config) -> Self {
        Self {
            sink,
            enabled: config.vibration_enabled,
            duration: config.vibration_duration(),
        }
    }

    /// Picks up new vibration settings.
    pub fn configure(&mut self, config: &Config) {
        self.enabled = config.vibration_enabled;
        self.duration = config.vibration_duration();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pulses for the configured key-press duration, if enabled.
    pub fn key_pulse(&mut self) {
        if self.enabled {
            self.send(self.duration);
        }
    }

    /// Pulses for an explicit duration, regardless of the key-press setting.
    pub fn pulse_for(&mut self, duration: Duration) {
        self.send(duration);
    }

    fn send(&mut self, duration: Duration) {
        if let Err(e) = self.sink.pulse(duration) {
            tracing::debug!("Haptic pulse dropped: {}", e);
        }
    }
}
