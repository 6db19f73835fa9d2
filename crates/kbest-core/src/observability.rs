// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Receives progress fractions in `[0, 1]` during a selection run.
pub trait ProgressSink: Sync {
    fn on_progress(&self, fraction: f32);
}

/// Receives named scalar measurements emitted by a selection run.
pub trait TelemetrySink: Sync {
    fn record_scalar(&self, key: &'static str, value: f64);
}
