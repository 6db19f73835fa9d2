// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::KbestError;
use crate::observability::{ProgressSink, TelemetrySink};

/// Resource limits applied to a selection run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    /// Upper bound on the bytes of DP state a run may allocate.
    pub memory_budget_bytes: Option<usize>,
}

/// Unified execution context passed through selector calls.
pub struct ExecutionContext<'a> {
    pub limits: &'a Limits,
    pub progress: Option<&'a dyn ProgressSink>,
    pub telemetry: Option<&'a dyn TelemetrySink>,
}

impl<'a> ExecutionContext<'a> {
    /// Creates a context with no optional hooks.
    pub fn new(limits: &'a Limits) -> Self {
        Self {
            limits,
            progress: None,
            telemetry: None,
        }
    }

    /// Sets an optional progress sink.
    pub fn with_progress_sink(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Sets an optional telemetry sink.
    pub fn with_telemetry_sink(mut self, telemetry: &'a dyn TelemetrySink) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Returns true when `required_bytes` fits the configured memory budget.
    pub fn fits_memory_budget(&self, required_bytes: usize) -> bool {
        self.limits
            .memory_budget_bytes
            .is_none_or(|limit| required_bytes <= limit)
    }

    /// Fails with a resource-limit error when `required_bytes` exceeds the
    /// configured memory budget.
    pub fn enforce_memory_budget(&self, required_bytes: usize, what: &str) -> Result<(), KbestError> {
        if let Some(limit_bytes) = self.limits.memory_budget_bytes
            && required_bytes > limit_bytes
        {
            return Err(KbestError::resource_limit(format!(
                "limits.memory_budget_bytes exceeded for {what}: required_bytes={required_bytes}, limit_bytes={limit_bytes}; increase limits.memory_budget_bytes or use checkpointed reconstruction"
            )));
        }
        Ok(())
    }

    /// Emits clamped progress to the sink, if configured.
    pub fn report_progress(&self, fraction: f32) {
        if !fraction.is_finite() {
            return;
        }

        if let Some(sink) = self.progress {
            sink.on_progress(fraction.clamp(0.0, 1.0));
        }
    }

    /// Emits a scalar telemetry value to the sink, if configured.
    pub fn record_scalar(&self, key: &'static str, value: f64) {
        if let Some(sink) = self.telemetry {
            sink.record_scalar(key, value);
        }
    }
}
