// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::RwLock;

use crate::constants::{numeric, rate};
use crate::sampler::Sampler;
use crate::types::SpanLike;
use numeric::{KNUTH_FACTOR, MAX_UINT_64BITS};

/// Decides whether the trace with the given id is kept at `sample_rate`.
///
/// The trace id is scrambled with Knuth's multiplicative hash and compared to the share of the
/// `u64` range covered by the rate. The result only depends on its inputs, so every process
/// seeing the same trace takes the same decision. For a given trace id, raising the rate never
/// turns a keep into a drop.
pub fn sampled_by_rate(trace_id: u64, sample_rate: f64) -> bool {
    if sample_rate >= rate::MAX_SAMPLE_RATE {
        return true;
    }
    // Saturating cast: negative and NaN rates give a zero threshold
    let threshold = (sample_rate * MAX_UINT_64BITS as f64) as u64;
    trace_id.wrapping_mul(KNUTH_FACTOR) < threshold
}

/// Keeps (100 * `sample_rate`)% of the traces.
///
/// The rate can be changed at any time, concurrently with sampling.
pub struct RateSampler {
    sample_rate: RwLock<f64>,
}

impl fmt::Debug for RateSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateSampler")
            .field("sample_rate", &self.sample_rate())
            .finish()
    }
}

impl RateSampler {
    /// `sample_rate` is clamped between 0.0 and 1.0 inclusive.
    pub fn new(sample_rate: f64) -> Self {
        RateSampler {
            sample_rate: RwLock::new(Self::clamp(sample_rate)),
        }
    }

    /// A sampler keeping everything
    pub fn all() -> Self {
        Self::new(rate::MAX_SAMPLE_RATE)
    }

    fn clamp(sample_rate: f64) -> f64 {
        sample_rate.clamp(rate::MIN_SAMPLE_RATE, rate::MAX_SAMPLE_RATE)
    }

    /// Returns the current sample rate
    pub fn sample_rate(&self) -> f64 {
        *self.sample_rate.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Sets a new sample rate for the sampler.
    /// `sample_rate` is clamped between 0.0 and 1.0 inclusive.
    pub fn set_sample_rate(&self, sample_rate: f64) {
        *self.sample_rate.write().unwrap_or_else(|e| e.into_inner()) = Self::clamp(sample_rate);
    }

    /// Samples a trace id at the current rate
    pub fn sample_trace_id(&self, trace_id: u64) -> bool {
        sampled_by_rate(trace_id, self.sample_rate())
    }
}

impl Default for RateSampler {
    fn default() -> Self {
        Self::all()
    }
}

impl Sampler for RateSampler {
    fn sample<S: SpanLike + ?Sized>(&self, span: &S) -> bool {
        self.sample_trace_id(span.trace_id())
    }
}
