// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Shared constants for the dd-trace-sampling crate

/// Sampling rate limits
pub mod rate {
    /// Rate of a priority sampler that has not received agent rates yet
    pub const DEFAULT_SAMPLE_RATE: f64 = 1.0;
    /// Maximum sampling rate
    pub const MAX_SAMPLE_RATE: f64 = 1.0;
    /// Minimum sampling rate
    pub const MIN_SAMPLE_RATE: f64 = 0.0;
    /// Global sample rate used when none is configured, `0` means unset
    pub const UNSET_SAMPLE_RATE: f64 = 0.0;
}

/// Numeric constants used in sampling algorithms
pub mod numeric {
    /// Knuth's multiplicative hash factor for deterministic sampling, shared with the agent and
    /// every other tracer
    pub const KNUTH_FACTOR: u64 = 1_111_111_111_111_111_111;
    /// Maximum 64-bit unsigned integer value
    pub const MAX_UINT_64BITS: u64 = u64::MAX;
}

/// Agent rate table
pub mod agent {
    /// Key of the rate applied to services the agent sent no rate for
    pub const DEFAULT_RATE_KEY: &str = "service:,env:";
}
