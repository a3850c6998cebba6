// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Sampling decisions for Datadog traces
//!
//! The [`DatadogSampler`] takes the decision for the root span of a trace. Spans matching a
//! [`SamplingRule`], or all spans when a fallback rate is configured, are sampled by the
//! [`RulesSampler`] and then throttled by its [`RateLimiter`]. The other spans are sampled by
//! the [`PrioritySampler`] with the per service rates sent back by the agent.
//!
//! Decisions only depend on the trace id and the applied rate, so every process taking part in
//! a trace keeps or drops it consistently.

pub mod clock;
pub mod config;
pub mod constants;
pub mod datadog_sampler;
pub mod priority_sampler;
pub mod rate_limiter;
pub mod rate_sampler;
pub mod rules_sampler;
pub mod sampler;
pub mod sampling_rule;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RulesSamplerConfig;
pub use datadog_sampler::{DatadogSampler, SamplingRulesCallback};
pub use priority_sampler::PrioritySampler;
pub use rate_limiter::RateLimiter;
pub use rate_sampler::{sampled_by_rate, RateSampler};
pub use rules_sampler::{applied_sampling_rules, RulesSampler};
pub use sampler::Sampler;
pub use sampling_rule::{Matcher, SamplingRule};
pub use types::SpanLike;
