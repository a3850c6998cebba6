// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use regex::Regex;

use crate::constants::rate;
use crate::rate_sampler::sampled_by_rate;
use crate::types::SpanLike;

/// Criterion a single span field is checked against
#[derive(Clone, Debug, Default)]
pub enum Matcher {
    /// Matches any value
    #[default]
    Unset,
    /// Matches the value exactly, case sensitive
    Exact(String),
    /// Matches values containing a match of the regular expression, anchor it with `^...$` to
    /// match whole values
    Pattern(Regex),
}

impl Matcher {
    /// An exact matcher. An empty string matches everything.
    pub fn exact(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Matcher::Unset
        } else {
            Matcher::Exact(value)
        }
    }

    /// Compiles `pattern` into a regular expression matcher
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Matcher::Pattern)
    }

    pub fn matches(&self, subject: &str) -> bool {
        match self {
            Matcher::Unset => true,
            Matcher::Exact(expected) => expected == subject,
            Matcher::Pattern(re) => re.is_match(subject),
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Matcher::Unset)
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Unset => f.write_str("*"),
            Matcher::Exact(expected) => write!(f, "{expected:?}"),
            Matcher::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<Regex> for Matcher {
    fn from(re: Regex) -> Self {
        Matcher::Pattern(re)
    }
}

/// Applies a sample rate to the spans matching its service and operation criteria.
///
/// A span matches when every criterion matches. Unset criteria match everything.
#[derive(Clone, Debug)]
pub struct SamplingRule {
    service: Matcher,
    operation: Matcher,
    sample_rate: f64,
}

impl SamplingRule {
    pub fn new(service: Matcher, operation: Matcher, sample_rate: f64) -> Self {
        SamplingRule {
            service,
            operation,
            sample_rate,
        }
    }

    /// Applies `sample_rate` to the spans of `service`
    pub fn service_rule(service: impl Into<String>, sample_rate: f64) -> Self {
        Self::new(Matcher::exact(service), Matcher::Unset, sample_rate)
    }

    /// Applies `sample_rate` to the spans named `operation`
    pub fn operation_rule(operation: impl Into<String>, sample_rate: f64) -> Self {
        Self::new(Matcher::Unset, Matcher::exact(operation), sample_rate)
    }

    /// Applies `sample_rate` to the spans of `service` named `operation`
    pub fn service_operation_rule(
        service: impl Into<String>,
        operation: impl Into<String>,
        sample_rate: f64,
    ) -> Self {
        Self::new(
            Matcher::exact(service),
            Matcher::exact(operation),
            sample_rate,
        )
    }

    /// Applies `sample_rate` to all spans
    pub fn rate_rule(sample_rate: f64) -> Self {
        Self::new(Matcher::Unset, Matcher::Unset, sample_rate)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn service(&self) -> &Matcher {
        &self.service
    }

    pub fn operation(&self) -> &Matcher {
        &self.operation
    }

    /// Whether the rate lies in `[0, 1]`. Rules outside of it are never applied.
    pub fn is_valid(&self) -> bool {
        (rate::MIN_SAMPLE_RATE..=rate::MAX_SAMPLE_RATE).contains(&self.sample_rate)
    }

    pub fn matches<S: SpanLike + ?Sized>(&self, span: &S) -> bool {
        self.service.matches(&span.service()) && self.operation.matches(&span.operation_name())
    }

    /// Samples a trace id using this rule's sample rate
    pub fn sample(&self, trace_id: u64) -> bool {
        sampled_by_rate(trace_id, self.sample_rate)
    }
}

impl fmt::Display for SamplingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{service: {}, operation: {}, rate: {}}}",
            self.service, self.operation, self.sample_rate
        )
    }
}
