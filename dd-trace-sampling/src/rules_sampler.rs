// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::{Mutex, RwLock};
use std::time::SystemTime;

use dd_trace::constants::{
    RL_EFFECTIVE_RATE, SAMPLING_DECISION_MAKER_TAG_KEY, SAMPLING_PRIORITY_TAG_KEY,
    SAMPLING_RULE_RATE_TAG_KEY,
};
use dd_trace::dd_warn;
use dd_trace::sampling::{mechanism, SamplingDecision, SamplingPriority};

use crate::clock::{truncate_to_second, Clock, SystemClock};
use crate::config::RulesSamplerConfig;
use crate::constants::rate::{MAX_SAMPLE_RATE, UNSET_SAMPLE_RATE};
use crate::rate_limiter::RateLimiter;
use crate::rate_sampler::sampled_by_rate;
use crate::sampling_rule::SamplingRule;
use crate::types::SpanLike;

/// Counters of the spans that reached the rate limiter during the current second
#[derive(Debug)]
struct RollingWindow {
    /// Start of the window, on a whole second
    start: SystemTime,
    allowed: u64,
    total: u64,
    /// Ratio of allowed spans over the previous window
    previous_rate: f64,
}

impl RollingWindow {
    fn new(now: SystemTime) -> Self {
        RollingWindow {
            start: truncate_to_second(now),
            allowed: 0,
            total: 0,
            previous_rate: 0.0,
        }
    }

    /// Starts a new window once a whole second has elapsed.
    ///
    /// The previous rate is only kept when exactly one second elapsed, an idle gap of several
    /// seconds resets it to 0.
    fn roll(&mut self, now: SystemTime) {
        let elapsed = now.duration_since(self.start).unwrap_or_default().as_secs();
        if elapsed < 1 {
            return;
        }
        self.previous_rate = if elapsed == 1 && self.total > 0 {
            self.allowed as f64 / self.total as f64
        } else {
            0.0
        };
        self.start = truncate_to_second(now);
        self.allowed = 0;
        self.total = 0;
    }

    fn effective_rate(&self) -> f64 {
        let current = if self.total == 0 {
            0.0
        } else {
            self.allowed as f64 / self.total as f64
        };
        (self.previous_rate + current) / 2.0
    }
}

/// Samples spans with user defined rules, a fallback rate and a rate limiter.
///
/// The first rule matching a span gives its rate. When no rule matches, the fallback rate is
/// used. When there is no fallback rate either the span is not handled and should be given to
/// the [`PrioritySampler`](crate::PrioritySampler).
///
/// Spans kept by the rate then go through the rate limiter, which bounds the number of spans
/// kept per second. Every span reaching the limiter is tagged with the effective rate, the
/// ratio of spans allowed by the limiter smoothed over the current and the previous second.
pub struct RulesSampler<C: Clock = SystemClock> {
    rules: RwLock<Vec<SamplingRule>>,
    sample_rate: f64,
    limiter: RateLimiter,
    window: Mutex<RollingWindow>,
    clock: C,
}

impl<C: Clock> fmt::Debug for RulesSampler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RulesSampler")
            .field(
                "rules",
                &*self.rules.read().unwrap_or_else(|e| e.into_inner()),
            )
            .field("sample_rate", &self.sample_rate)
            .field("limiter", &self.limiter)
            .finish()
    }
}

/// Validates `rules`, dropping the ones with a rate outside of `[0, 1]`.
///
/// When `config` holds a well formed rules override, it replaces `rules` altogether.
pub fn applied_sampling_rules(
    rules: Vec<SamplingRule>,
    config: &RulesSamplerConfig,
) -> Vec<SamplingRule> {
    let rules = config.override_rules().unwrap_or(rules);
    valid_rules(rules)
}

fn valid_rules(rules: Vec<SamplingRule>) -> Vec<SamplingRule> {
    rules
        .into_iter()
        .filter(|rule| {
            let valid = rule.is_valid();
            if !valid {
                dd_warn!("ignoring rule {rule}: rate is out of range");
            }
            valid
        })
        .collect()
}

impl RulesSampler<SystemClock> {
    pub fn new(rules: Vec<SamplingRule>, config: &RulesSamplerConfig) -> Self {
        Self::with_clock(rules, config, SystemClock)
    }
}

impl<C: Clock> RulesSampler<C> {
    /// Creates a sampler reading the time from `clock`
    pub fn with_clock(rules: Vec<SamplingRule>, config: &RulesSamplerConfig, clock: C) -> Self {
        let sample_rate = config.fallback_rate();
        // Without a fallback rate the burst is sized for unsampled traffic
        let sizing_rate = if sample_rate == UNSET_SAMPLE_RATE {
            MAX_SAMPLE_RATE
        } else {
            sample_rate
        };
        let limiter = RateLimiter::from_throughput(sizing_rate, config.limit());
        let window = Mutex::new(RollingWindow::new(clock.now()));
        RulesSampler {
            rules: RwLock::new(applied_sampling_rules(rules, config)),
            sample_rate,
            limiter,
            window,
            clock,
        }
    }

    /// Returns a copy of the active rules
    pub fn rules(&self) -> Vec<SamplingRule> {
        self.rules.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The fallback rate, 0 when unset
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Replaces the active rules. Rules with an invalid rate are dropped.
    pub fn update_rules(&self, rules: Vec<SamplingRule>) {
        let rules = valid_rules(rules);
        *self.rules.write().unwrap_or_else(|e| e.into_inner()) = rules;
    }

    fn matching_rate<S: SpanLike + ?Sized>(&self, span: &S) -> Option<f64> {
        self.rules
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|rule| rule.matches(span))
            .map(SamplingRule::sample_rate)
    }

    /// Samples `span` and records the decision on it.
    ///
    /// Returns whether the span was handled. Spans that are not handled are left untouched.
    pub fn apply<S: SpanLike + ?Sized>(&self, span: &mut S) -> bool {
        self.sample(span).is_some()
    }

    /// Same as [`RulesSampler::apply`], returning the decision of handled spans
    pub fn sample<S: SpanLike + ?Sized>(&self, span: &mut S) -> Option<SamplingDecision> {
        let rate = match self.matching_rate(span) {
            Some(rate) => rate,
            None if self.sample_rate == UNSET_SAMPLE_RATE => return None,
            None => self.sample_rate,
        };

        span.set_metric(SAMPLING_RULE_RATE_TAG_KEY, rate);
        span.set_tag(
            SAMPLING_DECISION_MAKER_TAG_KEY,
            mechanism::LOCAL_USER_TRACE_SAMPLING_RULE.to_cow(),
        );

        let priority = if sampled_by_rate(span.trace_id(), rate) {
            let (allowed, effective_rate) = self.admit();
            span.set_metric(RL_EFFECTIVE_RATE, effective_rate);
            SamplingPriority::auto(allowed)
        } else {
            SamplingPriority::auto(false)
        };
        span.set_metric(SAMPLING_PRIORITY_TAG_KEY, f64::from(priority.into_i8()));

        Some(SamplingDecision {
            priority,
            mechanism: mechanism::LOCAL_USER_TRACE_SAMPLING_RULE,
        })
    }

    /// Submits one span to the rate limiter, returning whether it was allowed and the
    /// effective rate
    fn admit(&self) -> (bool, f64) {
        let mut window = self.window.lock().unwrap_or_else(|e| e.into_inner());
        let now = self.clock.now();
        window.roll(now);

        window.total += 1;
        let allowed = self.limiter.try_admit(now);
        if allowed {
            window.allowed += 1;
        }
        (allowed, window.effective_rate())
    }
}
