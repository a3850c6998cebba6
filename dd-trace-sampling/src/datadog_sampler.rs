// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use dd_trace::sampling::SamplingDecision;
use dd_trace::{dd_debug, dd_warn, Config};

use crate::clock::{Clock, SystemClock};
use crate::config::RulesSamplerConfig;
use crate::priority_sampler::PrioritySampler;
use crate::rules_sampler::RulesSampler;
use crate::sampling_rule::SamplingRule;
use crate::types::SpanLike;

/// Callback replacing the sampling rules, for remote updates
pub type SamplingRulesCallback = Box<dyn for<'a> Fn(&'a [SamplingRule]) + Send + Sync>;

/// A composite sampler taking the sampling decision of the root span of a trace.
///
/// The rules sampler is consulted first. Spans it does not handle are sampled with the rates
/// provided by the agent.
#[derive(Debug)]
pub struct DatadogSampler<C: Clock = SystemClock> {
    rules: Arc<RulesSampler<C>>,
    priority: PrioritySampler,
}

impl DatadogSampler<SystemClock> {
    pub fn new(rules: Vec<SamplingRule>, config: &RulesSamplerConfig) -> Self {
        Self::with_clock(rules, config, SystemClock)
    }

    /// Creates a sampler from the tracer configuration
    pub fn from_config(rules: Vec<SamplingRule>, config: &Config) -> Self {
        Self::new(rules, &RulesSamplerConfig::from_config(config))
    }
}

impl<C: Clock> DatadogSampler<C> {
    pub fn with_clock(rules: Vec<SamplingRule>, config: &RulesSamplerConfig, clock: C) -> Self {
        DatadogSampler {
            rules: Arc::new(RulesSampler::with_clock(rules, config, clock)),
            priority: PrioritySampler::new(),
        }
    }

    pub fn rules_sampler(&self) -> &RulesSampler<C> {
        &self.rules
    }

    pub fn priority_sampler(&self) -> &PrioritySampler {
        &self.priority
    }

    /// Takes the sampling decision for `span` and records it on the span
    pub fn sample<S: SpanLike + ?Sized>(&self, span: &mut S) -> SamplingDecision {
        if let Some(decision) = self.rules.sample(span) {
            return decision;
        }
        self.priority.apply(span)
    }

    /// Creates a callback updating the agent rates from the body of an agent response.
    ///
    /// Responses that cannot be decoded are logged and leave the rates unchanged.
    pub fn on_agent_response(&self) -> Box<dyn for<'a> Fn(&'a str) + Send + Sync> {
        let priority = self.priority.clone();
        Box::new(move |body: &str| {
            if let Err(e) = priority.update_rates_json(body) {
                dd_warn!("DatadogSampler: ignoring agent response: {e}");
            }
        })
    }
}

impl<C: Clock + Send + Sync + 'static> DatadogSampler<C> {
    /// Creates a callback replacing the sampling rules
    pub fn on_rules_update(&self) -> SamplingRulesCallback {
        let rules_sampler = Arc::clone(&self.rules);
        Box::new(move |rules: &[SamplingRule]| {
            dd_debug!("DatadogSampler: updating {} sampling rules", rules.len());
            rules_sampler.update_rules(rules.to_vec());
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::clock::ManualClock;
    use crate::test_utils::TestSpan;
    use dd_trace::constants::{
        SAMPLING_AGENT_RATE_TAG_KEY, SAMPLING_DECISION_MAKER_TAG_KEY, SAMPLING_PRIORITY_TAG_KEY,
        SAMPLING_RULE_RATE_TAG_KEY,
    };
    use dd_trace::log::{test_logger, Level};
    use dd_trace::sampling::{mechanism, priority};

    #[test]
    fn test_rules_take_precedence() {
        let sampler = DatadogSampler::new(
            vec![SamplingRule::service_rule("web", 0.0)],
            &RulesSamplerConfig::default(),
        );
        sampler
            .priority_sampler()
            .update_rates([("service:web,env:".to_string(), 1.0)]);

        let mut span = TestSpan::new(1, "web", "http.request");
        let decision = sampler.sample(&mut span);
        assert_eq!(decision.priority, priority::AUTO_REJECT);
        assert_eq!(decision.mechanism, mechanism::LOCAL_USER_TRACE_SAMPLING_RULE);
        assert_eq!(span.metric(SAMPLING_RULE_RATE_TAG_KEY), Some(0.0));
        assert_eq!(span.metric(SAMPLING_AGENT_RATE_TAG_KEY), None);
    }

    #[test]
    fn test_unhandled_spans_use_agent_rates() {
        let sampler = DatadogSampler::new(
            vec![SamplingRule::service_rule("web", 1.0)],
            &RulesSamplerConfig::default(),
        );
        sampler
            .priority_sampler()
            .update_rates([("service:api,env:prod".to_string(), 0.0)]);

        let mut span = TestSpan::new(u64::MAX, "api", "http.request").with_env("prod");
        let decision = sampler.sample(&mut span);
        assert_eq!(decision.priority, priority::AUTO_REJECT);
        assert_eq!(decision.mechanism, mechanism::AGENT_RATE_BY_SERVICE);
        assert_eq!(span.metric(SAMPLING_AGENT_RATE_TAG_KEY), Some(0.0));
        assert_eq!(span.metric(SAMPLING_RULE_RATE_TAG_KEY), None);
        assert_eq!(span.tag(SAMPLING_DECISION_MAKER_TAG_KEY), Some("-1"));

        // no entry, the default rate keeps everything
        let mut span = TestSpan::new(u64::MAX, "api", "http.request").with_env("dev");
        let decision = sampler.sample(&mut span);
        assert_eq!(decision.priority, priority::AUTO_KEEP);
        assert_eq!(decision.mechanism, mechanism::DEFAULT);
        assert_eq!(span.metric(SAMPLING_PRIORITY_TAG_KEY), Some(1.0));
    }

    #[test]
    fn test_fallback_rate_handles_every_span() {
        let config = RulesSamplerConfig {
            sample_rate: Some(1.0),
            ..Default::default()
        };
        let sampler = DatadogSampler::new(vec![], &config);
        sampler
            .priority_sampler()
            .update_rates([("service:,env:".to_string(), 0.0)]);

        let decision = sampler.sample(&mut TestSpan::new(3, "api", "op"));
        assert_eq!(decision.priority, priority::AUTO_KEEP);
        assert_eq!(decision.mechanism, mechanism::LOCAL_USER_TRACE_SAMPLING_RULE);
    }

    #[test]
    fn test_on_agent_response() {
        let _g = test_logger::activate_test_logger();
        let sampler = DatadogSampler::new(vec![], &RulesSamplerConfig::default());
        let callback = sampler.on_agent_response();

        callback(r#"{"rate_by_service": {"service:,env:": 0.3, "service:web,env:prod": 0.9}}"#);
        assert_eq!(sampler.priority_sampler().default_rate(), 0.3);
        assert_eq!(sampler.priority_sampler().rate_for("web", "prod"), 0.9);
        assert_eq!(sampler.priority_sampler().rate_for("api", "prod"), 0.3);

        callback("{not json");
        assert_eq!(sampler.priority_sampler().rate_for("web", "prod"), 0.9);
        let logs = test_logger::take_test_logs().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].0, Level::Warn);
        assert!(logs[0].1.contains("ignoring agent response"), "{logs:?}");
    }

    #[test]
    fn test_on_rules_update() {
        let sampler = DatadogSampler::new(
            vec![SamplingRule::service_rule("web", 1.0)],
            &RulesSamplerConfig::default(),
        );
        let callback = sampler.on_rules_update();

        callback(&[
            SamplingRule::service_rule("api", 0.5),
            SamplingRule::operation_rule("query", 2.0),
        ]);
        assert_eq!(sampler.rules_sampler().rules().len(), 1);

        let decision = sampler.sample(&mut TestSpan::new(1, "web", "op"));
        assert_eq!(decision.mechanism, mechanism::DEFAULT);
        let decision = sampler.sample(&mut TestSpan::new(1, "api", "op"));
        assert_eq!(decision.mechanism, mechanism::LOCAL_USER_TRACE_SAMPLING_RULE);
    }

    #[test]
    fn test_rate_limited_rules() {
        let clock = ManualClock::at_unix_secs(50);
        let config = RulesSamplerConfig {
            rate_limit: Some(2.0),
            ..Default::default()
        };
        let sampler =
            DatadogSampler::with_clock(vec![SamplingRule::rate_rule(1.0)], &config, clock.clone());

        let kept = (0..10)
            .filter(|id| sampler.sample(&mut TestSpan::new(*id, "web", "op")).priority.is_keep())
            .count();
        assert_eq!(kept, 2);

        clock.advance(Duration::from_millis(500));
        let kept = (0..10)
            .filter(|id| sampler.sample(&mut TestSpan::new(*id, "web", "op")).priority.is_keep())
            .count();
        assert_eq!(kept, 1);
    }

    #[test]
    fn test_from_config() {
        let mut builder = Config::builder();
        builder
            .set_trace_sample_rate(0.5)
            .set_trace_rate_limit(10.0);
        let sampler = DatadogSampler::from_config(vec![], &builder.build());
        assert_eq!(sampler.rules_sampler().sample_rate(), 0.5);
        assert_eq!(sampler.rules_sampler().limiter().burst(), Some(5));
    }
}
