// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use std::collections::HashMap;

use dd_trace_sampling::SpanLike;

/// Span owned by the caller, as a tracer would have it
#[derive(Debug, Default)]
struct Span {
    trace_id: u64,
    service: String,
    name: String,
    meta: HashMap<&'static str, String>,
    metrics: HashMap<&'static str, f64>,
}

impl Span {
    fn new(trace_id: u64, service: &str, name: &str, env: &str) -> Self {
        let mut span = Span {
            trace_id,
            service: service.to_string(),
            name: name.to_string(),
            ..Default::default()
        };
        if !env.is_empty() {
            span.meta.insert("env", env.to_string());
        }
        span
    }
}

impl SpanLike for Span {
    fn trace_id(&self) -> u64 {
        self.trace_id
    }

    fn service(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.service)
    }

    fn operation_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }

    fn env(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.meta.get("env").map_or("", String::as_str))
    }

    fn set_metric(&mut self, key: &'static str, value: f64) {
        self.metrics.insert(key, value);
    }

    fn set_tag(&mut self, key: &'static str, value: Cow<'static, str>) {
        self.meta.insert(key, value.into_owned());
    }
}

/// Spreads sequential ids over the whole `u64` range
fn trace_ids(n: u64) -> impl Iterator<Item = u64> {
    (0..n).map(|i| i.wrapping_mul(0x9e37_79b9_7f4a_7c15))
}

mod composite {
    use dd_trace::constants::{
        RL_EFFECTIVE_RATE, SAMPLING_AGENT_RATE_TAG_KEY, SAMPLING_DECISION_MAKER_TAG_KEY,
        SAMPLING_PRIORITY_TAG_KEY, SAMPLING_RULE_RATE_TAG_KEY,
    };
    use dd_trace::sampling::mechanism;
    use dd_trace_sampling::{sampled_by_rate, DatadogSampler, RulesSamplerConfig, SamplingRule};

    use crate::{trace_ids, Span};

    #[test]
    fn test_rules_then_agent_rates() {
        let config = RulesSamplerConfig {
            rate_limit: Some(1_000.0),
            ..Default::default()
        };
        let sampler = DatadogSampler::new(
            vec![
                SamplingRule::service_rule("checkout", 1.0),
                SamplingRule::operation_rule("healthcheck", 0.0),
            ],
            &config,
        );
        let on_agent_response = sampler.on_agent_response();
        on_agent_response(
            r#"{"rate_by_service": {"service:,env:": 0.8, "service:search,env:prod": 0.2}}"#,
        );

        let mut checkout = Span::new(1, "checkout", "http.request", "prod");
        assert!(sampler.sample(&mut checkout).priority.is_keep());
        assert_eq!(checkout.metrics[SAMPLING_RULE_RATE_TAG_KEY], 1.0);
        assert_eq!(checkout.metrics[SAMPLING_PRIORITY_TAG_KEY], 1.0);
        assert_eq!(checkout.metrics[RL_EFFECTIVE_RATE], 0.5);
        assert_eq!(checkout.meta[SAMPLING_DECISION_MAKER_TAG_KEY], "-3");
        assert!(!checkout.metrics.contains_key(SAMPLING_AGENT_RATE_TAG_KEY));

        let mut health = Span::new(2, "search", "healthcheck", "prod");
        assert!(!sampler.sample(&mut health).priority.is_keep());
        assert_eq!(health.metrics[SAMPLING_PRIORITY_TAG_KEY], 0.0);
        assert!(!health.metrics.contains_key(RL_EFFECTIVE_RATE));

        for trace_id in trace_ids(200) {
            let mut search = Span::new(trace_id, "search", "http.request", "prod");
            let decision = sampler.sample(&mut search);
            assert_eq!(decision.mechanism, mechanism::AGENT_RATE_BY_SERVICE);
            assert_eq!(decision.priority.is_keep(), sampled_by_rate(trace_id, 0.2));
            assert_eq!(search.metrics[SAMPLING_AGENT_RATE_TAG_KEY], 0.2);

            let mut other = Span::new(trace_id, "search", "http.request", "staging");
            let decision = sampler.sample(&mut other);
            assert_eq!(decision.priority.is_keep(), sampled_by_rate(trace_id, 0.8));
            assert_eq!(other.metrics[SAMPLING_AGENT_RATE_TAG_KEY], 0.8);
        }
    }

    #[test]
    fn test_independent_samplers_agree() {
        let payload = r#"{"rate_by_service": {"service:web,env:": 0.3}}"#;
        let rules = || vec![SamplingRule::service_rule("api", 0.6)];
        let first = DatadogSampler::new(rules(), &RulesSamplerConfig::default());
        let second = DatadogSampler::new(rules(), &RulesSamplerConfig::default());
        first.priority_sampler().update_rates_json(payload).unwrap();
        second.priority_sampler().update_rates_json(payload).unwrap();

        for trace_id in trace_ids(1_000) {
            for service in ["web", "api"] {
                let a = first.sample(&mut Span::new(trace_id, service, "op", ""));
                let b = second.sample(&mut Span::new(trace_id, service, "op", ""));
                assert_eq!(a, b, "trace {trace_id} of {service}");
            }
        }
    }

    #[test]
    fn test_rules_override_from_config() {
        let mut builder = dd_trace::Config::builder();
        builder.set_trace_sampling_rules(
            r#"[{"service": "web", "operation": "db.query", "rate": "0"}]"#.to_string(),
        );
        let sampler = DatadogSampler::from_config(
            vec![SamplingRule::service_rule("web", 1.0)],
            &builder.build(),
        );

        let mut query = Span::new(7, "web", "db.query", "");
        let decision = sampler.sample(&mut query);
        assert!(!decision.priority.is_keep());
        assert_eq!(decision.mechanism, mechanism::LOCAL_USER_TRACE_SAMPLING_RULE);

        // the rule given in code is replaced, the agent rates apply
        let mut request = Span::new(7, "web", "http.request", "");
        let decision = sampler.sample(&mut request);
        assert_eq!(decision.mechanism, mechanism::DEFAULT);
    }
}

mod concurrency {
    use std::sync::Arc;
    use std::thread;

    use dd_trace::constants::RL_EFFECTIVE_RATE;
    use dd_trace_sampling::{
        DatadogSampler, ManualClock, PrioritySampler, RateSampler, RulesSamplerConfig,
        SamplingRule,
    };

    use crate::{trace_ids, Span};

    #[test]
    fn test_rate_limit_is_shared_across_threads() {
        let clock = ManualClock::at_unix_secs(1_700_000_000);
        let config = RulesSamplerConfig {
            rate_limit: Some(100.0),
            ..Default::default()
        };
        let sampler = Arc::new(DatadogSampler::with_clock(
            vec![SamplingRule::rate_rule(1.0)],
            &config,
            clock,
        ));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let sampler = Arc::clone(&sampler);
                thread::spawn(move || {
                    let mut kept = 0;
                    for i in 0..100 {
                        let mut span = Span::new(t * 1_000 + i, "web", "op", "");
                        if sampler.sample(&mut span).priority.is_keep() {
                            kept += 1;
                        }
                        let effective_rate = span.metrics[RL_EFFECTIVE_RATE];
                        assert!((0.0..=1.0).contains(&effective_rate));
                    }
                    kept
                })
            })
            .collect();

        let kept: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(kept, 100);
    }

    #[test]
    fn test_table_updates_while_sampling() {
        let sampler = PrioritySampler::new();
        let updater = {
            let sampler = sampler.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    let rate = if i % 2 == 0 { 0.0 } else { 1.0 };
                    sampler.update_rates([
                        ("service:web,env:".to_string(), rate),
                        ("service:,env:".to_string(), rate),
                    ]);
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let sampler = sampler.clone();
                thread::spawn(move || {
                    for trace_id in trace_ids(500) {
                        // both entries are always updated together
                        let web = sampler.rate_for("web", "");
                        assert!(web == 0.0 || web == 1.0);
                        let mut span = Span::new(trace_id, "web", "op", "");
                        sampler.apply(&mut span);
                    }
                })
            })
            .collect();

        updater.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(sampler.rate_for("web", ""), 1.0);
        assert_eq!(sampler.default_rate(), 1.0);
    }

    #[test]
    fn test_rate_sampler_shared() {
        let sampler = Arc::new(RateSampler::new(0.5));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sampler = Arc::clone(&sampler);
                thread::spawn(move || trace_ids(10_000).filter(|id| sampler.sample_trace_id(*id)).count())
            })
            .collect();
        let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(counts.windows(2).all(|w| w[0] == w[1]));
        let observed = counts[0] as f64 / 10_000.0;
        assert!((observed - 0.5).abs() < 0.02, "observed {observed}");
    }
}
