// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::{
    collections::HashMap,
    io,
    sync::{Arc, RwLock},
};

use dd_trace::constants::{
    SAMPLING_AGENT_RATE_TAG_KEY, SAMPLING_DECISION_MAKER_TAG_KEY, SAMPLING_PRIORITY_TAG_KEY,
};
use dd_trace::sampling::{mechanism, SamplingDecision, SamplingMechanism, SamplingPriority};

use crate::constants::{agent::DEFAULT_RATE_KEY, rate::DEFAULT_SAMPLE_RATE};
use crate::rate_sampler::sampled_by_rate;
use crate::types::SpanLike;

/// Rates sent back by the agent in response to trace payloads
#[derive(Debug, Default, serde::Deserialize)]
struct AgentRates {
    #[serde(default)]
    rate_by_service: Option<HashMap<String, f64>>,
}

#[derive(Debug)]
struct RateTable {
    /// Rates keyed by `service:{service},env:{env}`
    rates: HashMap<String, f64>,
    /// Rate of the spans whose service and env have no entry
    default_rate: f64,
    default_from_agent: bool,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            rates: HashMap::new(),
            default_rate: DEFAULT_SAMPLE_RATE,
            default_from_agent: false,
        }
    }
}

fn service_key(service: &str, env: &str) -> String {
    format!("service:{service},env:{env}")
}

/// Applies the per service and env sampling rates provided by the agent.
///
/// Clones share the same rate table.
#[derive(Debug, Default, Clone)]
pub struct PrioritySampler {
    inner: Arc<RwLock<RateTable>>,
}

impl PrioritySampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the rate table with the `rate_by_service` field of an agent response.
    ///
    /// On decoding errors the previous rates are kept.
    pub fn update_rates_json(&self, payload: &str) -> dd_trace::Result<()> {
        let rates: AgentRates = serde_json::from_str(payload)
            .map_err(|e| dd_trace::Error::from(e).context("decoding agent rates"))?;
        self.update_rates(rates.rate_by_service.unwrap_or_default());
        Ok(())
    }

    /// Same as [`PrioritySampler::update_rates_json`], reading the payload from `reader`
    pub fn read_rates_json<R: io::Read>(&self, reader: R) -> dd_trace::Result<()> {
        let rates: AgentRates = serde_json::from_reader(reader)
            .map_err(|e| dd_trace::Error::from(e).context("decoding agent rates"))?;
        self.update_rates(rates.rate_by_service.unwrap_or_default());
        Ok(())
    }

    /// Replaces the whole rate table.
    ///
    /// The `service:,env:` entry, if present, becomes the default rate. Otherwise the current
    /// default is carried over.
    pub fn update_rates<I: IntoIterator<Item = (String, f64)>>(&self, rates: I) {
        let mut rates: HashMap<String, f64> = rates.into_iter().collect();
        let new_default = rates.remove(DEFAULT_RATE_KEY);

        let mut table = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let (default_rate, default_from_agent) = match new_default {
            Some(rate) => (rate, true),
            None => (table.default_rate, table.default_from_agent),
        };
        *table = RateTable {
            rates,
            default_rate,
            default_from_agent,
        };
    }

    /// Returns the rate applied to spans of `service` in `env`
    pub fn rate_for(&self, service: &str, env: &str) -> f64 {
        self.lookup(service, env).0
    }

    /// Returns the rate applied to spans with no dedicated entry
    pub fn default_rate(&self) -> f64 {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .default_rate
    }

    fn lookup(&self, service: &str, env: &str) -> (f64, SamplingMechanism) {
        let key = service_key(service, env);
        let table = self.inner.read().unwrap_or_else(|e| e.into_inner());
        match table.rates.get(&key) {
            Some(rate) => (*rate, mechanism::AGENT_RATE_BY_SERVICE),
            None if table.default_from_agent => {
                (table.default_rate, mechanism::AGENT_RATE_BY_SERVICE)
            }
            None => (table.default_rate, mechanism::DEFAULT),
        }
    }

    /// Takes the sampling decision for `span` and records it on the span, along with the rate
    /// that was applied.
    pub fn apply<S: SpanLike + ?Sized>(&self, span: &mut S) -> SamplingDecision {
        let (rate, mechanism) = self.lookup(&span.service(), &span.env());
        let priority = SamplingPriority::auto(sampled_by_rate(span.trace_id(), rate));

        span.set_metric(SAMPLING_PRIORITY_TAG_KEY, f64::from(priority.into_i8()));
        span.set_metric(SAMPLING_AGENT_RATE_TAG_KEY, rate);
        span.set_tag(SAMPLING_DECISION_MAKER_TAG_KEY, mechanism.to_cow());

        SamplingDecision {
            priority,
            mechanism,
        }
    }

    #[allow(dead_code)]
    pub(crate) fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .rates
            .len()
    }

    #[allow(dead_code)]
    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .rates
            .contains_key(key)
    }
}
