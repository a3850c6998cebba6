// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use dd_trace::{dd_warn, Config};
use serde::Deserialize;
use serde_json::Value;

use crate::constants::rate::{MAX_SAMPLE_RATE, MIN_SAMPLE_RATE, UNSET_SAMPLE_RATE};
use crate::sampling_rule::SamplingRule;

/// Configuration of the [`RulesSampler`](crate::RulesSampler)
///
/// Values are validated when the sampler is built. Invalid values are reported with a warning
/// and replaced by their default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RulesSamplerConfig {
    /// Rate applied to spans no rule matches. Unset or 0 defers those spans to the priority
    /// sampler.
    pub sample_rate: Option<f64>,
    /// Maximum number of rule sampled spans kept per second. Unset means unbounded.
    pub rate_limit: Option<f64>,
    /// JSON list of `{"service", "operation", "rate"}` objects replacing the rules given in
    /// code when set
    pub rules_override: Option<String>,
}

/// An entry of the rules override document
#[derive(Debug, Deserialize)]
struct SamplingRuleConfig {
    #[serde(default)]
    service: Option<String>,
    #[serde(default)]
    operation: Option<String>,
    #[serde(default)]
    rate: Option<Value>,
}

impl RulesSamplerConfig {
    pub fn from_config(config: &Config) -> Self {
        RulesSamplerConfig {
            sample_rate: config.trace_sample_rate(),
            rate_limit: config.trace_rate_limit(),
            rules_override: config.trace_sampling_rules().map(str::to_string),
        }
    }

    /// The validated fallback rate, 0 when unset or invalid
    pub fn fallback_rate(&self) -> f64 {
        match self.sample_rate {
            None => UNSET_SAMPLE_RATE,
            Some(r) if (MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&r) => r,
            Some(r) => {
                dd_warn!(
                    "using default rate {UNSET_SAMPLE_RATE} because provided value is out of range: {r}"
                );
                UNSET_SAMPLE_RATE
            }
        }
    }

    /// The validated rate limit, `None` when unbounded
    pub fn limit(&self) -> Option<f64> {
        match self.rate_limit {
            None => None,
            Some(l) if l.is_nan() => {
                dd_warn!("using default rate limit because DD_TRACE_RATE_LIMIT is invalid: {l}");
                None
            }
            Some(l) if l < 0.0 => {
                dd_warn!("using default rate limit because DD_TRACE_RATE_LIMIT is negative: {l}");
                None
            }
            Some(l) if l.is_infinite() => None,
            Some(l) => Some(l),
        }
    }

    /// Parses the rules override.
    ///
    /// Returns `None` when there is no override or when the document is malformed. Entries
    /// without a usable rate are skipped with a warning. Rates are not range checked here.
    pub fn override_rules(&self) -> Option<Vec<SamplingRule>> {
        let json = self.rules_override.as_deref()?;
        if json.trim().is_empty() {
            return None;
        }
        let entries: Vec<SamplingRuleConfig> = match serde_json::from_str(json) {
            Ok(entries) => entries,
            Err(e) => {
                dd_warn!("error parsing DD_TRACE_SAMPLING_RULES: {e}");
                return None;
            }
        };
        Some(entries.into_iter().filter_map(SamplingRuleConfig::into_rule).collect())
    }
}

impl SamplingRuleConfig {
    fn into_rule(self) -> Option<SamplingRule> {
        let rate = match self.rate {
            None | Some(Value::Null) => {
                dd_warn!("error parsing rule: rate not provided");
                return None;
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                dd_warn!("error parsing rule: rate not provided");
                return None;
            }
            Some(Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(rate) => rate,
                Err(e) => {
                    dd_warn!("error parsing rule: invalid rate {s:?}: {e}");
                    return None;
                }
            },
            Some(Value::Number(n)) => match n.as_f64() {
                Some(rate) => rate,
                None => {
                    dd_warn!("error parsing rule: invalid rate {n}");
                    return None;
                }
            },
            Some(other) => {
                dd_warn!("error parsing rule: invalid rate {other}");
                return None;
            }
        };

        let service = self.service.unwrap_or_default();
        let operation = self.operation.unwrap_or_default();
        match (service.is_empty(), operation.is_empty()) {
            (false, false) => Some(SamplingRule::service_operation_rule(
                service, operation, rate,
            )),
            (false, true) => Some(SamplingRule::service_rule(service, rate)),
            (true, false) => Some(SamplingRule::operation_rule(operation, rate)),
            (true, true) => {
                dd_warn!("error parsing rule: neither service nor operation provided");
                None
            }
        }
    }
}
