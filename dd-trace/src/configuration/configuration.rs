// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use super::sources::{CompositeConfigSourceResult, CompositeSource};
use super::supported_configurations::SupportedConfigurations;
use crate::dd_warn;
use crate::log::LevelFilter;

#[derive(Debug, Clone)]
#[non_exhaustive]
/// Configuration for the Datadog Tracer
///
/// Values only go through type parsing here. Range checks (a sample rate must lie in `[0, 1]`,
/// a rate limit must not be negative) are left to the components consuming them so that
/// they can fall back to their own defaults.
///
/// # Usage
/// ```
/// use dd_trace::Config;
///
/// // This pulls configuration from the environment
/// let mut builder = Config::builder();
///
/// // Manual overrides
/// builder
///     .set_service("my-service".to_string())
///     .set_trace_rate_limit(100.0);
///
/// // Finalize the configuration
/// let config = builder.build();
/// assert_eq!(config.trace_rate_limit(), Some(100.0));
/// ```
pub struct Config {
    // # Service tagging
    service: String,
    env: Option<String>,

    // # Sampling
    /// Rate applied to root spans no sampling rule matched
    trace_sample_rate: Option<f64>,
    /// Maximum number of rule sampled spans to keep per second, per process
    trace_rate_limit: Option<f64>,
    /// JSON array of sampling rules, replaces the rules given in code
    trace_sampling_rules: Option<String>,

    /// The log level for the tracer
    log_level_filter: LevelFilter,
}

impl Config {
    fn from_sources(sources: &CompositeSource) -> Self {
        let default = Config::default();

        /// Keeps the value of the highest precedence source, parse failures are reported and
        /// dropped so that a lower precedence source or the default applies instead.
        fn to_val<T>(res: CompositeConfigSourceResult<T>) -> Option<T> {
            for error in &res.errors {
                dd_warn!("Config: ignoring invalid value for {}: {}", res.name, error);
            }
            res.value.map(|c| c.value)
        }

        /// Empty variables count as unset
        struct NonEmpty(String);

        impl FromStr for NonEmpty {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.trim().is_empty() {
                    Err("value is empty")
                } else {
                    Ok(NonEmpty(s.to_string()))
                }
            }
        }

        fn non_empty(sources: &CompositeSource, name: SupportedConfigurations) -> Option<String> {
            sources
                .get_parse::<NonEmpty>(name)
                .value
                .map(|c| c.value.0)
        }

        Self {
            service: non_empty(sources, SupportedConfigurations::DD_SERVICE)
                .unwrap_or(default.service),
            env: non_empty(sources, SupportedConfigurations::DD_ENV).or(default.env),
            trace_sample_rate: non_empty(sources, SupportedConfigurations::DD_TRACE_SAMPLE_RATE)
                .and_then(|_| {
                    to_val(sources.get_parse(SupportedConfigurations::DD_TRACE_SAMPLE_RATE))
                })
                .or(default.trace_sample_rate),
            trace_rate_limit: non_empty(sources, SupportedConfigurations::DD_TRACE_RATE_LIMIT)
                .and_then(|_| {
                    to_val(sources.get_parse(SupportedConfigurations::DD_TRACE_RATE_LIMIT))
                })
                .or(default.trace_rate_limit),
            trace_sampling_rules: non_empty(
                sources,
                SupportedConfigurations::DD_TRACE_SAMPLING_RULES,
            )
            .or(default.trace_sampling_rules),
            log_level_filter: to_val(sources.get_parse(SupportedConfigurations::DD_LOG_LEVEL))
                .unwrap_or(default.log_level_filter),
        }
    }

    fn builder_with_sources(sources: &CompositeSource) -> ConfigBuilder {
        ConfigBuilder {
            config: Config::from_sources(sources),
        }
    }

    /// Creates a new builder to set overrides detected configuration
    pub fn builder() -> ConfigBuilder {
        Self::builder_with_sources(&CompositeSource::default_sources())
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn env(&self) -> Option<&str> {
        self.env.as_deref()
    }

    pub fn trace_sample_rate(&self) -> Option<f64> {
        self.trace_sample_rate
    }

    pub fn trace_rate_limit(&self) -> Option<f64> {
        self.trace_rate_limit
    }

    pub fn trace_sampling_rules(&self) -> Option<&str> {
        self.trace_sampling_rules.as_deref()
    }

    pub fn log_level_filter(&self) -> LevelFilter {
        self.log_level_filter
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            service: "unnamed-rust-service".to_string(),
            env: None,
            trace_sample_rate: None,
            trace_rate_limit: None,
            trace_sampling_rules: None,
            log_level_filter: LevelFilter::default(),
        }
    }
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Finalizes the builder and returns the configuration
    ///
    /// The configured log level becomes the library's maximum log level.
    pub fn build(self) -> Config {
        crate::log::set_max_level(self.config.log_level_filter);
        self.config
    }

    pub fn set_service(&mut self, service: String) -> &mut Self {
        self.config.service = service;
        self
    }

    pub fn set_env(&mut self, env: String) -> &mut Self {
        self.config.env = Some(env);
        self
    }

    pub fn set_trace_sample_rate(&mut self, sample_rate: f64) -> &mut Self {
        self.config.trace_sample_rate = Some(sample_rate);
        self
    }

    pub fn set_trace_rate_limit(&mut self, rate_limit: f64) -> &mut Self {
        self.config.trace_rate_limit = Some(rate_limit);
        self
    }

    pub fn set_trace_sampling_rules(&mut self, rules_json: String) -> &mut Self {
        self.config.trace_sampling_rules = Some(rules_json);
        self
    }

    pub fn set_log_level_filter(&mut self, filter: LevelFilter) -> &mut Self {
        self.config.log_level_filter = filter;
        self
    }
}
