// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use std::collections::HashMap;

use dd_trace::constants::ENV_TAG_KEY;

use crate::types::SpanLike;

/// Minimal span recording the tags set by the samplers
#[derive(Debug, Clone, Default)]
pub(crate) struct TestSpan {
    trace_id: u64,
    service: String,
    name: String,
    meta: HashMap<&'static str, String>,
    metrics: HashMap<&'static str, f64>,
}

impl TestSpan {
    pub(crate) fn new(trace_id: u64, service: &str, name: &str) -> Self {
        TestSpan {
            trace_id,
            service: service.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub(crate) fn with_env(mut self, env: &str) -> Self {
        self.meta.insert(ENV_TAG_KEY, env.to_string());
        self
    }

    pub(crate) fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }

    pub(crate) fn tag(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }
}

impl SpanLike for TestSpan {
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
        Cow::Borrowed(self.tag(ENV_TAG_KEY).unwrap_or_default())
    }

    fn set_metric(&mut self, key: &'static str, value: f64) {
        self.metrics.insert(key, value);
    }

    fn set_tag(&mut self, key: &'static str, value: Cow<'static, str>) {
        self.meta.insert(key, value.into_owned());
    }
}
