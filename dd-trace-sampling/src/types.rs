// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Type definitions and traits for sampling

use std::borrow::Cow;

/// A trait for accessing and tagging the span a sampling decision is taken for.
///
/// The samplers never own spans. They read the identifying fields and record their decision
/// as tags on the span.
///
/// # Examples
///
/// ```
/// use std::borrow::Cow;
/// use std::collections::HashMap;
/// use dd_trace_sampling::SpanLike;
///
/// struct MySpan {
///     trace_id: u64,
///     service: String,
///     name: String,
///     meta: HashMap<&'static str, String>,
///     metrics: HashMap<&'static str, f64>,
/// }
///
/// impl SpanLike for MySpan {
///     fn trace_id(&self) -> u64 {
///         self.trace_id
///     }
///
///     fn service(&self) -> Cow<'_, str> {
///         Cow::Borrowed(&self.service)
///     }
///
///     fn operation_name(&self) -> Cow<'_, str> {
///         Cow::Borrowed(&self.name)
///     }
///
///     fn env(&self) -> Cow<'_, str> {
///         self.meta.get("env").map_or(Cow::Borrowed(""), |e| Cow::Borrowed(e.as_str()))
///     }
///
///     fn set_metric(&mut self, key: &'static str, value: f64) {
///         self.metrics.insert(key, value);
///     }
///
///     fn set_tag(&mut self, key: &'static str, value: Cow<'static, str>) {
///         self.meta.insert(key, value.into_owned());
///     }
/// }
/// ```
pub trait SpanLike {
    /// Returns the lower 64 bits of the trace id.
    ///
    /// Every process taking part in the trace sees the same value, which is what makes the
    /// sampling decision consistent across them.
    fn trace_id(&self) -> u64;

    /// Returns the service name of the span.
    fn service(&self) -> Cow<'_, str>;

    /// Returns the operation name of the span.
    fn operation_name(&self) -> Cow<'_, str>;

    /// Returns the environment of the span, or an empty string if it has none.
    fn env(&self) -> Cow<'_, str>;

    /// Records a numeric tag on the span.
    fn set_metric(&mut self, key: &'static str, value: f64);

    /// Records a string tag on the span.
    fn set_tag(&mut self, key: &'static str, value: Cow<'static, str>);
}
