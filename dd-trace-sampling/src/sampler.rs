// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::types::SpanLike;

/// A sampler only deciding whether to keep a span, without recording anything on it.
///
/// Implementations must be safe for concurrent use.
pub trait Sampler {
    /// Returns true if the given span should be kept
    fn sample<S: SpanLike + ?Sized>(&self, span: &S) -> bool;
}
