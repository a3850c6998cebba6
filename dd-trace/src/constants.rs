// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Environment the span was produced in
pub const ENV_TAG_KEY: &str = "env";

/// Final keep/reject decision of the trace
pub const SAMPLING_PRIORITY_TAG_KEY: &str = "_sampling_priority_v1";
/// Which mechanism took the sampling decision
pub const SAMPLING_DECISION_MAKER_TAG_KEY: &str = "_dd.p.dm";
/// Rate applied by the agent provided, per service sampler
pub const SAMPLING_AGENT_RATE_TAG_KEY: &str = "_dd.agent_psr";
/// Rate applied by a sampling rule, or by the global sample rate
pub const SAMPLING_RULE_RATE_TAG_KEY: &str = "_dd.rule_psr";
/// Smoothed fraction of rule sampled spans let through by the rate limiter
pub const RL_EFFECTIVE_RATE: &str = "_dd.limit_psr";
