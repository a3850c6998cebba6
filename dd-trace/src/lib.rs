// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Core components shared by the tracer crates
//!
//! This crate holds the pieces every component needs but none owns:
//! - layered configuration ([`Config`])
//! - the `dd_*!` logging macros
//! - the [`Error`] type
//! - span tag keys and sampling priority / mechanism values

pub mod configuration;
pub mod constants;
pub mod sampling;
pub use configuration::Config;

mod error;
pub use error::{Error, Result};

pub mod log;
