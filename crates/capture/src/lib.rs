// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Invocation capture and recording for harness runs.
//!
//! Every external command the harness launches (control scripts, the oracle
//! scanner, `diff`) is recorded here so a failed run can be inspected after
//! the package has been torn down.

mod duration_serde;
mod invocation;
mod log;

pub use invocation::{CapturedCommand, CapturedInvocation, CapturedOutcome};
pub use log::InvocationLog;
