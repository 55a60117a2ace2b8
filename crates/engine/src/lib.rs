// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! reflex session engine

mod certs;
mod config;
mod error;
pub mod port;
mod session;
pub mod signals;

pub use certs::{CertError, CertPaths, CertificateCache};
pub use config::{
    SessionConfig, DEFAULT_ADDRESS, DEFAULT_DELAY, DEFAULT_FALLBACK_PORT, DEFAULT_PORT,
    DEFAULT_REFERRER_POLICY,
};
pub use error::SessionError;
pub use session::{Outcome, SessionCoordinator, SessionDeps, SessionPhase};
pub use signals::Termination;
