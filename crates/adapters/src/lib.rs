// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the external tools and services a session drives

pub mod launch;
pub mod provision;
pub mod responder;
pub mod traced;

pub use launch::{BrowserLauncher, LaunchAdapter, LaunchError};
pub use provision::{MkcertAdapter, ProvisionAdapter, ProvisionError, ProvisionRequest};
pub use responder::{
    HttpsResponder, RedirectMethod, ResponderAdapter, ResponderConfig, ResponderError,
};
pub use traced::{TracedLaunchAdapter, TracedProvisionAdapter, TracedResponderAdapter};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use launch::{FakeLaunchAdapter, LaunchCall};
#[cfg(any(test, feature = "test-support"))]
pub use provision::{FakeProvisionAdapter, ProvisionCall};
#[cfg(any(test, feature = "test-support"))]
pub use responder::{FakeResponderAdapter, FakeServe, ResponderCall};
