// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redirect responder adapters

mod https;
mod page;

pub use https::HttpsResponder;
pub use page::{PageResponse, RedirectPage};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeResponderAdapter, FakeServe, ResponderCall};

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors from the responder
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("TLS setup failed: {0}")]
    Tls(String),
    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("listener failed: {0}")]
    Listener(String),
}

/// How the responder sends the browser on to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectMethod {
    /// HTTP 302 with a Location header
    Found,
    /// HTML meta refresh after the configured delay
    #[default]
    MetaRefresh,
    /// Script assignment of window.location after the configured delay
    Script,
}

impl RedirectMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectMethod::Found => "302",
            RedirectMethod::MetaRefresh => "meta",
            RedirectMethod::Script => "js",
        }
    }
}

impl fmt::Display for RedirectMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedirectMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "302" => Ok(RedirectMethod::Found),
            "meta" => Ok(RedirectMethod::MetaRefresh),
            "js" => Ok(RedirectMethod::Script),
            other => Err(format!("invalid redirect method: {} (expected meta, 302 or js)", other)),
        }
    }
}

/// Everything the responder needs to serve one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponderConfig {
    pub target: String,
    pub delay: Duration,
    pub method: RedirectMethod,
    /// Referrer-Policy header value; empty omits the header
    pub referrer_policy: String,
    pub port: u16,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    /// Log every request
    pub verbose: bool,
}

/// Adapter for the HTTPS redirect server
#[async_trait]
pub trait ResponderAdapter: Clone + Send + Sync + 'static {
    /// Serve until stopped or the listener fails
    async fn serve(&self, config: ResponderConfig) -> Result<(), ResponderError>;

    /// Ask a running `serve` to return. Safe to call at any time,
    /// including before `serve` or after it already failed.
    fn stop(&self);

    /// Clear an earlier `stop` so the next `serve` runs
    fn rearm(&self);
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
