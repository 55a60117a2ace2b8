// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake launch adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{LaunchAdapter, LaunchError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Recorded launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCall {
    pub url: String,
    pub private: bool,
}

/// Fake launch adapter for testing
#[derive(Clone, Default)]
pub struct FakeLaunchAdapter {
    calls: Arc<Mutex<Vec<LaunchCall>>>,
    fail: Arc<AtomicBool>,
}

impl FakeLaunchAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every launch fail
    pub fn set_failing(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Get all recorded launches
    pub fn calls(&self) -> Vec<LaunchCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl LaunchAdapter for FakeLaunchAdapter {
    async fn open(&self, url: &str, private: bool) -> Result<(), LaunchError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(LaunchCall {
                url: url.to_string(),
                private,
            });

        if self.fail.load(Ordering::SeqCst) {
            return Err(LaunchError::Spawn {
                program: "fake-browser".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no browser"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
