// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake provisioning adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ProvisionAdapter, ProvisionError, ProvisionRequest};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Recorded provisioning call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionCall {
    IsAvailable,
    Provision(ProvisionRequest),
}

#[derive(Default)]
struct FakeProvisionState {
    calls: Vec<ProvisionCall>,
    unavailable: bool,
    failure: Option<String>,
}

/// Fake provisioning adapter that writes placeholder PEM files
#[derive(Clone, Default)]
pub struct FakeProvisionAdapter {
    inner: Arc<Mutex<FakeProvisionState>>,
}

impl FakeProvisionAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the tool as missing
    pub fn set_unavailable(&self) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).unavailable = true;
    }

    /// Fail every provisioning call with the given message
    pub fn set_failure(&self, message: impl Into<String>) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).failure = Some(message.into());
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ProvisionCall> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }

    /// Number of provision requests received
    pub fn provision_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ProvisionCall::Provision(_)))
            .count()
    }
}

#[async_trait]
impl ProvisionAdapter for FakeProvisionAdapter {
    async fn is_available(&self) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.calls.push(ProvisionCall::IsAvailable);
        !inner.unavailable
    }

    async fn provision(&self, request: &ProvisionRequest) -> Result<(), ProvisionError> {
        let failure = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.calls.push(ProvisionCall::Provision(request.clone()));
            inner.failure.clone()
        };

        if let Some(stderr) = failure {
            return Err(ProvisionError::Failed {
                program: "fake-mkcert".to_string(),
                status: "exit status: 1".to_string(),
                stderr,
            });
        }

        let write = |path: &std::path::Path, label: &str| {
            std::fs::write(path, format!("-----FAKE {}-----\n", label)).map_err(|source| {
                ProvisionError::Spawn {
                    program: "fake-mkcert".to_string(),
                    source,
                }
            })
        };
        write(&request.cert_path, "CERTIFICATE")?;
        write(&request.key_path, "PRIVATE KEY")?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
