// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Certificate provisioning adapters

mod mkcert;

pub use mkcert::{MkcertAdapter, MKCERT_ENV};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProvisionAdapter, ProvisionCall};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from provisioning operations
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// A request to issue a certificate for one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub domain: String,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    /// Restricts issuance to this certificate authority root
    pub ca_root: Option<PathBuf>,
}

/// Adapter for issuing locally trusted certificates
#[async_trait]
pub trait ProvisionAdapter: Clone + Send + Sync + 'static {
    /// Whether the provisioning tool can be run at all
    async fn is_available(&self) -> bool;

    /// Write a key and certificate for the request's domain.
    ///
    /// All-or-nothing from the caller's view: any failure is an error and
    /// partially written files are left for the caller to clean up.
    async fn provision(&self, request: &ProvisionRequest) -> Result<(), ProvisionError>;
}
