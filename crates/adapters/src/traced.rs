// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::launch::{LaunchAdapter, LaunchError};
use crate::provision::{ProvisionAdapter, ProvisionError, ProvisionRequest};
use crate::responder::{ResponderAdapter, ResponderConfig, ResponderError};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any ProvisionAdapter
#[derive(Clone)]
pub struct TracedProvisionAdapter<P> {
    inner: P,
}

impl<P> TracedProvisionAdapter<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: ProvisionAdapter> ProvisionAdapter for TracedProvisionAdapter<P> {
    async fn is_available(&self) -> bool {
        let available = self.inner.is_available().await;
        tracing::debug!(available, "provisioning tool probed");
        available
    }

    async fn provision(&self, request: &ProvisionRequest) -> Result<(), ProvisionError> {
        let span = tracing::info_span!("provision", domain = %request.domain);
        async {
            tracing::info!(
                cert = %request.cert_path.display(),
                ca_root = ?request.ca_root,
                "generating certificate"
            );

            // Precondition: the output directory must exist
            if let Some(parent) = request.cert_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    tracing::error!(dir = %parent.display(), "certificate directory does not exist");
                    return Err(ProvisionError::Spawn {
                        program: "provision".to_string(),
                        source: std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            format!("certificate directory does not exist: {}", parent.display()),
                        ),
                    });
                }
            }

            let start = std::time::Instant::now();
            let result = self.inner.provision(request).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "certificate generated"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "provisioning failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any ResponderAdapter
#[derive(Clone)]
pub struct TracedResponderAdapter<R> {
    inner: R,
}

impl<R> TracedResponderAdapter<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: ResponderAdapter> ResponderAdapter for TracedResponderAdapter<R> {
    async fn serve(&self, config: ResponderConfig) -> Result<(), ResponderError> {
        let span = tracing::info_span!("responder.serve", port = config.port);
        async {
            tracing::info!(
                target_url = %config.target,
                method = %config.method,
                delay_ms = config.delay.as_millis() as u64,
                "starting"
            );

            let start = std::time::Instant::now();
            let result = self.inner.serve(config).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "stopped"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "serve failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    fn stop(&self) {
        tracing::debug!("stop requested");
        self.inner.stop();
    }

    fn rearm(&self) {
        self.inner.rearm();
    }
}

/// Wrapper that adds tracing to any LaunchAdapter
#[derive(Clone)]
pub struct TracedLaunchAdapter<L> {
    inner: L,
}

impl<L> TracedLaunchAdapter<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<L: LaunchAdapter> LaunchAdapter for TracedLaunchAdapter<L> {
    async fn open(&self, url: &str, private: bool) -> Result<(), LaunchError> {
        let span = tracing::info_span!("launch.open", url, private);
        async {
            let result = self.inner.open(url, private).await;
            // Failing to open a browser is recoverable: the URL is printed anyway
            match &result {
                Ok(()) => tracing::info!("viewer started"),
                Err(e) => tracing::warn!(error = %e, "viewer launch failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
