// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mkcert-backed certificate provisioning

use super::{ProvisionAdapter, ProvisionError, ProvisionRequest};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Overrides the mkcert executable
pub const MKCERT_ENV: &str = "REFLEX_MKCERT";

/// Provisioning adapter that shells out to mkcert
#[derive(Debug, Clone)]
pub struct MkcertAdapter {
    program: PathBuf,
}

impl Default for MkcertAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MkcertAdapter {
    /// Uses `mkcert` from PATH unless REFLEX_MKCERT names another binary
    pub fn new() -> Self {
        let program = match std::env::var_os(MKCERT_ENV) {
            Some(program) if !program.is_empty() => PathBuf::from(program),
            _ => PathBuf::from("mkcert"),
        };
        Self { program }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    fn command(&self, request: &ProvisionRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-key-file")
            .arg(&request.key_path)
            .arg("-cert-file")
            .arg(&request.cert_path)
            .arg(&request.domain)
            .stdin(Stdio::null());
        // Pin the CA root so root and the invoking user share one CA
        if let Some(root) = &request.ca_root {
            cmd.env("CAROOT", root);
        }
        cmd
    }
}

#[async_trait]
impl ProvisionAdapter for MkcertAdapter {
    async fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    async fn provision(&self, request: &ProvisionRequest) -> Result<(), ProvisionError> {
        let program = self.program.display().to_string();
        let output = self
            .command(request)
            .output()
            .await
            .map_err(|source| ProvisionError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProvisionError::Failed {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!(output = %stderr.trim(), "mkcert output");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mkcert_tests.rs"]
mod tests;
