// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-domain certificate cache
//!
//! A directory holding both `cert.pem` and `key.pem` is a cache hit. No
//! expiry or fingerprint check is made.

use reflex_adapters::{ProvisionAdapter, ProvisionError, ProvisionRequest};
use reflex_core::paths::{CERT_FILE_NAME, KEY_FILE_NAME};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CertError {
    #[error(transparent)]
    Provisioning(#[from] ProvisionError),
    #[error("certificate directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Certificate and key locations for one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl CertPaths {
    /// Expected file locations inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            cert: dir.join(CERT_FILE_NAME),
            key: dir.join(KEY_FILE_NAME),
        }
    }

    /// Whether both files are present
    pub fn exist(&self) -> bool {
        self.cert.is_file() && self.key.is_file()
    }
}

/// Provisions certificates on demand, skipping domains already on disk
#[derive(Clone)]
pub struct CertificateCache<P> {
    provisioner: P,
}

impl<P: ProvisionAdapter> CertificateCache<P> {
    pub fn new(provisioner: P) -> Self {
        Self { provisioner }
    }

    /// Whether the provisioning tool can be run at all
    pub async fn is_available(&self) -> bool {
        self.provisioner.is_available().await
    }

    /// Return certificate paths for `domain` under `dir`, provisioning only
    /// when either file is missing.
    ///
    /// Partial output from a failed provisioning run is left in place.
    pub async fn ensure(
        &self,
        domain: &str,
        dir: &Path,
        ca_root: Option<&Path>,
    ) -> Result<CertPaths, CertError> {
        let paths = CertPaths::in_dir(dir);
        if paths.exist() {
            tracing::debug!(domain, dir = %dir.display(), "certificate cache hit");
            return Ok(paths);
        }

        std::fs::create_dir_all(dir).map_err(|source| CertError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let request = ProvisionRequest {
            domain: domain.to_string(),
            cert_path: paths.cert.clone(),
            key_path: paths.key.clone(),
            ca_root: ca_root.map(Path::to_path_buf),
        };
        self.provisioner.provision(&request).await?;
        Ok(paths)
    }
}

#[cfg(test)]
#[path = "certs_tests.rs"]
mod tests;
