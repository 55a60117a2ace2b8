// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for a redirect session

use crate::certs::CertError;
use reflex_adapters::{ProvisionError, ResponderError};
use reflex_core::{HostsError, LockError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("update hosts: {0}")]
    Hosts(#[from] HostsError),
    #[error("generate certificates: {0}")]
    Provisioning(#[from] ProvisionError),
    #[error("server error: {0}")]
    Listener(#[from] ResponderError),
    #[error("port {preferred} unavailable and no usable fallback{}", fallback.map(|p| format!(" ({} also unavailable)", p)).unwrap_or_default())]
    PortUnavailable { preferred: u16, fallback: Option<u16> },
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<CertError> for SessionError {
    fn from(err: CertError) -> Self {
        match err {
            CertError::Provisioning(e) => SessionError::Provisioning(e),
            CertError::Io { path, source } => SessionError::Io { path, source },
        }
    }
}
