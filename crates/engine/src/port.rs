// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listening port selection

use crate::error::SessionError;
use std::net::TcpListener;

/// Probe a port by binding it briefly. Returns the bound port, which for
/// port 0 is the one the OS picked.
pub fn bindable(port: u16) -> Option<u16> {
    let listener = TcpListener::bind(("0.0.0.0", port)).ok()?;
    listener.local_addr().ok().map(|addr| addr.port())
}

/// Choose `preferred`, else `fallback`, using `probe` to test each
pub fn select_port(
    preferred: u16,
    fallback: Option<u16>,
    probe: impl Fn(u16) -> Option<u16>,
) -> Result<u16, SessionError> {
    if let Some(port) = probe(preferred) {
        return Ok(port);
    }
    let unavailable = SessionError::PortUnavailable {
        preferred,
        fallback,
    };
    let Some(fallback) = fallback else {
        return Err(unavailable);
    };
    tracing::warn!(port = preferred, fallback, "port unavailable, falling back");
    probe(fallback).ok_or(unavailable)
}

#[cfg(test)]
#[path = "port_tests.rs"]
mod tests;
