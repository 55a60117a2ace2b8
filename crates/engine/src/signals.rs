// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Termination signal listener
//!
//! The listener only reports. Cleanup stays with the session's own
//! control loop, which receives the notification over a oneshot channel.

use std::fmt;
use tokio::sync::oneshot;

/// Which termination request arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Interrupt,
    Terminate,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Interrupt => write!(f, "interrupt"),
            Termination::Terminate => write!(f, "terminate"),
        }
    }
}

/// Install handlers and spawn a task that delivers the first termination
/// signal. Must be called from within a tokio runtime.
///
/// Handlers are registered before this returns, so a signal sent right
/// after is not lost.
pub fn listen() -> std::io::Result<oneshot::Receiver<Termination>> {
    let (tx, rx) = oneshot::channel();
    let waiter = install()?;
    tokio::spawn(async move {
        let termination = waiter.await;
        tracing::debug!(signal = %termination, "termination signal received");
        let _ = tx.send(termination);
    });
    Ok(rx)
}

#[cfg(unix)]
fn install() -> std::io::Result<impl std::future::Future<Output = Termination>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => Termination::Interrupt,
            _ = terminate.recv() => Termination::Terminate,
        }
    })
}

#[cfg(not(unix))]
fn install() -> std::io::Result<impl std::future::Future<Output = Termination>> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        Termination::Interrupt
    })
}

#[cfg(test)]
#[path = "signals_tests.rs"]
mod tests;
