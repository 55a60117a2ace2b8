// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session coordinator
//!
//! Drives one redirect session: lock, hosts entry, certificates, responder,
//! viewer, then a single cleanup. Only this type mutates the hosts file or
//! the lock; the responder task and the signal listener report to it.

use crate::certs::{CertPaths, CertificateCache};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::port;
use crate::signals::Termination;
use reflex_adapters::{
    LaunchAdapter, ProvisionAdapter, RedirectMethod, ResponderAdapter, ResponderConfig,
    ResponderError,
};
use reflex_core::{HostsError, HostsFile, LockError, LockManager, SessionLock};
use std::future::pending;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Locking,
    Provisioning,
    Serving,
    Completing,
    Interrupting,
    Cleaned,
}

/// How a session that reached serving came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The responder stopped on its own without error
    Completed,
    /// The configured duration elapsed
    TimedOut,
    /// A termination signal arrived; the caller should exit the process
    Interrupted(Termination),
}

/// Adapter dependencies for a session
pub struct SessionDeps<P, R, L> {
    pub provisioner: P,
    pub responder: R,
    pub launcher: L,
}

#[derive(Debug, Default)]
struct SessionState {
    lock: Option<SessionLock>,
    /// This session created the hosts entry (vs. it pre-existing)
    added_host: bool,
    /// The cert directory may hold files written for this session
    certs_requested: bool,
    port: Option<u16>,
    serving: Option<AbortHandle>,
    cleaned: bool,
}

pub struct SessionCoordinator<P, R, L>
where
    P: ProvisionAdapter,
    R: ResponderAdapter,
    L: LaunchAdapter,
{
    config: SessionConfig,
    hosts: HostsFile,
    certs: CertificateCache<P>,
    responder: R,
    launcher: L,
    port_probe: fn(u16) -> Option<u16>,
    phase: SessionPhase,
    history: Vec<SessionPhase>,
    state: SessionState,
}

impl<P, R, L> SessionCoordinator<P, R, L>
where
    P: ProvisionAdapter,
    R: ResponderAdapter,
    L: LaunchAdapter,
{
    pub fn new(config: SessionConfig, deps: SessionDeps<P, R, L>) -> Self {
        let hosts = HostsFile::new(&config.hosts_path).with_backups(config.backups);
        Self {
            config,
            hosts,
            certs: CertificateCache::new(deps.provisioner),
            responder: deps.responder,
            launcher: deps.launcher,
            port_probe: port::bindable,
            phase: SessionPhase::Idle,
            history: vec![SessionPhase::Idle],
            state: SessionState::default(),
        }
    }

    /// Replace how candidate ports are tested
    pub fn with_port_probe(mut self, probe: fn(u16) -> Option<u16>) -> Self {
        self.port_probe = probe;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Every phase entered so far, in order
    pub fn history(&self) -> &[SessionPhase] {
        &self.history
    }

    /// Port the responder was started on, once resolved
    pub fn port(&self) -> Option<u16> {
        self.state.port
    }

    /// Run the session to completion.
    ///
    /// Cleanup has always run by the time this returns, on success and
    /// on every error after the lock was taken. A coordinator may be run
    /// again; leftovers of an abandoned earlier run are cleaned first.
    pub async fn run(
        &mut self,
        shutdown: oneshot::Receiver<Termination>,
    ) -> Result<Outcome, SessionError> {
        self.cleanup();
        if self.phase != SessionPhase::Idle {
            self.transition(SessionPhase::Idle);
        }
        self.state = SessionState::default();
        self.responder.rearm();

        self.transition(SessionPhase::Locking);
        match self.acquire_lock() {
            Ok(lock) => self.state.lock = Some(lock),
            Err(e) => {
                // Nothing was mutated yet
                self.transition(SessionPhase::Idle);
                return Err(e);
            }
        }

        self.transition(SessionPhase::Provisioning);
        let result = match self.prepare().await {
            Ok((certs, port)) => {
                self.transition(SessionPhase::Serving);
                self.serve(certs, port, shutdown).await
            }
            Err(e) => Err(e),
        };

        self.cleanup();
        self.transition(SessionPhase::Idle);
        result
    }

    /// Undo everything this session changed. Safe to call any number of
    /// times; each step is attempted even if an earlier one fails.
    pub fn cleanup(&mut self) {
        if self.state.cleaned || self.state.lock.is_none() {
            return;
        }
        self.state.cleaned = true;
        self.responder.stop();
        if let Some(serving) = self.state.serving.take() {
            serving.abort();
        }

        if self.state.added_host {
            match self.hosts.remove(&self.config.host) {
                Ok(removed) => {
                    self.state.added_host = false;
                    info!(host = %self.config.host, removed, "hosts entry removed");
                }
                Err(e) => warn!(host = %self.config.host, error = %e, "failed to remove hosts entry"),
            }
        }

        if self.state.certs_requested && !self.config.keep_certs {
            let dir = &self.config.cert_dir;
            match std::fs::remove_dir_all(dir) {
                Ok(()) => debug!(dir = %dir.display(), "certificates removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(dir = %dir.display(), error = %e, "failed to remove certificates"),
            }
        }

        if let Some(lock) = self.state.lock.as_mut() {
            if let Err(e) = lock.release() {
                warn!(error = %e, "failed to release lock");
            }
        }

        self.transition(SessionPhase::Cleaned);
    }

    fn transition(&mut self, next: SessionPhase) {
        debug!(from = ?self.phase, to = ?next, "session phase");
        self.phase = next;
        self.history.push(next);
    }

    fn acquire_lock(&self) -> Result<SessionLock, SessionError> {
        let locks = LockManager::new(&self.config.lock_path);
        if self.config.force_unlock {
            match locks.force_unlock() {
                Ok(()) => {}
                Err(LockError::NotFound { .. }) => debug!("no lock to remove"),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(locks.acquire()?)
    }

    async fn prepare(&mut self) -> Result<(CertPaths, u16), SessionError> {
        if self.config.manage_hosts {
            match self.hosts.add(&self.config.address, &self.config.host) {
                Ok(()) => {
                    self.state.added_host = true;
                    info!(host = %self.config.host, address = %self.config.address, "hosts entry added");
                }
                Err(HostsError::AlreadyPresent) => info!(host = %self.config.host, "hosts entry already present"),
                Err(e) => return Err(e.into()),
            }
        } else {
            info!("hosts file management disabled; not touching hosts file");
        }

        self.state.certs_requested = true;
        let certs = self
            .certs
            .ensure(
                &self.config.host,
                &self.config.cert_dir,
                self.config.ca_root.as_deref(),
            )
            .await?;

        let port = port::select_port(self.config.port, self.config.fallback_port, self.port_probe)?;
        self.state.port = Some(port);
        Ok((certs, port))
    }

    async fn serve(
        &mut self,
        certs: CertPaths,
        port: u16,
        mut shutdown: oneshot::Receiver<Termination>,
    ) -> Result<Outcome, SessionError> {
        let config = ResponderConfig {
            target: self.config.target.clone(),
            delay: self.config.delay,
            method: self.config.method,
            referrer_policy: self.config.referrer_policy.clone(),
            port,
            cert_path: certs.cert,
            key_path: certs.key,
            verbose: self.config.verbose,
        };
        let responder = self.responder.clone();
        let mut serving = tokio::spawn(async move { responder.serve(config).await });
        self.state.serving = Some(serving.abort_handle());

        let url = self.config.viewer_url(port);
        info!(url = %url, "serving spoofed referrer");
        if self.config.method == RedirectMethod::Found {
            info!("heads-up: 302 redirects from an external open may yield an empty document.referrer in some browsers; use --method meta or --method js for consistent results");
        }
        self.open_viewer(&url).await;

        let duration = self.config.duration;
        let timeout = async move {
            match duration {
                Some(d) => {
                    info!(after = ?d, "auto-shutdown scheduled");
                    tokio::time::sleep(d).await
                }
                None => pending().await,
            }
        };
        tokio::pin!(timeout);

        let outcome = tokio::select! {
            joined = &mut serving => {
                self.transition(SessionPhase::Completing);
                match joined {
                    Ok(Ok(())) => Ok(Outcome::Completed),
                    Ok(Err(e)) => Err(SessionError::Listener(e)),
                    Err(e) => Err(SessionError::Listener(ResponderError::Listener(e.to_string()))),
                }
            }
            _ = &mut timeout => {
                self.transition(SessionPhase::Completing);
                info!("duration elapsed, shutting down");
                Ok(Outcome::TimedOut)
            }
            Ok(termination) = &mut shutdown => {
                self.transition(SessionPhase::Interrupting);
                info!(signal = %termination, "termination requested, cleaning up");
                Ok(Outcome::Interrupted(termination))
            }
        };

        self.responder.stop();
        if !serving.is_finished() {
            serving.abort();
        }
        outcome
    }

    async fn open_viewer(&self, url: &str) {
        if !self.config.open_browser {
            info!("open this URL in your browser: {} (private mode recommended)", url);
            return;
        }
        if let Err(e) = self.launcher.open(url, self.config.private).await {
            warn!(error = %e, "failed to open browser");
            info!("please open this URL manually: {} (private mode recommended)", url);
        }
    }
}

impl<P, R, L> Drop for SessionCoordinator<P, R, L>
where
    P: ProvisionAdapter,
    R: ResponderAdapter,
    L: LaunchAdapter,
{
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
