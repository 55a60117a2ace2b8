// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `reflex run` - Serve a spoofed referrer until stopped

use crate::error::CliError;
use crate::privilege::require_root;
use anyhow::{Context, Result};
use clap::Args;
use reflex_adapters::{
    BrowserLauncher, HttpsResponder, MkcertAdapter, RedirectMethod, TracedLaunchAdapter,
    TracedProvisionAdapter, TracedResponderAdapter,
};
use reflex_core::paths::CA_ROOT_CERT_NAME;
use reflex_core::{extract_hostname, BackupPolicy, LockError};
use reflex_engine::{
    signals, CertificateCache, Outcome, SessionConfig, SessionCoordinator, SessionDeps,
    SessionError, DEFAULT_ADDRESS, DEFAULT_FALLBACK_PORT, DEFAULT_PORT, DEFAULT_REFERRER_POLICY,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Referrer URL or hostname (e.g., https://news.google.com)
    #[arg(long)]
    pub referrer: String,

    /// Target URL to navigate to
    #[arg(long)]
    pub target: String,

    /// IP to map the referrer host to
    #[arg(long, default_value = DEFAULT_ADDRESS)]
    pub ip: String,

    /// TLS port to serve on (443 requires elevated privileges)
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Fallback port if the desired port is unavailable
    #[arg(long, default_value_t = DEFAULT_FALLBACK_PORT)]
    pub fallback_port: u16,

    /// Redirect method: meta, 302 or js
    #[arg(long, default_value = "meta")]
    pub method: RedirectMethod,

    /// Referrer-Policy header and meta value (e.g., no-referrer, origin, unsafe-url)
    #[arg(long, default_value = DEFAULT_REFERRER_POLICY)]
    pub referrer_policy: String,

    /// Delay in milliseconds for the meta and js methods
    #[arg(long, default_value_t = 1500)]
    pub delay: u64,

    /// Do not open the browser automatically
    #[arg(long)]
    pub no_browser: bool,

    /// Open the browser in a normal window instead of private mode
    #[arg(long)]
    pub no_private: bool,

    /// Keep generated certificates after exit
    #[arg(long)]
    pub keep_certs: bool,

    /// Do not modify the hosts file (advanced)
    #[arg(long)]
    pub no_hosts: bool,

    /// Override the hosts file path (testing)
    #[arg(long)]
    pub hosts_file: Option<PathBuf>,

    /// Directory to write certificates to (defaults to the temp dir)
    #[arg(long)]
    pub cert_dir: Option<PathBuf>,

    /// mkcert CA root to provision from (CAROOT)
    #[arg(long)]
    pub ca_root: Option<PathBuf>,

    /// Auto-shutdown after this long (e.g., 5m, 1h)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Forcefully remove an existing lock before starting
    #[arg(long)]
    pub force_unlock: bool,

    /// Keep only the newest N hosts file backups
    #[arg(long, value_name = "N", conflicts_with = "no_backup")]
    pub keep_backups: Option<usize>,

    /// Do not back up the hosts file before editing it
    #[arg(long)]
    pub no_backup: bool,
}

impl RunArgs {
    /// Whether this run writes the real system hosts file
    pub fn touches_system_hosts(&self) -> bool {
        !self.no_hosts && self.hosts_file.is_none()
    }

    pub fn backup_policy(&self) -> BackupPolicy {
        match (self.no_backup, self.keep_backups) {
            (true, _) => BackupPolicy::Disabled,
            (false, Some(n)) => BackupPolicy::KeepLatest(n),
            (false, None) => BackupPolicy::KeepAll,
        }
    }

    pub fn session_config(&self, verbose: bool) -> Result<SessionConfig> {
        let host = extract_hostname(&self.referrer).context("invalid --referrer")?;
        let mut config = SessionConfig::new(host, self.target.clone());

        config.address = self.ip.clone();
        config.port = self.port;
        config.fallback_port = (self.fallback_port != self.port).then_some(self.fallback_port);
        config.method = self.method;
        config.referrer_policy = self.referrer_policy.clone();
        config.delay = Duration::from_millis(self.delay);
        config.open_browser = !self.no_browser;
        config.private = !self.no_private;
        config.keep_certs = self.keep_certs;
        config.manage_hosts = !self.no_hosts;
        if let Some(path) = &self.hosts_file {
            config.hosts_path = path.clone();
        }
        config.backups = self.backup_policy();
        if let Some(dir) = &self.cert_dir {
            config.cert_dir = dir.clone();
        }
        if let Some(root) = &self.ca_root {
            config.ca_root = Some(root.clone());
        }
        config.duration = self.duration.filter(|d| !d.is_zero());
        config.force_unlock = self.force_unlock;
        config.verbose = verbose;
        Ok(config)
    }
}

pub async fn run(args: RunArgs, verbose: bool) -> Result<()> {
    if args.touches_system_hosts() {
        require_root("run")?;
    }
    let config = args.session_config(verbose)?;

    // One-time CA installation is left to the operator
    let mkcert = MkcertAdapter::new();
    let provisioner = TracedProvisionAdapter::new(mkcert.clone());
    if !CertificateCache::new(provisioner.clone()).is_available().await {
        return Err(CliError::mkcert_missing(mkcert.program()).into());
    }
    if let Some(root) = &config.ca_root {
        if !root.join(CA_ROOT_CERT_NAME).is_file() {
            return Err(CliError::ca_root_missing(root).into());
        }
    }

    let shutdown = signals::listen().context("install signal handlers")?;
    let mut session = SessionCoordinator::new(
        config,
        SessionDeps {
            provisioner,
            responder: TracedResponderAdapter::new(HttpsResponder::new()),
            launcher: TracedLaunchAdapter::new(BrowserLauncher::new()),
        },
    );

    match session.run(shutdown).await {
        Ok(Outcome::Interrupted(signal)) => {
            tracing::info!(signal = %signal, "cleanup complete, exiting");
            Ok(())
        }
        Ok(outcome) => {
            tracing::debug!(?outcome, "session finished");
            Ok(())
        }
        Err(e) => Err(report(e)),
    }
}

/// Attach recovery hints to session failures an operator can act on
fn report(err: SessionError) -> anyhow::Error {
    match err {
        SessionError::Lock(LockError::AlreadyLocked { path }) => CliError::lock_held(&path)
            .with_source(LockError::AlreadyLocked { path })
            .into(),
        other => other.into(),
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
