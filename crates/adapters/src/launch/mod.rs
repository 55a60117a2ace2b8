// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Browser launch adapters

mod browser;
mod user;

pub use browser::{plan_linux, plan_macos, plan_windows, BrowserLauncher};
pub use user::{
    invoking_user, platform_adjuster, DarwinSudoAdjuster, InvokingUser, LinuxSudoAdjuster,
    NoopAdjuster, ProcessSpec, UserAdjuster,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeLaunchAdapter, LaunchCall};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from launch operations
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("unsupported platform for auto-open")]
    Unsupported,
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Adapter for opening a URL in a viewer
#[async_trait]
pub trait LaunchAdapter: Clone + Send + Sync + 'static {
    /// Start a viewer for `url` without waiting for it to exit
    async fn open(&self, url: &str, private: bool) -> Result<(), LaunchError>;
}
