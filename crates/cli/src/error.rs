// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! Each error says what went wrong, why it might have happened, and how
//! to fix it.

use std::fmt;
use std::path::Path;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Common error builders for precondition failures.
impl CliError {
    /// Another session holds the lock
    pub fn lock_held(path: &Path) -> Self {
        CliError::new("another reflex instance appears to be running")
            .with_context(format!("Lock file present at {}", path.display()))
            .with_suggestion("Wait for the other session to finish")
            .with_suggestion("Inspect state: reflex status --referrer <host>")
            .with_suggestion("If no session is running: reflex run --force-unlock ...")
    }

    /// The system hosts file needs root
    pub fn needs_root(command: &str) -> Self {
        CliError::new(format!("`reflex {}` modifies the system hosts file", command))
            .with_context("Elevated privileges are required to write it")
            .with_suggestion(format!("Re-run with sudo: sudo reflex {} ...", command))
            .with_suggestion("Or point at another file with --hosts-file (testing)")
    }

    /// mkcert cannot be run
    pub fn mkcert_missing(program: &Path) -> Self {
        let err = CliError::new(
            "mkcert is required to create a locally trusted certificate for HTTPS referrer emulation",
        )
        .with_context(format!("`{} --version` could not be run", program.display()))
        .with_suggestion("Install mkcert from https://github.com/FiloSottile/mkcert");
        match mkcert_install_hint() {
            Some(hint) => err.with_suggestion(hint),
            None => err,
        }
    }

    /// The certificate authority root shared between root and the user is missing
    pub fn ca_root_missing(root: &Path) -> Self {
        CliError::new(format!("missing certificate authority root at {}", root.display()))
            .with_context("root and the invoking user must share one mkcert CA")
            .with_suggestion("Run the one-time setup: sudo mkcert -install && mkcert -install")
            .with_suggestion(format!(
                "Copy the user CA: sudo mkdir -p {0} && sudo cp -a \"$(mkcert -CAROOT)/.\" {0}/",
                root.display()
            ))
            .with_suggestion(format!(
                "Fix permissions: sudo chmod 755 {0} && sudo chmod 644 {0}/*",
                root.display()
            ))
            .with_suggestion("Then re-run this command with sudo, or pass --ca-root")
    }
}

fn mkcert_install_hint() -> Option<&'static str> {
    if cfg!(target_os = "macos") {
        Some("macOS: brew install mkcert nss && sudo mkcert -install")
    } else if cfg!(target_os = "linux") {
        Some("Linux: Debian/Ubuntu: sudo apt-get install mkcert libnss3-tools; Fedora: sudo dnf install mkcert nss-tools; Arch: sudo pacman -S mkcert nss")
    } else if cfg!(windows) {
        Some("Windows: choco install mkcert, then run mkcert -install in an elevated shell")
    } else {
        None
    }
}
