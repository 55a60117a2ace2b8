// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Referrer hostname extraction

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum HostnameError {
    #[error("empty referrer")]
    Empty,

    #[error("invalid referrer '{input}': {reason}")]
    Invalid { input: String, reason: String },
}

/// Extract the bare hostname from a URL or `host[:port]` string.
///
/// Scheme, userinfo, port, path, query and fragment are stripped.
pub fn extract_hostname(input: &str) -> Result<String, HostnameError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(HostnameError::Empty);
    }

    let candidate = if input.contains("://") {
        input.to_string()
    } else {
        format!("http://{}", input)
    };
    let url = Url::parse(&candidate).map_err(|e| HostnameError::Invalid {
        input: input.to_string(),
        reason: e.to_string(),
    })?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string()),
        _ => Err(HostnameError::Invalid {
            input: input.to_string(),
            reason: "no host".to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "hostname_tests.rs"]
mod tests;
