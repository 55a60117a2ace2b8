// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redirect response rendering

use super::{RedirectMethod, ResponderConfig};
use std::time::Duration;

/// A rendered HTTP response, independent of the server stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    pub status: u16,
    /// Lowercase header names
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl PageResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The page served for every request of a session
#[derive(Debug, Clone)]
pub struct RedirectPage {
    method: RedirectMethod,
    target: String,
    delay: Duration,
    referrer_policy: String,
}

impl RedirectPage {
    pub fn new(
        method: RedirectMethod,
        target: impl Into<String>,
        delay: Duration,
        referrer_policy: impl Into<String>,
    ) -> Self {
        Self {
            method,
            target: target.into(),
            delay,
            referrer_policy: referrer_policy.into(),
        }
    }

    pub fn from_config(config: &ResponderConfig) -> Self {
        Self::new(
            config.method,
            config.target.clone(),
            config.delay,
            config.referrer_policy.clone(),
        )
    }

    pub fn render(&self) -> PageResponse {
        let mut headers = Vec::new();
        if !self.referrer_policy.is_empty() {
            headers.push(("referrer-policy", self.referrer_policy.clone()));
        }

        match self.method {
            RedirectMethod::Found => {
                headers.push(("location", self.target.clone()));
                PageResponse {
                    status: 302,
                    headers,
                    body: String::new(),
                }
            }
            RedirectMethod::MetaRefresh => {
                headers.push(("content-type", HTML_CONTENT_TYPE.to_string()));
                let target = escape_html(&self.target);
                let body = format!(
                    "<!doctype html><html><head><title>Redirect</title>\
                     <meta name=\"referrer\" content=\"{policy}\">\
                     <meta http-equiv=\"refresh\" content=\"{secs:.1};url={target}\">\
                     </head><body>Redirecting to <a href=\"{target}\">target</a>…</body></html>",
                    policy = escape_html(&self.referrer_policy),
                    secs = self.delay.as_secs_f64(),
                    target = target,
                );
                PageResponse {
                    status: 200,
                    headers,
                    body,
                }
            }
            RedirectMethod::Script => {
                headers.push(("content-type", HTML_CONTENT_TYPE.to_string()));
                let body = format!(
                    "<!doctype html><html><head><title>Redirect</title>\
                     <meta name=\"referrer\" content=\"{policy}\"></head>\
                     <body>Redirecting to <a id=\"l\" href=\"{href}\">target</a>…\
                     <script>setTimeout(function(){{window.location={literal}}}, {ms})</script>\
                     </body></html>",
                    policy = escape_html(&self.referrer_policy),
                    href = escape_html(&self.target),
                    literal = script_string(&self.target),
                    ms = self.delay.as_millis(),
                );
                PageResponse {
                    status: 200,
                    headers,
                    body,
                }
            }
        }
    }
}

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// JSON string literal, safe to embed inside a script element
fn script_string(input: &str) -> String {
    serde_json::Value::String(input.to_string())
        .to_string()
        .replace("</", "<\\/")
}

#[cfg(test)]
#[path = "page_tests.rs"]
mod tests;
