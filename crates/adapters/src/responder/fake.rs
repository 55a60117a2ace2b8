// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake responder adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ResponderAdapter, ResponderConfig, ResponderError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// How the fake behaves once `serve` is called
#[derive(Debug, Clone, Default)]
pub enum FakeServe {
    /// Block until `stop` is called
    #[default]
    UntilStopped,
    /// Return the given listener error immediately
    Fail(String),
    /// Return success immediately
    Finish,
}

/// Recorded responder call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponderCall {
    Serve(ResponderConfig),
    Stop,
}

/// Fake responder adapter for testing
#[derive(Clone)]
pub struct FakeResponderAdapter {
    behavior: Arc<Mutex<FakeServe>>,
    calls: Arc<Mutex<Vec<ResponderCall>>>,
    stopped: Arc<watch::Sender<bool>>,
}

impl Default for FakeResponderAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeResponderAdapter {
    pub fn new() -> Self {
        let (stopped, _) = watch::channel(false);
        Self {
            behavior: Arc::new(Mutex::new(FakeServe::default())),
            calls: Arc::new(Mutex::new(Vec::new())),
            stopped: Arc::new(stopped),
        }
    }

    pub fn with_behavior(behavior: FakeServe) -> Self {
        let fake = Self::new();
        *fake.behavior.lock().unwrap_or_else(|e| e.into_inner()) = behavior;
        fake
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ResponderCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The config of the most recent `serve` call
    pub fn served_config(&self) -> Option<ResponderConfig> {
        self.calls().into_iter().rev().find_map(|call| match call {
            ResponderCall::Serve(config) => Some(config),
            ResponderCall::Stop => None,
        })
    }
}

#[async_trait]
impl ResponderAdapter for FakeResponderAdapter {
    async fn serve(&self, config: ResponderConfig) -> Result<(), ResponderError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ResponderCall::Serve(config));

        let behavior = self
            .behavior
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match behavior {
            FakeServe::Fail(message) => Err(ResponderError::Listener(message)),
            FakeServe::Finish => Ok(()),
            FakeServe::UntilStopped => {
                let mut stopped = self.stopped.subscribe();
                // Sender lives in self, so wait_for only ends once stopped
                let _ = stopped.wait_for(|stopped| *stopped).await;
                Ok(())
            }
        }
    }

    fn stop(&self) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ResponderCall::Stop);
        self.stopped.send_replace(true);
    }

    fn rearm(&self) {
        self.stopped.send_replace(false);
    }
}
