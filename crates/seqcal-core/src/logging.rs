//! Debug output for the engines.
//!
//! The core never installs a logger itself; callers hand one in. The
//! default forwards to the `log` facade, so whatever backend the binary
//! initialized receives the messages.

use std::sync::{Arc, Mutex};

pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);
}

/// Forwards to `log::debug!` under the `seqcal` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl Logger for LogFacade {
    fn debug(&self, message: &str) {
        log::debug!(target: "seqcal", "{}", message);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Logger for Silent {
    fn debug(&self, _message: &str) {}
}

/// Keeps messages in memory; handy for asserting on diagnostics.
#[derive(Debug, Default)]
pub struct Recorder {
    messages: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl Logger for Recorder {
    fn debug(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

pub fn default_logger() -> Arc<dyn Logger> {
    Arc::new(LogFacade)
}
