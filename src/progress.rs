// src/progress.rs

//! Progress reporting for plan execution
//!
//! The executor reports one increment per rename step through
//! [`ProgressTracker`]. Front ends pick how that is surfaced:
//! - `LogProgress`: step counts through tracing
//! - `CallbackProgress`: forwards [`ProgressEvent`]s to a closure (GUI hosts)
//! - `SilentProgress`: counts without output
//!
//! # Example
//!
//! ```ignore
//! use packset::progress::{LogProgress, ProgressTracker};
//!
//! let progress = LogProgress::new("hud_style", 0);
//! let report = packset::execute_plan(&plan, &mut container, &progress)?;
//! assert!(progress.is_finished());
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{info, warn};

/// Receives progress while a plan is applied
pub trait ProgressTracker: Send + Sync {
    /// Set the current status message
    fn set_message(&self, message: &str);

    /// Advance by `amount` steps
    fn increment(&self, amount: u64);

    /// Set the total number of steps
    fn set_length(&self, length: u64);

    /// Steps completed so far
    fn position(&self) -> u64;

    /// Total number of steps
    fn length(&self) -> u64;

    /// Mark as finished successfully
    fn finish_with_message(&self, message: &str);

    /// Mark as halted by an error
    fn finish_with_error(&self, message: &str);

    fn is_finished(&self) -> bool;
}

/// Counter shared by the trackers below
#[derive(Debug, Default)]
struct Counter {
    position: AtomicU64,
    length: AtomicU64,
    finished: AtomicBool,
}

impl Counter {
    fn with_length(length: u64) -> Self {
        Self {
            length: AtomicU64::new(length),
            ..Self::default()
        }
    }

    fn advance(&self, amount: u64) -> u64 {
        self.position.fetch_add(amount, Ordering::Relaxed) + amount
    }

    fn position(&self) -> u64 {
        self.position.load(Ordering::Relaxed)
    }

    fn length(&self) -> u64 {
        self.length.load(Ordering::Relaxed)
    }

    fn set_length(&self, length: u64) {
        self.length.store(length, Ordering::Relaxed);
    }

    fn finish(&self) {
        self.finished.store(true, Ordering::Relaxed);
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }
}

/// No-op tracker for quiet modes and tests
#[derive(Debug, Default)]
pub struct SilentProgress {
    counter: Counter,
}

impl SilentProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_length(length: u64) -> Self {
        Self {
            counter: Counter::with_length(length),
        }
    }
}

impl ProgressTracker for SilentProgress {
    fn set_message(&self, _message: &str) {}

    fn increment(&self, amount: u64) {
        self.counter.advance(amount);
    }

    fn set_length(&self, length: u64) {
        self.counter.set_length(length);
    }

    fn position(&self) -> u64 {
        self.counter.position()
    }

    fn length(&self) -> u64 {
        self.counter.length()
    }

    fn finish_with_message(&self, _message: &str) {
        self.counter.finish();
    }

    fn finish_with_error(&self, _message: &str) {
        self.counter.finish();
    }

    fn is_finished(&self) -> bool {
        self.counter.is_finished()
    }
}

/// Logs each step through tracing
#[derive(Debug)]
pub struct LogProgress {
    name: String,
    counter: Counter,
}

impl LogProgress {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            counter: Counter::with_length(length),
        }
    }
}

impl ProgressTracker for LogProgress {
    fn set_message(&self, message: &str) {
        info!("{}: {}", self.name, message);
    }

    fn increment(&self, amount: u64) {
        let position = self.counter.advance(amount);
        info!("{}: {}/{}", self.name, position, self.counter.length());
    }

    fn set_length(&self, length: u64) {
        self.counter.set_length(length);
    }

    fn position(&self) -> u64 {
        self.counter.position()
    }

    fn length(&self) -> u64 {
        self.counter.length()
    }

    fn finish_with_message(&self, message: &str) {
        self.counter.finish();
        info!("{}: {}", self.name, message);
    }

    fn finish_with_error(&self, message: &str) {
        self.counter.finish();
        warn!("{}: {}", self.name, message);
    }

    fn is_finished(&self) -> bool {
        self.counter.is_finished()
    }
}

/// Events emitted by [`CallbackProgress`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Message(String),
    /// A step completed
    Step { current: u64, total: u64 },
    Finished(String),
    /// Execution halted
    Failed(String),
}

/// Forwards progress to a closure
pub struct CallbackProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    callback: F,
    counter: Counter,
}

impl<F> CallbackProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    pub fn new(length: u64, callback: F) -> Self {
        Self {
            callback,
            counter: Counter::with_length(length),
        }
    }
}

impl<F> ProgressTracker for CallbackProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn set_message(&self, message: &str) {
        (self.callback)(ProgressEvent::Message(message.to_string()));
    }

    fn increment(&self, amount: u64) {
        let current = self.counter.advance(amount);
        (self.callback)(ProgressEvent::Step {
            current,
            total: self.counter.length(),
        });
    }

    fn set_length(&self, length: u64) {
        self.counter.set_length(length);
    }

    fn position(&self) -> u64 {
        self.counter.position()
    }

    fn length(&self) -> u64 {
        self.counter.length()
    }

    fn finish_with_message(&self, message: &str) {
        self.counter.finish();
        (self.callback)(ProgressEvent::Finished(message.to_string()));
    }

    fn finish_with_error(&self, message: &str) {
        self.counter.finish();
        (self.callback)(ProgressEvent::Failed(message.to_string()));
    }

    fn is_finished(&self) -> bool {
        self.counter.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_silent_progress() {
        let progress = SilentProgress::with_length(4);

        progress.set_message("test");
        progress.increment(1);
        progress.increment(2);
        assert_eq!(progress.position(), 3);
        assert_eq!(progress.length(), 4);

        assert!(!progress.is_finished());
        progress.finish_with_message("done");
        assert!(progress.is_finished());
    }

    #[test]
    fn test_log_progress() {
        let progress = LogProgress::new("hud_style", 0);
        progress.set_length(2);

        progress.increment(1);
        progress.increment(1);
        assert_eq!(progress.position(), 2);

        progress.finish_with_error("step 2 failed");
        assert!(progress.is_finished());
    }

    #[test]
    fn test_callback_progress() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = Arc::clone(&events);

        let progress = CallbackProgress::new(2, move |event| {
            events_clone.lock().unwrap().push(event);
        });

        progress.set_message("starting");
        progress.increment(1);
        progress.finish_with_error("conflict");

        let captured = events.lock().unwrap();
        assert_eq!(
            *captured,
            vec![
                ProgressEvent::Message("starting".to_string()),
                ProgressEvent::Step { current: 1, total: 2 },
                ProgressEvent::Failed("conflict".to_string()),
            ]
        );
        assert!(progress.is_finished());
    }
}
