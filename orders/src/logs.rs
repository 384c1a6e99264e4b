//! Run log.
//!
//! Entries go to stderr (unless muted) and onto a bounded broadcast channel.
//! A [`LogCapture`] subscribes to that channel for the length of a run and
//! hands back what was recorded, so a caller can count warnings or keep the
//! log next to the artifacts.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Entries a capture can fall behind before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn marker(self) -> &'static str {
        match self {
            LogLevel::Info => "·",
            LogLevel::Success => "✓",
            LogLevel::Warning => "⚠️",
            LogLevel::Error => "❌",
        }
    }
}

/// One line of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub level: LogLevel,
    /// Order the line is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    pub message: String,
    /// 0 for pipeline steps, 1 for details under a step
    #[serde(default)]
    pub depth: u8,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            level,
            order_id: None,
            message: message.into(),
            depth: 0,
        }
    }

    pub fn detail(mut self) -> Self {
        self.depth = 1;
        self
    }

    pub fn for_order(mut self, order_id: i64) -> Self {
        self.order_id = Some(order_id);
        self.detail()
    }

    /// Line as echoed to stderr.
    pub fn render(&self) -> String {
        let pad = "   ".repeat(usize::from(self.depth) + 1);
        format!("{}{} {}", pad, self.level.marker(), self.message)
    }
}

/// Process-wide run log
pub static RUN_LOG: Lazy<RunLog> = Lazy::new(RunLog::new);

pub struct RunLog {
    sender: broadcast::Sender<LogEntry>,
    echo: AtomicBool,
}

impl RunLog {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            echo: AtomicBool::new(true),
        }
    }

    pub fn record(&self, entry: LogEntry) {
        if self.echo.load(Ordering::Relaxed) {
            eprintln!("{}", entry.render());
        }
        // nobody capturing is fine
        let _ = self.sender.send(entry);
    }

    /// Turn the stderr echo on or off. Captures are unaffected.
    pub fn set_echo(&self, echo: bool) {
        self.echo.store(echo, Ordering::Relaxed);
    }

    pub fn capture(&self) -> LogCapture {
        LogCapture {
            receiver: self.sender.subscribe(),
            missed: 0,
        }
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Entries recorded while the capture is alive.
pub struct LogCapture {
    receiver: broadcast::Receiver<LogEntry>,
    missed: u64,
}

impl LogCapture {
    /// Start capturing [`RUN_LOG`].
    pub fn start() -> Self {
        RUN_LOG.capture()
    }

    /// Everything recorded since the capture started or was last drained.
    pub fn drain(&mut self) -> Vec<LogEntry> {
        let mut entries = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(entry) => entries.push(entry),
                Err(TryRecvError::Lagged(skipped)) => self.missed += skipped,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        entries
    }

    /// Entries dropped because the capture fell too far behind.
    pub fn missed(&self) -> u64 {
        self.missed
    }
}

pub fn info(message: impl Into<String>) {
    RUN_LOG.record(LogEntry::new(LogLevel::Info, message));
}

pub fn success(message: impl Into<String>) {
    RUN_LOG.record(LogEntry::new(LogLevel::Success, message));
}

pub fn warning(message: impl Into<String>) {
    RUN_LOG.record(LogEntry::new(LogLevel::Warning, message));
}

pub fn error(message: impl Into<String>) {
    RUN_LOG.record(LogEntry::new(LogLevel::Error, message));
}

/// Info line nested under the current step.
pub fn detail(message: impl Into<String>) {
    RUN_LOG.record(LogEntry::new(LogLevel::Info, message).detail());
}

pub fn order(level: LogLevel, order_id: i64, message: impl Into<String>) {
    RUN_LOG.record(LogEntry::new(level, message).for_order(order_id));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nesting() {
        assert_eq!(LogEntry::new(LogLevel::Info, "reading").render(), "   · reading");
        assert_eq!(LogEntry::new(LogLevel::Success, "done").render(), "   ✓ done");
        assert_eq!(
            LogEntry::new(LogLevel::Error, "x").for_order(3).render(),
            "      ❌ x"
        );
    }

    #[test]
    fn test_capture_collects_in_order() {
        let log = RunLog::new();
        log.set_echo(false);
        let mut capture = log.capture();

        log.record(LogEntry::new(LogLevel::Info, "a"));
        log.record(LogEntry::new(LogLevel::Warning, "b").for_order(7));

        let entries = capture.drain();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].level, LogLevel::Warning);
        assert_eq!(entries[1].order_id, Some(7));
        assert!(capture.drain().is_empty());
    }

    #[test]
    fn test_entries_before_capture_are_not_seen() {
        let log = RunLog::new();
        log.set_echo(false);
        log.record(LogEntry::new(LogLevel::Info, "early"));

        let mut capture = log.capture();
        log.record(LogEntry::new(LogLevel::Info, "late"));

        let messages: Vec<String> = capture.drain().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["late"]);
    }

    #[test]
    fn test_slow_capture_counts_missed() {
        let log = RunLog::new();
        log.set_echo(false);
        let mut capture = log.capture();

        for i in 0..CHANNEL_CAPACITY + 10 {
            log.record(LogEntry::new(LogLevel::Info, i.to_string()));
        }

        assert_eq!(capture.drain().len(), CHANNEL_CAPACITY);
        assert_eq!(capture.missed(), 10);
    }

    #[test]
    fn test_entry_serialization() {
        let entry = LogEntry::new(LogLevel::Success, "ok").for_order(10);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["level"], "success");
        assert_eq!(json["orderId"], 10);
        assert_eq!(json["depth"], 1);

        let plain = serde_json::to_value(LogEntry::new(LogLevel::Info, "x")).unwrap();
        assert!(plain.get("orderId").is_none());
    }
}
