//! Status reporting
//!
//! Every pipeline step produces one [`StatusEvent`]. The [`Reporter`] writes
//! it to the structured log through `tracing` and hands the same event to an
//! injected [`OutputSink`], which decides how (or whether) to show it. The
//! core never prints on its own.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Severity of a status event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusLevel {
    /// Step-by-step detail, shown only in verbose mode
    Detail,
    Info,
    Success,
    Warn,
    Error,
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Detail => "detail",
            Self::Info => "info",
            Self::Success => "success",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// One human-readable status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub level: StatusLevel,

    /// Whether the user should see this line
    pub visible: bool,

    pub message: String,
}

/// Destination for status events
pub trait OutputSink: Send + Sync {
    /// Consume one event
    fn emit(&self, event: &StatusEvent);

    /// Whether the sink is attached to a terminal (enables progress bars)
    fn is_interactive(&self) -> bool {
        false
    }
}

/// Sink that discards events; the structured log still receives them
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl OutputSink for SilentSink {
    fn emit(&self, _event: &StatusEvent) {}
}

/// Sink that records every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<StatusEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events so far
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Messages the user would have seen
    pub fn visible_messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.visible)
            .map(|e| e.message)
            .collect()
    }

    /// Whether any event at `level` contains `needle`
    pub fn contains(&self, level: StatusLevel, needle: &str) -> bool {
        self.events()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }
}

impl OutputSink for MemorySink {
    fn emit(&self, event: &StatusEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Emits status events to the log and to an injected sink
#[derive(Clone)]
pub struct Reporter {
    sink: Arc<dyn OutputSink>,
    verbose: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(Arc::new(SilentSink))
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl Reporter {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self {
            sink,
            verbose: false,
        }
    }

    /// Show detail-level events to the user
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_interactive(&self) -> bool {
        self.sink.is_interactive()
    }

    pub fn detail(&self, message: impl Into<String>) {
        self.emit(StatusLevel::Detail, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(StatusLevel::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(StatusLevel::Success, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.emit(StatusLevel::Warn, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(StatusLevel::Error, message.into());
    }

    fn emit(&self, level: StatusLevel, message: String) {
        match level {
            StatusLevel::Detail => tracing::debug!(status = %level, "{}", message),
            StatusLevel::Info | StatusLevel::Success => {
                tracing::info!(status = %level, "{}", message)
            }
            StatusLevel::Warn => tracing::warn!(status = %level, "{}", message),
            StatusLevel::Error => tracing::error!(status = %level, "{}", message),
        }

        let visible = level != StatusLevel::Detail || self.verbose;
        self.sink.emit(&StatusEvent {
            level,
            visible,
            message,
        });
    }
}
