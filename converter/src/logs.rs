//! Progress and diagnostic logging.
//!
//! Info and success entries go to stdout, warnings and errors to stderr.
//! Entries are rendered either as human-readable lines or as one JSON
//! object per line, depending on [`LogFormat`].

use std::io::Write;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Log level for console display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn is_diagnostic(self) -> bool {
        matches!(self, LogLevel::Warning | LogLevel::Error)
    }
}

/// How log entries are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Parse a format name (`text` or `json`, case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Optional indentation level (for nested logs)
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Render the entry as a single line, without trailing newline.
    pub fn render(&self, format: LogFormat) -> String {
        match format {
            LogFormat::Text => {
                let prefix = match self.level {
                    LogLevel::Info => "   ",
                    LogLevel::Success => "   ✓",
                    LogLevel::Warning => "   ⚠️",
                    LogLevel::Error => "   ❌",
                };
                let indent = "   ".repeat(self.indent as usize);
                format!("{}{} {}", indent, prefix, self.message)
            }
            LogFormat::Json => serde_json::to_string(self).unwrap_or_else(|_| {
                format!("{{\"level\":\"error\",\"message\":{:?}}}", self.message)
            }),
        }
    }
}

/// Global logger
pub static LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

/// Writes log entries to the console
pub struct Logger {
    format: RwLock<LogFormat>,
}

impl Logger {
    pub fn new() -> Self {
        Self { format: RwLock::new(LogFormat::default()) }
    }

    /// Switch the rendering format for every subsequent entry
    pub fn set_format(&self, format: LogFormat) {
        if let Ok(mut current) = self.format.write() {
            *current = format;
        }
    }

    pub fn format(&self) -> LogFormat {
        self.format.read().map(|f| *f).unwrap_or_default()
    }

    /// Write a log entry to stdout or stderr depending on its level
    pub fn log(&self, entry: LogEntry) {
        let line = entry.render(self.format());
        // A closed console must never abort a conversion
        if entry.level.is_diagnostic() {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        } else {
            let _ = writeln!(std::io::stdout().lock(), "{}", line);
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    LOGGER.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOGGER.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOGGER.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOGGER.log(LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOGGER.log(LogEntry::info(msg).with_indent(indent));
}
