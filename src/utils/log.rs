// src/utils/log.rs

//! Logger with server-style formatting.
//!
//! Constructed once at process entry and passed by reference into each
//! component. Output goes to the console and, when configured, is teed
//! into a log file so scheduled runs leave a trail.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;

/// Log level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Parse a level name, defaulting to Info for unknown values.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Injected logger instance.
pub struct Logger {
    level: LogLevel,
    console: bool,
    file: Option<Mutex<File>>,
}

impl Logger {
    /// Create a logger writing to the console only.
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            console: true,
            file: None,
        }
    }

    /// Create a logger that also appends every line to a file.
    ///
    /// A file that cannot be opened downgrades to console-only output;
    /// logging must never take the run down.
    pub fn with_file(level: LogLevel, path: &Path) -> Self {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
            .map(Mutex::new);
        Self {
            level,
            console: true,
            file,
        }
    }

    /// Suppress console output, keeping the file sink if any.
    pub fn quiet(mut self) -> Self {
        self.console = false;
        self
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    fn format_line(level: LogLevel, message: &str) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        format!("[{}] [{}] {}", timestamp, level.as_str(), message)
    }

    fn emit(&self, level: LogLevel, message: &str) {
        if !self.should_log(level) {
            return;
        }
        let line = Self::format_line(level, message);
        if self.console {
            if level >= LogLevel::Warn {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        }
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(file, "{}", line);
            }
        }
    }

    /// Log a debug message
    pub fn debug(&self, message: &str) {
        self.emit(LogLevel::Debug, message);
    }

    /// Log an info message
    pub fn info(&self, message: &str) {
        self.emit(LogLevel::Info, message);
    }

    /// Log a warning
    pub fn warn(&self, message: &str) {
        self.emit(LogLevel::Warn, message);
    }

    /// Log an error
    pub fn error(&self, message: &str) {
        self.emit(LogLevel::Error, message);
    }

    /// Log a success message (always shown as INFO)
    pub fn success(&self, message: &str) {
        self.emit(LogLevel::Info, message);
    }

    /// Log a header
    pub fn header(&self, title: &str) {
        let border = "═".repeat(60);
        self.emit(LogLevel::Info, &border);
        self.emit(LogLevel::Info, &format!("  {}", title));
        self.emit(LogLevel::Info, &border);
    }

    /// Log a summary section
    pub fn summary(&self, title: &str, items: &[(&str, String)]) {
        self.emit(LogLevel::Info, &format!("[SUMMARY] {}", title));
        for (key, value) in items {
            self.emit(LogLevel::Info, &format!("    {}: {}", key, value));
        }
    }
}
