//! Run results.

use crate::backup::BackupRecord;
use crate::error::{Error, Result};
use camino::Utf8Path;
use serde::Serialize;
use std::fmt;
use std::io::Write;

/// Name of the log file written next to the staging directory.
pub const INSTALL_LOG: &str = "installlog.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureSeverity {
    Soft,
    /// The destination capsule did not exist.
    Hard,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationFailure {
    /// Description of the operation that failed.
    pub operation: String,
    pub message: String,
    pub severity: FailureSeverity,
}

/// How a single operation ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written,
    /// Nothing was written; the reason is logged.
    Skipped(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => f.write_str("Info"),
            LogLevel::Warning => f.write_str("Warning"),
            LogLevel::Error => f.write_str("Error"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Accumulated result of a run. Only the orchestrator's loop writes to it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failures: Vec<OperationFailure>,
    pub warnings: Vec<String>,
    /// Set when the run stopped early on request.
    pub cancelled: bool,
    #[serde(skip)]
    pub backups: Vec<BackupRecord>,
    pub log: Vec<LogEntry>,
}

impl RunSummary {
    pub fn note(&mut self, message: impl Into<String>) {
        self.log.push(LogEntry {
            level: LogLevel::Info,
            message: message.into(),
        });
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.warnings.push(message.clone());
        self.log.push(LogEntry {
            level: LogLevel::Warning,
            message,
        });
    }

    /// Fold one operation's result into the summary.
    pub fn record(&mut self, operation: &str, result: Result<Outcome>) {
        self.attempted += 1;
        match result {
            Ok(Outcome::Written) => self.succeeded += 1,
            Ok(Outcome::Skipped(reason)) => {
                self.skipped += 1;
                self.note(reason);
            }
            Err(error) => self.fail(operation, &error),
        }
    }

    fn fail(&mut self, operation: &str, error: &Error) {
        let severity = if error.is_hard_failure() {
            FailureSeverity::Hard
        } else {
            FailureSeverity::Soft
        };
        let message = error.to_string();
        tracing::error!("{}: {}", operation, message);

        self.log.push(LogEntry {
            level: LogLevel::Error,
            message: format!("{}: {}", operation, message),
        });
        self.failures.push(OperationFailure {
            operation: operation.to_string(),
            message,
            severity,
        });
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn hard_failures(&self) -> impl Iterator<Item = &OperationFailure> {
        self.failures
            .iter()
            .filter(|f| f.severity == FailureSeverity::Hard)
    }

    /// `true` when no operation failed and the run was not cancelled.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    /// Write the accumulated log as plain text.
    pub fn write_log(&self, path: &Utf8Path) -> Result<()> {
        let mut file = std::fs::File::create(path.as_std_path())?;
        for entry in &self.log {
            writeln!(file, "[{}] {}", entry.level, entry.message)?;
        }
        writeln!(
            file,
            "[Info] {} of {} operation(s) succeeded, {} skipped, {} failed{}",
            self.succeeded,
            self.attempted,
            self.skipped,
            self.failed(),
            if self.cancelled { " (cancelled)" } else { "" }
        )?;
        Ok(())
    }
}
