//! Per-plugin diagnostics collection.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Info,
    Warn,
    Error,
}

/// One diagnostic line emitted by a plugin during execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    #[serde(default)]
    pub cause: Option<String>,
}

/// Collector isolated per plugin run; the executor moves its contents into
/// the run report afterwards.
#[derive(Debug, Default)]
pub struct DiagnosticsCollector {
    entries: Vec<Diagnostic>,
}

impl DiagnosticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(DiagnosticLevel::Info, message, None);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(DiagnosticLevel::Warn, message, None);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(DiagnosticLevel::Error, message, None);
    }

    pub fn error_with_cause(&mut self, message: impl Into<String>, cause: impl Into<String>) {
        self.push(DiagnosticLevel::Error, message, Some(cause.into()));
    }

    fn push(&mut self, level: DiagnosticLevel, message: impl Into<String>, cause: Option<String>) {
        self.entries.push(Diagnostic {
            level,
            message: message.into(),
            cause,
        });
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error)
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_and_causes_are_recorded() {
        let mut collector = DiagnosticsCollector::new();
        collector.info("starting");
        collector.warn("model is small");
        collector.error_with_cause("write failed", "disk full");

        assert!(collector.has_errors());
        let entries = collector.into_entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].cause.as_deref(), Some("disk full"));
    }

    #[test]
    fn test_no_errors_without_error_entries() {
        let mut collector = DiagnosticsCollector::new();
        collector.info("fine");
        assert!(!collector.has_errors());
    }
}
