use parking_lot::Mutex;

use crate::ServiceDescriptor;

/// Severity of an operator-facing status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Succeed,
    Fail,
    Warn,
}

/// Sink for operator-facing status lines.
pub trait Reporter: Send + Sync {
    fn log(&self, message: &str, level: Level);

    fn info(&self, message: &str) {
        self.log(message, Level::Info);
    }

    fn succeed(&self, message: &str) {
        self.log(message, Level::Succeed);
    }

    fn fail(&self, message: &str) {
        self.log(message, Level::Fail);
    }

    fn warn(&self, message: &str) {
        self.log(message, Level::Warn);
    }

    /// Called once after a successful install.
    fn post_install(&self, _service: &ServiceDescriptor) {}
}

/// Collects status lines in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().clone()
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages(level).iter().any(|m| m.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn log(&self, message: &str, level: Level) {
        self.lines.lock().push((level, message.to_string()));
    }
}
