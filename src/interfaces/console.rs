use crate::domain::notice::{Notice, Severity};
use crate::domain::ports::NoticeSink;
use std::sync::Mutex;

/// Prints notices to stdout, one line each, and mirrors them to the log.
#[derive(Default)]
pub struct ConsoleNoticeSink;

impl ConsoleNoticeSink {
    pub fn new() -> Self {
        Self
    }
}

impl NoticeSink for ConsoleNoticeSink {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => tracing::info!(title = %notice.title, "notice"),
            Severity::Warn => tracing::warn!(title = %notice.title, "notice"),
            Severity::Error => tracing::error!(title = %notice.title, "notice"),
        }
        println!(
            "[{}] {}: {}",
            notice.severity, notice.title, notice.description
        );
    }
}

/// Collects notices in memory so tests can assert on them.
#[derive(Default)]
pub struct MemoryNoticeSink {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNoticeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every notice received so far.
    pub fn drain(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(mut notices) => std::mem::take(&mut *notices),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.notices.lock().map(|notices| notices.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NoticeSink for MemoryNoticeSink {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects_and_drains() {
        let sink = MemoryNoticeSink::new();
        sink.notify(Notice::info("Payment successful", "done"));
        sink.notify(Notice::error("Payment failed", "declined"));

        assert_eq!(sink.len(), 2);
        let drained = sink.drain();
        assert_eq!(drained[0].title, "Payment successful");
        assert_eq!(drained[1].severity, Severity::Error);
        assert!(sink.is_empty());
    }
}
