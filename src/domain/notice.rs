use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warn => write!(f, "warn"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A fire-and-forget user-facing notification.
///
/// The payment form never awaits or retries delivery; whatever sink is
/// wired in decides how (and whether) the notice reaches the user.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    pub fn new(title: impl Into<String>, description: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
        }
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, Severity::Info)
    }

    pub fn warn(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, Severity::Warn)
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, Severity::Error)
    }
}
