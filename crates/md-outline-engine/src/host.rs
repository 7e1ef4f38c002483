//! User-facing collaborators: result presentation and notifications.

use std::fmt;

/// Severity of a user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MessageLevel::Info => "info",
            MessageLevel::Success => "success",
            MessageLevel::Warning => "warning",
            MessageLevel::Error => "error",
        };
        f.write_str(label)
    }
}

/// A conversion result ready to be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView<'a> {
    /// Identifies the view so it can be dismissed later.
    pub key: &'a str,
    pub title: &'a str,
    pub hint: &'a str,
    pub body: &'a str,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct HostError(pub String);

/// Shows conversion results, e.g. in a modal the user can copy from.
pub trait Presenter {
    fn show(&mut self, view: &ResultView<'_>) -> Result<(), HostError>;

    fn dismiss(&mut self, key: &str);
}

/// Fire-and-forget user messages.
pub trait Notifier {
    fn notify(&self, message: &str, level: MessageLevel);
}

/// Notifier that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, level: MessageLevel) {
        match level {
            MessageLevel::Info | MessageLevel::Success => log::info!("{message}"),
            MessageLevel::Warning => log::warn!("{message}"),
            MessageLevel::Error => log::error!("{message}"),
        }
    }
}
