//! Capabilities the tracker borrows from its host.
//!
//! The core never prompts, beeps or touches the clipboard itself. Whoever
//! renders the tracker implements these and passes them into the
//! operations that need them.

use std::path::PathBuf;

use crate::alarm::NotificationPermission;
use crate::error::CollaboratorError;

/// System notifications.
pub trait NotificationService {
    /// Current permission state, without asking.
    fn permission(&self) -> NotificationPermission;

    /// Ask the user for permission. May block until they answer.
    fn request_permission(&mut self) -> NotificationPermission;

    /// Show a notification. Only called with permission granted.
    fn notify(&mut self, title: &str) -> Result<(), CollaboratorError>;
}

/// Clipboard writes.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), CollaboratorError>;
}

/// Saving a payload as a user-visible file.
pub trait FileDownload {
    /// Returns where the file ended up.
    fn download(&mut self, file_name: &str, payload: &str) -> Result<PathBuf, CollaboratorError>;
}

/// Confirmation and free-text prompts.
pub trait Prompt {
    /// Yes/no question. Anything but an explicit yes is a no.
    fn confirm(&mut self, message: &str) -> bool;

    /// Free text, `None` when the user cancels or enters nothing.
    fn text(&mut self, message: &str) -> Option<String>;
}

/// Notification service for hosts that have none.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNotifications;

impl NotificationService for NoNotifications {
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::Unsupported
    }

    fn request_permission(&mut self) -> NotificationPermission {
        NotificationPermission::Unsupported
    }

    fn notify(&mut self, _title: &str) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::NotificationFailed(
            "notifications are not supported".into(),
        ))
    }
}
