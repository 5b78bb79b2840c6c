use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Pending,
    Granted,
    Denied,
}

impl Permission {
    pub fn from_browser(value: &str) -> Option<Self> {
        match value.trim() {
            "granted" => Some(Self::Granted),
            "denied" => Some(Self::Denied),
            "default" | "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;

    fn notify(&self, notification: Notification);

    fn notify_all(&self, notifications: Vec<Notification>) {
        for notification in notifications {
            self.notify(notification);
        }
    }
}

#[derive(Debug)]
pub struct NotificationCenter {
    permission: Mutex<Permission>,
    pending: Mutex<VecDeque<Notification>>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self {
            permission: Mutex::new(Permission::Pending),
            pending: Mutex::new(VecDeque::new()),
        }
    }
}

impl NotificationCenter {
    pub fn set_permission(&self, permission: Permission) {
        info!(?permission, "notification permission updated");
        *self
            .permission
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = permission;
    }

    pub fn drain(&self) -> Vec<Notification> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .drain(..)
            .collect()
    }
}

impl Notifier for NotificationCenter {
    fn permission(&self) -> Permission {
        *self
            .permission
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify(&self, notification: Notification) {
        warn!(title = %notification.title, body = %notification.body, "notification raised");
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(notification);
    }

    /// Replaces whatever an earlier scan left uncollected.
    fn notify_all(&self, notifications: Vec<Notification>) {
        for notification in &notifications {
            warn!(title = %notification.title, body = %notification.body, "notification raised");
        }
        *self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = notifications.into();
    }
}
