//! Outbound collaborators: profile lookups, notification delivery and time.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::identity::{ClientId, FreelancerId};

/// Display attributes for a freelancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreelancerProfile {
    pub full_name: String,
    pub email: String,
}

/// Display attributes for a client and the company they hire for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub full_name: String,
    pub company_name: Option<String>,
    pub company_address: Option<String>,
}

/// Read-only access to profile storage.
pub trait ProfileDirectory: Send + Sync {
    fn freelancer(&self, id: &FreelancerId) -> Result<Option<FreelancerProfile>, DirectoryError>;
    fn client(&self, id: &ClientId) -> Result<Option<ClientProfile>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("profile directory unavailable: {0}")]
    Unavailable(String),
}

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecipientKind {
    Client,
    Freelancer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: String,
    pub user_kind: RecipientKind,
    pub title: String,
    pub message: String,
    pub link: String,
}

impl Notification {
    pub fn for_client(client_id: &ClientId, title: &str, message: String, link: String) -> Self {
        Self {
            user_id: client_id.0.clone(),
            user_kind: RecipientKind::Client,
            title: title.to_string(),
            message,
            link,
        }
    }

    pub fn for_freelancer(
        freelancer_id: &FreelancerId,
        title: &str,
        message: String,
        link: String,
    ) -> Self {
        Self {
            user_id: freelancer_id.0.clone(),
            user_kind: RecipientKind::Freelancer,
            title: title.to_string(),
            message,
            link,
        }
    }
}

/// Delivery channel for in-app notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Source of wall-clock time for time-boxed rules.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to; used by the demo and tests.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        let mut guard = self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Collaborators shared by every hiring service.
#[derive(Clone)]
pub struct HiringPorts {
    pub directory: Arc<dyn ProfileDirectory>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
}

impl HiringPorts {
    pub fn new(
        directory: Arc<dyn ProfileDirectory>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            notifier,
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Fire-and-forget delivery; failures are logged and never surface.
    pub(crate) fn notify(&self, notification: Notification) {
        let title = notification.title.clone();
        let user_id = notification.user_id.clone();
        if let Err(err) = self.notifier.notify(notification) {
            warn!(%title, %user_id, error = %err, "notification dispatch failed");
        }
    }
}
