use crate::models::Reminder;
use crate::status::time_of_day;
use crate::storage::{KeyValueStore, StoreKey};
use async_trait::async_trait;
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, watch};
use tracing::{error, info};

pub const REMINDER_TITLE: &str = "Reclaim Your Evening";
pub const REMINDER_BODY: &str = "30 minutes left to wrap up work. Evening mode incoming.";
pub const REMINDER_AT: NaiveTime = time_of_day(17, 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Default,
    Granted,
    Denied,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;

    async fn request_permission(&self) -> Permission;

    async fn notify(&self, reminder: &Reminder);
}

/// Logs reminders and hands the latest one to whoever subscribed,
/// which is how the dashboard learns it should raise a browser notification.
pub struct LogNotifier {
    permission: StdMutex<Permission>,
    latest: watch::Sender<Option<Reminder>>,
}

impl LogNotifier {
    pub fn new() -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            permission: StdMutex::new(Permission::Default),
            latest,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Reminder>> {
        self.latest.subscribe()
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn permission(&self) -> Permission {
        self.permission
            .lock()
            .map(|permission| *permission)
            .unwrap_or(Permission::Denied)
    }

    async fn request_permission(&self) -> Permission {
        match self.permission.lock() {
            Ok(mut permission) => {
                if *permission == Permission::Default {
                    *permission = Permission::Granted;
                }
                *permission
            }
            Err(_) => Permission::Denied,
        }
    }

    async fn notify(&self, reminder: &Reminder) {
        info!(title = %reminder.title, "{}", reminder.body);
        self.latest.send_replace(Some(reminder.clone()));
    }
}

/// Fires the end-of-work reminder at most once per calendar day.
pub struct ReminderGate {
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    at: NaiveTime,
    guard: Mutex<()>,
}

impl ReminderGate {
    pub fn new(store: Arc<dyn KeyValueStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            at: REMINDER_AT,
            guard: Mutex::new(()),
        }
    }

    /// Asks once. A denial stays a denial.
    pub async fn ensure_permission(&self) -> Permission {
        match self.notifier.permission() {
            Permission::Default => self.notifier.request_permission().await,
            settled => settled,
        }
    }

    pub async fn check(&self, now: NaiveDateTime) -> Option<Reminder> {
        if now.hour() != self.at.hour() || now.minute() != self.at.minute() {
            return None;
        }

        let _guard = self.guard.lock().await;
        let today = now.date().format("%Y-%m-%d").to_string();
        if self.store.get(StoreKey::LastNotified).await.as_deref() == Some(today.as_str()) {
            return None;
        }

        let reminder = Reminder {
            date: today.clone(),
            title: REMINDER_TITLE.to_string(),
            body: REMINDER_BODY.to_string(),
        };
        let sent = self.notifier.permission() == Permission::Granted;
        if sent {
            self.notifier.notify(&reminder).await;
        }

        // The day is marked even when nothing was shown.
        if let Err(err) = self.store.set(StoreKey::LastNotified, today).await {
            error!("failed to record reminder date: {err}");
        }

        sent.then_some(reminder)
    }
}
