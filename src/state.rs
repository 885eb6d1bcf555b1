use crate::clock::Clock;
use crate::habits::Habits;
use crate::models::Reminder;
use crate::status::StatusConfig;
use crate::sync::SyncCoordinator;
use crate::ticker::TickSample;
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub clock: Arc<dyn Clock>,
    pub status_config: StatusConfig,
    pub coordinator: Arc<SyncCoordinator>,
    pub habits: Arc<Habits>,
    pub session: Arc<Session>,
    pub ticks: watch::Receiver<TickSample>,
    pub reminders: watch::Receiver<Option<Reminder>>,
}

/// Tracks which calendar date was last ended. The session is closed for the
/// rest of that date and reopens on the next one.
#[derive(Debug, Default)]
pub struct Session {
    ended_on: Mutex<Option<NaiveDate>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, today: NaiveDate) -> bool {
        match self.ended_on.lock() {
            Ok(ended_on) => *ended_on != Some(today),
            Err(poisoned) => *poisoned.into_inner() != Some(today),
        }
    }

    /// Closes the session for `today`. Returns false if it was already closed.
    pub fn end(&self, today: NaiveDate) -> bool {
        let mut ended_on = match self.ended_on.lock() {
            Ok(ended_on) => ended_on,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *ended_on == Some(today) {
            return false;
        }
        *ended_on = Some(today);
        true
    }
}
