use crate::clock::Clock;
use crate::models::ClockStatus;
use crate::reminder::ReminderGate;
use crate::status::{StatusConfig, evaluate_at};
use chrono::NaiveDateTime;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSample {
    pub at: NaiveDateTime,
    pub status: ClockStatus,
}

/// Re-evaluates the status engine on a fixed period and drives the reminder gate.
pub struct Ticker {
    clock: Arc<dyn Clock>,
    config: StatusConfig,
    reminders: Arc<ReminderGate>,
    period: Duration,
}

impl Ticker {
    pub fn new(clock: Arc<dyn Clock>, config: StatusConfig, reminders: Arc<ReminderGate>) -> Self {
        Self {
            clock,
            config,
            reminders,
            period: DEFAULT_PERIOD,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn sample(&self) -> TickSample {
        let at = self.clock.now();
        TickSample {
            at,
            status: evaluate_at(at, &self.config),
        }
    }

    /// Starts the loop. The returned receiver always holds the latest sample.
    pub fn spawn(self) -> (TickerHandle, watch::Receiver<TickSample>) {
        let (sender, receiver) = watch::channel(self.sample());
        let token = CancellationToken::new();
        let task = tokio::spawn(self.run(sender, token.clone()));
        (
            TickerHandle {
                token,
                task: Some(task),
            },
            receiver,
        )
    }

    async fn run(self, sender: watch::Sender<TickSample>, token: CancellationToken) {
        let mut ticks = interval(self.period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("ticker stopped");
                    return;
                }
                _ = ticks.tick() => {
                    let sample = self.sample();
                    sender.send_if_modified(|current| {
                        let changed = *current != sample;
                        *current = sample;
                        changed
                    });
                    self.reminders.check(sample.at).await;
                }
            }
        }
    }
}

/// Owns the ticker task; dropping it stops the loop.
pub struct TickerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl TickerHandle {
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        info!("ticker shut down");
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
