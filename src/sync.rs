use crate::models::{ClockStatus, DailySnapshot, Progress, TransientDailyFields};
use crate::remote::{PublishOutcome, RemoteData, RemoteStore};
use crate::storage::{KeyValueStore, StoreKey};
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{error, info, warn};

pub fn merge_streak(local: u64, remote: u64) -> u64 {
    local.max(remote)
}

pub fn merge_history(local: &BTreeSet<String>, remote: &BTreeSet<String>) -> BTreeSet<String> {
    local.union(remote).cloned().collect()
}

/// What `end_day` committed, plus the detached remote write.
pub struct EndDayReceipt {
    pub date: String,
    pub streak: u64,
    pub snapshot: DailySnapshot,
    pub publish: JoinHandle<PublishOutcome>,
}

/// Owns streak and history, keeping local storage and the remote store in step.
pub struct SyncCoordinator {
    store: Arc<dyn KeyValueStore>,
    remote: Arc<dyn RemoteStore>,
    progress: Mutex<Progress>,
    reset_generation: AtomicU64,
}

impl SyncCoordinator {
    pub fn new(store: Arc<dyn KeyValueStore>, remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            remote,
            progress: Mutex::new(Progress::default()),
            reset_generation: AtomicU64::new(0),
        }
    }

    /// Reads local progress, then merges in whatever the remote store has.
    pub async fn load(&self) -> Progress {
        self.load_local().await;
        self.sync_remote().await
    }

    pub async fn load_local(&self) -> Progress {
        let streak = parse_streak(self.store.get(StoreKey::Streak).await.as_deref());
        let history = parse_history(self.store.get(StoreKey::History).await.as_deref());

        let mut progress = self.progress.lock().await;
        *progress = Progress { streak, history };
        progress.clone()
    }

    pub async fn sync_remote(&self) -> Progress {
        let remote = self.remote.fetch().await;

        let mut progress = self.progress.lock().await;
        if let Some(remote) = remote {
            self.apply_remote(&mut progress, &remote).await;
        }
        progress.clone()
    }

    async fn apply_remote(&self, progress: &mut Progress, remote: &RemoteData) {
        let streak = merge_streak(progress.streak, remote.streak);
        if streak != progress.streak {
            progress.streak = streak;
            if let Err(err) = self.store.set(StoreKey::Streak, streak.to_string()).await {
                error!("failed to store merged streak: {err}");
            }
        }

        let history = merge_history(&progress.history, &remote.history);
        if history != progress.history {
            progress.history = history;
            self.write_history(&progress.history).await;
        }

        info!(
            streak = progress.streak,
            days = progress.history.len(),
            "merged remote progress"
        );
    }

    /// Commits the day locally, fires the remote write without waiting for it,
    /// then clears the per-day fields.
    ///
    /// The streak counts calls, not dates: ending the same date twice bumps the
    /// streak twice while the history keeps a single entry.
    pub async fn end_day(
        &self,
        now: NaiveDateTime,
        status: ClockStatus,
        fields: TransientDailyFields,
    ) -> EndDayReceipt {
        let date = now.date().format("%Y-%m-%d").to_string();

        let streak = {
            let mut progress = self.progress.lock().await;
            progress.streak = progress.streak.saturating_add(1);
            if let Err(err) = self
                .store
                .set(StoreKey::Streak, progress.streak.to_string())
                .await
            {
                error!("failed to store streak: {err}");
            }

            if progress.history.insert(date.clone()) {
                self.write_history(&progress.history).await;
            }
            progress.streak
        };

        let snapshot = DailySnapshot::build(date.clone(), streak, status, fields);
        let publish = {
            let remote = Arc::clone(&self.remote);
            let snapshot = snapshot.clone();
            tokio::spawn(async move { remote.publish(&snapshot).await })
        };

        for key in StoreKey::TRANSIENT {
            if let Err(err) = self.store.remove(key).await {
                error!("failed to clear {}: {err}", key.as_str());
            }
        }
        self.reset_generation.fetch_add(1, Ordering::SeqCst);

        info!(%date, streak, "day ended");

        EndDayReceipt {
            date,
            streak,
            snapshot,
            publish,
        }
    }

    pub async fn progress(&self) -> Progress {
        self.progress.lock().await.clone()
    }

    /// Bumped every time the per-day fields are wiped.
    pub fn reset_generation(&self) -> u64 {
        self.reset_generation.load(Ordering::SeqCst)
    }

    async fn write_history(&self, history: &BTreeSet<String>) {
        let encoded = match serde_json::to_string(history) {
            Ok(encoded) => encoded,
            Err(err) => {
                error!("failed to encode history: {err}");
                return;
            }
        };
        if let Err(err) = self.store.set(StoreKey::History, encoded).await {
            error!("failed to store history: {err}");
        }
    }
}

fn parse_streak(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return 0;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        warn!("ignoring malformed streak value {raw:?}");
        0
    })
}

fn parse_history(raw: Option<&str>) -> BTreeSet<String> {
    let Some(raw) = raw else {
        return BTreeSet::new();
    };
    serde_json::from_str::<Vec<String>>(raw)
        .map(|days| days.into_iter().collect())
        .unwrap_or_else(|err| {
            warn!("ignoring malformed history: {err}");
            BTreeSet::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::at;
    use crate::models::Mood;
    use crate::remote::OfflineRemote;
    use crate::status::{StatusConfig, evaluate_at};
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    struct FakeRemote {
        data: Option<RemoteData>,
        published: StdMutex<Vec<DailySnapshot>>,
    }

    impl FakeRemote {
        fn new(data: Option<RemoteData>) -> Self {
            Self {
                data,
                published: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RemoteStore for FakeRemote {
        async fn fetch(&self) -> Option<RemoteData> {
            self.data.clone()
        }

        async fn publish(&self, snapshot: &DailySnapshot) -> PublishOutcome {
            self.published.lock().unwrap().push(snapshot.clone());
            PublishOutcome::Ok
        }
    }

    /// A remote whose publish never completes.
    struct StalledRemote;

    #[async_trait]
    impl RemoteStore for StalledRemote {
        async fn fetch(&self) -> Option<RemoteData> {
            None
        }

        async fn publish(&self, _snapshot: &DailySnapshot) -> PublishOutcome {
            std::future::pending::<PublishOutcome>().await
        }
    }

    fn days(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|day| day.to_string()).collect()
    }

    #[test]
    fn merge_takes_max_streak() {
        for (local, remote) in [(0, 0), (3, 1), (1, 3), (7, 7), (0, 12)] {
            assert_eq!(merge_streak(local, remote), local.max(remote));
        }
    }

    #[test]
    fn merge_unions_history() {
        let merged = merge_history(
            &days(&["2026-01-01", "2026-01-03"]),
            &days(&["2026-01-03", "2026-01-02"]),
        );
        assert_eq!(merged, days(&["2026-01-01", "2026-01-02", "2026-01-03"]));
    }

    #[tokio::test]
    async fn malformed_local_values_fall_back_to_defaults() {
        for raw in ["not json", "{\"a\":1}", "[1,2,3]", "", "null"] {
            let store = Arc::new(MemoryStore::new());
            store.set(StoreKey::History, raw.to_string()).await.unwrap();
            store.set(StoreKey::Streak, "abc".to_string()).await.unwrap();

            let coordinator = SyncCoordinator::new(store, Arc::new(OfflineRemote));
            let progress = coordinator.load().await;
            assert!(progress.history.is_empty(), "history from {raw:?}");
            assert_eq!(progress.streak, 0);
        }
    }

    #[tokio::test]
    async fn load_merges_remote_and_writes_back() {
        let store = Arc::new(MemoryStore::new());
        store.set(StoreKey::Streak, "2".into()).await.unwrap();
        store
            .set(StoreKey::History, r#"["2026-01-01"]"#.into())
            .await
            .unwrap();

        let remote = FakeRemote::new(Some(RemoteData {
            streak: 5,
            history: days(&["2026-01-01", "2026-01-02"]),
        }));
        let coordinator = SyncCoordinator::new(store.clone(), Arc::new(remote));

        let progress = coordinator.load().await;
        assert_eq!(progress.streak, 5);
        assert_eq!(progress.history, days(&["2026-01-01", "2026-01-02"]));
        assert_eq!(store.get(StoreKey::Streak).await.as_deref(), Some("5"));
        assert_eq!(
            parse_history(store.get(StoreKey::History).await.as_deref()),
            days(&["2026-01-01", "2026-01-02"])
        );
    }

    #[tokio::test]
    async fn smaller_remote_never_lowers_local() {
        let store = Arc::new(MemoryStore::new());
        store.set(StoreKey::Streak, "9".into()).await.unwrap();
        store
            .set(StoreKey::History, r#"["2026-01-05"]"#.into())
            .await
            .unwrap();

        let remote = FakeRemote::new(Some(RemoteData {
            streak: 4,
            history: BTreeSet::new(),
        }));
        let coordinator = SyncCoordinator::new(store.clone(), Arc::new(remote));

        let progress = coordinator.load().await;
        assert_eq!(progress.streak, 9);
        assert_eq!(progress.history, days(&["2026-01-05"]));
    }

    #[tokio::test]
    async fn failed_fetch_leaves_local_state() {
        let store = Arc::new(MemoryStore::new());
        store.set(StoreKey::Streak, "3".into()).await.unwrap();

        let coordinator = SyncCoordinator::new(store.clone(), Arc::new(FakeRemote::new(None)));
        let progress = coordinator.load().await;
        assert_eq!(progress.streak, 3);
        assert_eq!(store.get(StoreKey::History).await, None);
    }

    #[tokio::test]
    async fn end_day_commits_publishes_and_clears() {
        let store = Arc::new(MemoryStore::new());
        for (key, value) in [
            (StoreKey::Water, "4"),
            (StoreKey::Vitamins, "true"),
            (StoreKey::Mood, "good"),
            (StoreKey::Journal, "long walk"),
            (StoreKey::Routine, r#"["Reading"]"#),
        ] {
            store.set(key, value.to_string()).await.unwrap();
        }

        let remote = Arc::new(FakeRemote::new(None));
        let coordinator = SyncCoordinator::new(store.clone(), remote.clone());
        coordinator.load().await;

        let fields = TransientDailyFields {
            water: 4,
            vitamins: true,
            mood: Some(Mood::Good),
            journal: "long walk".into(),
            routine: vec!["Reading".into()],
        };
        let now = at(2026, 6, 1, 18, 10);
        let status = evaluate_at(now, &StatusConfig::default());
        let receipt = coordinator.end_day(now, status, fields).await;

        assert_eq!(receipt.date, "2026-06-01");
        assert_eq!(receipt.streak, 1);
        assert_eq!(receipt.snapshot.data.hp, 80);
        assert_eq!(receipt.snapshot.data.water, 4);
        assert_eq!(receipt.publish.await.unwrap(), PublishOutcome::Ok);
        assert_eq!(remote.published.lock().unwrap().len(), 1);

        for key in StoreKey::TRANSIENT {
            assert_eq!(store.get(key).await, None, "{} not cleared", key.as_str());
        }
        assert_eq!(store.get(StoreKey::Streak).await.as_deref(), Some("1"));
        assert_eq!(coordinator.reset_generation(), 1);
    }

    #[tokio::test]
    async fn ending_same_date_twice_counts_twice_but_records_once() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = SyncCoordinator::new(store.clone(), Arc::new(OfflineRemote));
        coordinator.load().await;

        let first = coordinator
            .end_day(at(2026, 6, 1, 19, 0), ClockStatus::FULL, TransientDailyFields::default())
            .await;
        let second = coordinator
            .end_day(at(2026, 6, 1, 21, 0), ClockStatus::FULL, TransientDailyFields::default())
            .await;

        assert_eq!(first.streak, 1);
        assert_eq!(second.streak, 2);
        let progress = coordinator.progress().await;
        assert_eq!(progress.history, days(&["2026-06-01"]));
        assert_eq!(second.publish.await.unwrap(), PublishOutcome::Unknown);
    }

    #[tokio::test]
    async fn remote_failure_does_not_roll_back() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = SyncCoordinator::new(store.clone(), Arc::new(OfflineRemote));

        let receipt = coordinator
            .end_day(at(2026, 6, 2, 18, 0), ClockStatus::FULL, TransientDailyFields::default())
            .await;
        let _ = receipt.publish.await;

        let reloaded = SyncCoordinator::new(store, Arc::new(FakeRemote::new(None)));
        let progress = reloaded.load().await;
        assert_eq!(progress.streak, 1);
        assert_eq!(progress.history, days(&["2026-06-02"]));
    }

    #[tokio::test]
    async fn stalled_publish_does_not_hold_up_end_day() {
        let store = Arc::new(MemoryStore::new());
        for key in StoreKey::TRANSIENT {
            store.set(key, "1".to_string()).await.unwrap();
        }
        let coordinator = SyncCoordinator::new(store.clone(), Arc::new(StalledRemote));

        let receipt = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            coordinator.end_day(
                at(2026, 6, 3, 18, 40),
                ClockStatus::FULL,
                TransientDailyFields::default(),
            ),
        )
        .await
        .expect("end_day waited on the remote");

        assert!(!receipt.publish.is_finished());
        for key in StoreKey::TRANSIENT {
            assert_eq!(store.get(key).await, None, "{} not cleared", key.as_str());
        }
        assert_eq!(store.get(StoreKey::Streak).await.as_deref(), Some("1"));
        assert_eq!(
            parse_history(store.get(StoreKey::History).await.as_deref()),
            days(&["2026-06-03"])
        );
        assert_eq!(coordinator.reset_generation(), 1);
        receipt.publish.abort();
    }
}
