use crate::models::{Mood, TransientDailyFields};
use crate::storage::{KeyValueStore, StoreError, StoreKey};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::warn;

pub const ROUTINE_CATALOG: [&str; 10] = [
    "Reading",
    "Movie / Series (2 eps)",
    "Skincare",
    "Hair Mask",
    "Teeth Care",
    "Nails",
    "Eyebags Treatment",
    "Long Shower",
    "Shaving Legs",
    "Peppermint Tea",
];

/// How many evening routine items can be picked per day.
pub const ROUTINE_LIMIT: usize = 2;

#[derive(Debug, Error)]
pub enum HabitError {
    #[error("unknown routine item: {0}")]
    UnknownRoutineItem(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Adds the item if there is room, removes it if already picked.
/// Returns false when the pick was refused because the list is full.
pub fn toggle_routine_item(selected: &mut Vec<String>, item: &str) -> bool {
    if let Some(index) = selected.iter().position(|picked| picked == item) {
        selected.remove(index);
        return true;
    }
    if selected.len() >= ROUTINE_LIMIT {
        return false;
    }
    selected.push(item.to_string());
    true
}

/// Read-modify-write access to the per-day habit fields.
pub struct Habits {
    store: Arc<dyn KeyValueStore>,
    guard: Mutex<()>,
}

impl Habits {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            guard: Mutex::new(()),
        }
    }

    pub async fn load(&self) -> TransientDailyFields {
        TransientDailyFields {
            water: self.water().await,
            vitamins: self.vitamins().await,
            mood: self.mood().await,
            journal: self.store.get(StoreKey::Journal).await.unwrap_or_default(),
            routine: self.routine().await,
        }
    }

    pub async fn adjust_water(&self, delta: i32) -> Result<u32, StoreError> {
        let _guard = self.guard.lock().await;
        let current = self.water().await;
        let updated = current.saturating_add_signed(delta);
        self.store.set(StoreKey::Water, updated.to_string()).await?;
        Ok(updated)
    }

    pub async fn toggle_vitamins(&self) -> Result<bool, StoreError> {
        let _guard = self.guard.lock().await;
        let updated = !self.vitamins().await;
        self.store.set(StoreKey::Vitamins, updated.to_string()).await?;
        Ok(updated)
    }

    pub async fn set_mood(&self, mood: Mood) -> Result<(), StoreError> {
        self.store
            .set(StoreKey::Mood, mood.as_str().to_string())
            .await
    }

    pub async fn set_journal(&self, text: String) -> Result<(), StoreError> {
        self.store.set(StoreKey::Journal, text).await
    }

    pub async fn toggle_routine(&self, item: &str) -> Result<Vec<String>, HabitError> {
        let item = item.trim();
        if !ROUTINE_CATALOG.contains(&item) {
            return Err(HabitError::UnknownRoutineItem(item.to_string()));
        }

        let _guard = self.guard.lock().await;
        let mut selected = self.routine().await;
        if toggle_routine_item(&mut selected, item) {
            let encoded = serde_json::to_string(&selected).map_err(StoreError::from)?;
            self.store.set(StoreKey::Routine, encoded).await?;
        }
        Ok(selected)
    }

    async fn water(&self) -> u32 {
        match self.store.get(StoreKey::Water).await {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("ignoring malformed water count {raw:?}");
                0
            }),
            None => 0,
        }
    }

    async fn vitamins(&self) -> bool {
        self.store.get(StoreKey::Vitamins).await.as_deref() == Some("true")
    }

    async fn mood(&self) -> Option<Mood> {
        self.store
            .get(StoreKey::Mood)
            .await
            .and_then(|raw| Mood::parse(&raw))
    }

    async fn routine(&self) -> Vec<String> {
        let Some(raw) = self.store.get(StoreKey::Routine).await else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(items) => {
                let mut selected = Vec::new();
                for item in items {
                    if ROUTINE_CATALOG.contains(&item.as_str())
                        && !selected.contains(&item)
                        && selected.len() < ROUTINE_LIMIT
                    {
                        selected.push(item);
                    }
                }
                selected
            }
            Err(err) => {
                warn!("ignoring malformed routine: {err}");
                Vec::new()
            }
        }
    }
}
