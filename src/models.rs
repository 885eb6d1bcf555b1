use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPhase {
    Safe,
    Warning,
    Critical,
}

/// Output of the status engine for a single clock sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockStatus {
    pub phase: DayPhase,
    pub health: u8,
}

impl ClockStatus {
    pub const FULL: ClockStatus = ClockStatus {
        phase: DayPhase::Safe,
        health: 100,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Good,
    Meh,
    Bad,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Good => "good",
            Mood::Meh => "meh",
            Mood::Bad => "bad",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "good" => Some(Mood::Good),
            "meh" => Some(Mood::Meh),
            "bad" => Some(Mood::Bad),
            _ => None,
        }
    }
}

/// Per-day habit values. Cleared together when a day ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransientDailyFields {
    pub water: u32,
    pub vitamins: bool,
    pub mood: Option<Mood>,
    pub journal: String,
    pub routine: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotData {
    pub hp: u8,
    pub water: u32,
    pub vitamins: bool,
    pub mood: Option<Mood>,
    pub journal: String,
    #[serde(rename = "eveningRoutine")]
    pub evening_routine: Vec<String>,
    pub status: DayPhase,
}

/// One completed day as sent to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: String,
    pub streak: u64,
    pub data: SnapshotData,
}

impl DailySnapshot {
    pub fn build(
        date: String,
        streak: u64,
        status: ClockStatus,
        fields: TransientDailyFields,
    ) -> Self {
        Self {
            date,
            streak,
            data: SnapshotData {
                hp: status.health,
                water: fields.water,
                vitamins: fields.vitamins,
                mood: fields.mood,
                journal: fields.journal,
                evening_routine: fields.routine,
                status: status.phase,
            },
        }
    }
}

/// Durable progress: the streak counter and the set of completed days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub streak: u64,
    pub history: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub date: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub time: NaiveDateTime,
    pub date: String,
    pub phase: DayPhase,
    pub health: u8,
    pub title: String,
    pub blurb: String,
    pub session_active: bool,
    pub reminder: Option<Reminder>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub streak: u64,
    pub history: Vec<String>,
    pub reset_generation: u64,
}

#[derive(Debug, Serialize)]
pub struct EndDayResponse {
    pub date: String,
    pub streak: u64,
    /// The remote write was started; its outcome is never reported back.
    pub publish_issued: bool,
    pub snapshot: DailySnapshot,
}

#[derive(Debug, Serialize)]
pub struct CalendarDay {
    pub date: String,
    pub day: u32,
    pub completed: bool,
    pub today: bool,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub month: String,
    pub leading_blanks: u32,
    pub completed_count: usize,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Deserialize)]
pub struct WaterRequest {
    pub delta: i32,
}

#[derive(Debug, Deserialize)]
pub struct MoodRequest {
    pub mood: String,
}

#[derive(Debug, Deserialize)]
pub struct JournalRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct RoutineRequest {
    pub item: String,
}
