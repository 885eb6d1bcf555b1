use crate::models::{ClockStatus, DayPhase};
use chrono::{NaiveDateTime, NaiveTime, Timelike};

pub const DEFAULT_DEADLINE: NaiveTime = time_of_day(18, 0);

/// Builds a constant time of day; out-of-range values fail at compile time.
pub const fn time_of_day(hour: u32, minute: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(time) => time,
        None => panic!("invalid time of day"),
    }
}

#[derive(Debug, Clone)]
pub struct StatusConfig {
    pub deadline: NaiveTime,
    pub decay_per_minute: u32,
    /// Health at or below this value is critical.
    pub warning_floor: u8,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
            decay_per_minute: 2,
            warning_floor: 50,
        }
    }
}

/// Maps a time of day to a phase and health value.
///
/// Health stays at 100 up to the deadline and then loses `decay_per_minute`
/// points per whole elapsed minute, never dropping below zero. The result is
/// recomputed from scratch on every call, so there is no hysteresis at the
/// boundaries.
pub fn evaluate(now: NaiveTime, config: &StatusConfig) -> ClockStatus {
    if now <= config.deadline {
        return ClockStatus::FULL;
    }

    let elapsed = (now - config.deadline).num_minutes();
    let drained = elapsed.saturating_mul(i64::from(config.decay_per_minute));
    let health = (100 - drained.min(100)) as u8;

    let phase = if health > config.warning_floor {
        DayPhase::Warning
    } else {
        DayPhase::Critical
    };

    ClockStatus { phase, health }
}

pub fn evaluate_at(now: NaiveDateTime, config: &StatusConfig) -> ClockStatus {
    evaluate(now.time(), config)
}

/// Title and blurb shown next to the health meter.
pub fn headline(status: ClockStatus, session_active: bool, config: &StatusConfig) -> (String, String) {
    if !session_active {
        return (
            "Sanctuary Restored".to_string(),
            "The world can wait. Goodnight.".to_string(),
        );
    }

    match status.phase {
        DayPhase::Safe => (
            "Focus Time".to_string(),
            format!(
                "You are in control. {} is the deadline.",
                deadline_label(config.deadline)
            ),
        ),
        DayPhase::Warning => (
            "Wind Down".to_string(),
            "The deadline has passed. Close the laptop and be present.".to_string(),
        ),
        DayPhase::Critical => (
            "Overtime".to_string(),
            "Your evening is draining away. End the day.".to_string(),
        ),
    }
}

fn deadline_label(deadline: NaiveTime) -> String {
    let (is_pm, hour) = deadline.hour12();
    let suffix = if is_pm { "PM" } else { "AM" };
    format!("{hour}:{:02} {suffix}", deadline.minute())
}
