use crate::models::{CalendarDay, CalendarResponse};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeSet;

/// Month grid for the month containing `today`, weeks starting on Sunday.
pub fn build_calendar_at(today: NaiveDate, history: &BTreeSet<String>) -> CalendarResponse {
    let first = month_start(today);

    let mut days = Vec::with_capacity(31);
    let mut date = first;
    while date.month() == first.month() {
        let key = date_key(date);
        days.push(CalendarDay {
            completed: history.contains(&key),
            today: date == today,
            day: date.day(),
            date: key,
        });
        date += Duration::days(1);
    }

    CalendarResponse {
        month: first.format("%B %Y").to_string(),
        leading_blanks: first.weekday().num_days_from_sunday(),
        completed_count: days.iter().filter(|day| day.completed).count(),
        days,
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
