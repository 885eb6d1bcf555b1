use chrono::{Local, NaiveDateTime};

/// Source of wall-clock time. Swapped for a fixed clock in tests.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Clock;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::Mutex;

    pub struct FixedClock {
        now: Mutex<NaiveDateTime>,
    }

    impl FixedClock {
        pub fn new(now: NaiveDateTime) -> Self {
            Self {
                now: Mutex::new(now),
            }
        }

        pub fn set(&self, now: NaiveDateTime) {
            *self.now.lock().unwrap() = now;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            *self.now.lock().unwrap()
        }
    }

    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }
}
