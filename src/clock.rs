use crate::errors::AppError;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

const DATE_STRING_FORMAT: &str = "%a %b %d %Y";

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// `Sun Oct 18 2026`
pub fn date_string(date: NaiveDate) -> String {
    date.format(DATE_STRING_FORMAT).to_string()
}

pub fn parse_date_string(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, DATE_STRING_FORMAT).map_err(AppError::internal)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockDisplay {
    pub weekday: String,
    pub date: String,
    pub time: String,
}

impl ClockDisplay {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            weekday: now.format("%A").to_string(),
            date: now.format("%m/%d/%Y").to_string(),
            time: now.format("%-I:%M:%S %p").to_string(),
        }
    }

    pub fn line(&self) -> String {
        format!("{} | {} | {}", self.weekday, self.date, self.time)
    }
}
