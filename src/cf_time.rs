//! CF "<unit> since <epoch>" time encoding.
//!
//! Time coordinates are stored on disk as whole numbers of `unit` elapsed since
//! `epoch`, e.g. `days since 2000-01-01 00:00:00`.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const CALENDAR: &str = "proleptic_gregorian";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeUnitsError {
    #[error("invalid time units '{0}', expected '<unit> since <date>'")]
    Format(String),
    #[error("unsupported time unit '{0}'")]
    Unit(String),
    #[error("invalid reference date '{0}'")]
    Epoch(String),
    #[error("time value {0} is outside the representable date range")]
    Overflow(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    fn seconds(self) -> i64 {
        match self {
            TimeUnit::Days => 86_400,
            TimeUnit::Hours => 3_600,
            TimeUnit::Minutes => 60,
            TimeUnit::Seconds => 1,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = TimeUnitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "days" | "day" | "d" => Ok(TimeUnit::Days),
            "hours" | "hour" | "h" => Ok(TimeUnit::Hours),
            "minutes" | "minute" | "min" => Ok(TimeUnit::Minutes),
            "seconds" | "second" | "s" => Ok(TimeUnit::Seconds),
            other => Err(TimeUnitsError::Unit(other.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeUnit::Days => "days",
            TimeUnit::Hours => "hours",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Seconds => "seconds",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUnits {
    pub unit: TimeUnit,
    pub epoch: NaiveDateTime,
}

impl TimeUnits {
    pub fn days_since(date: NaiveDate) -> Self {
        Self {
            unit: TimeUnit::Days,
            epoch: date.and_time(chrono::NaiveTime::MIN),
        }
    }

    pub fn parse(units: &str) -> Result<Self, TimeUnitsError> {
        let (unit, epoch) = units
            .split_once(" since ")
            .ok_or_else(|| TimeUnitsError::Format(units.to_string()))?;

        let unit = unit.trim().parse::<TimeUnit>()?;
        let epoch = parse_epoch(epoch.trim())?;

        Ok(Self { unit, epoch })
    }

    /// Whole units elapsed since the epoch, truncated toward zero.
    pub fn encode(&self, times: &[NaiveDateTime]) -> Vec<i64> {
        let step = self.unit.seconds();
        times
            .iter()
            .map(|t| (*t - self.epoch).num_seconds() / step)
            .collect()
    }

    /// Fill values and corrupt cells that land outside chrono's range are errors.
    pub fn decode(&self, values: &[f64]) -> Result<Vec<NaiveDateTime>, TimeUnitsError> {
        let step_ms = (self.unit.seconds() * 1_000) as f64;
        values
            .iter()
            .map(|&v| {
                let ms = (v * step_ms).round();
                if !ms.is_finite() || ms.abs() >= i64::MAX as f64 {
                    return Err(TimeUnitsError::Overflow(v.to_string()));
                }
                TimeDelta::try_milliseconds(ms as i64)
                    .and_then(|delta| self.epoch.checked_add_signed(delta))
                    .ok_or_else(|| TimeUnitsError::Overflow(v.to_string()))
            })
            .collect()
    }
}

fn parse_epoch(s: &str) -> Result<NaiveDateTime, TimeUnitsError> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

    for format in FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(t);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
        .map_err(|_| TimeUnitsError::Epoch(s.to_string()))
}

impl fmt::Display for TimeUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} since {}", self.unit, self.epoch.format("%Y-%m-%d %H:%M:%S"))
    }
}
