use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;

/// Half-open interval `[start, end)` covering one civil day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

impl fmt::Display for DayWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// The civil timezone that defines check-in days, independent of the host's local zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceZone(Tz);

impl Default for ReferenceZone {
    fn default() -> Self {
        Self(DEFAULT_TIMEZONE)
    }
}

impl FromStr for ReferenceZone {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        name.parse::<Tz>()
            .map(Self)
            .map_err(|e| format!("Unknown timezone {name}: {e}"))
    }
}

impl ReferenceZone {
    pub const fn new(tz: Tz) -> Self {
        Self(tz)
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn civil_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }

    /// Window of the civil day containing `reference`. `end` is always `start + 24h`.
    pub fn day_interval(&self, reference: DateTime<Utc>) -> DayWindow {
        let start = self
            .start_of_day(self.civil_date(reference))
            .unwrap_or(reference);
        DayWindow {
            start,
            end: start + Duration::hours(24),
        }
    }

    pub fn today(&self, now: DateTime<Utc>) -> DayWindow {
        self.day_interval(now)
    }

    pub fn yesterday(&self, now: DateTime<Utc>) -> DayWindow {
        self.day_interval(now - Duration::hours(24))
    }

    // Midnight can be skipped by a DST jump, so take the first local hour that exists.
    fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        (0..24).find_map(|hour| {
            let local = date.and_hms_opt(hour, 0, 0)?;
            self.0
                .from_local_datetime(&local)
                .earliest()
                .map(|start| start.with_timezone(&Utc))
        })
    }
}
