use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

// ---------------------------------------------------------------------------
// AlertLevel – four-tier impact estimate
// ---------------------------------------------------------------------------

/// Impact estimate attached to an event, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlertLevel {
    Green,
    Yellow,
    Orange,
    Red,
}

impl AlertLevel {
    pub const ALL: [AlertLevel; 4] = [
        AlertLevel::Green,
        AlertLevel::Yellow,
        AlertLevel::Orange,
        AlertLevel::Red,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Green => "green",
            AlertLevel::Yellow => "yellow",
            AlertLevel::Orange => "orange",
            AlertLevel::Red => "red",
        }
    }

    /// Parse a raw cell. Blank and pandas-style missing markers map to `None`.
    pub fn parse_cell(raw: &str) -> Result<Option<AlertLevel>, UnknownAlertLevel> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("null")
        {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when an alert cell holds something other than the four labels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown alert level '{0}' (expected green, yellow, orange or red)")]
pub struct UnknownAlertLevel(pub String);

impl FromStr for AlertLevel {
    type Err = UnknownAlertLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAlertLevel(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Event – one row of the catalog
// ---------------------------------------------------------------------------

/// A single earthquake record.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub magnitude: f64,
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
    pub continent: String,
    pub date: NaiveDateTime,
    pub place: String,
    pub alert: Option<AlertLevel>,
}

// ---------------------------------------------------------------------------
// EarthquakeCatalog – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed catalog with pre-computed indices. Immutable after load.
#[derive(Debug, Clone)]
pub struct EarthquakeCatalog {
    /// All events (rows), in file order.
    pub events: Vec<Event>,
    /// Sorted distinct continent labels.
    pub continents: BTreeSet<String>,
}

impl EarthquakeCatalog {
    /// Build indices from the loaded events.
    pub fn from_events(events: Vec<Event>) -> Self {
        let continents = events.iter().map(|e| e.continent.clone()).collect();
        EarthquakeCatalog { events, continents }
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Smallest and largest magnitude, or `None` for an empty catalog.
    pub fn magnitude_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.events.iter().map(|e| e.magnitude);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), m| (lo.min(m), hi.max(m))))
    }

    /// Earliest and latest event timestamp.
    pub fn date_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let min = self.events.iter().map(|e| e.date).min()?;
        let max = self.events.iter().map(|e| e.date).max()?;
        Some((min, max))
    }
}
