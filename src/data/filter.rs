use std::collections::BTreeSet;
use std::fmt;

use super::model::{AlertLevel, EarthquakeCatalog, Event};

// ---------------------------------------------------------------------------
// Alert selector
// ---------------------------------------------------------------------------

/// The alert-level widget: either no constraint or one exact level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertFilter {
    #[default]
    All,
    Level(AlertLevel),
}

impl AlertFilter {
    /// Choices in the order the widget lists them.
    pub fn choices() -> impl Iterator<Item = AlertFilter> {
        std::iter::once(AlertFilter::All).chain(AlertLevel::ALL.into_iter().map(AlertFilter::Level))
    }

    /// An event with no alert only passes `All`.
    pub fn accepts(&self, alert: Option<AlertLevel>) -> bool {
        match self {
            AlertFilter::All => true,
            AlertFilter::Level(level) => alert == Some(*level),
        }
    }
}

impl fmt::Display for AlertFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertFilter::All => f.write_str("All"),
            AlertFilter::Level(level) => write!(f, "{level}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// One snapshot of the filter widgets.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    /// Inclusive lower bound on magnitude.
    pub min_magnitude: f64,
    /// Accepted continents. Empty means nothing passes.
    pub continents: BTreeSet<String>,
    pub alert: AlertFilter,
}

impl FilterCriteria {
    /// Initial widget state: the given threshold, every continent, any alert.
    pub fn all_of(catalog: &EarthquakeCatalog, min_magnitude: f64) -> Self {
        FilterCriteria {
            min_magnitude,
            continents: catalog.continents.clone(),
            alert: AlertFilter::All,
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        event.magnitude >= self.min_magnitude
            && self.continents.contains(&event.continent)
            && self.alert.accepts(event.alert)
    }
}

/// Return a fresh copy of the events passing `criteria`, in input order.
pub fn apply(events: &[Event], criteria: &FilterCriteria) -> Vec<Event> {
    events
        .iter()
        .filter(|event| criteria.matches(event))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::event;

    fn sample() -> Vec<Event> {
        vec![
            event(4.0, "Asia", Some(AlertLevel::Green)),
            event(4.7, "Europe", None),
            event(5.9, "Asia", Some(AlertLevel::Red)),
            event(6.3, "Africa", Some(AlertLevel::Red)),
            event(7.0, "Europe", Some(AlertLevel::Yellow)),
        ]
    }

    fn criteria(min: f64, continents: &[&str], alert: AlertFilter) -> FilterCriteria {
        FilterCriteria {
            min_magnitude: min,
            continents: continents.iter().map(|c| c.to_string()).collect(),
            alert,
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let events = sample();
        for min in [4.0, 4.5, 5.9, 6.3, 7.0] {
            let all = criteria(min, &["Asia", "Europe", "Africa"], AlertFilter::All);
            let out = apply(&events, &all);
            assert!(out.iter().all(|e| e.magnitude >= min));
            assert_eq!(out.len(), events.iter().filter(|e| e.magnitude >= min).count());
        }
    }

    #[test]
    fn continents_restrict_membership() {
        let out = apply(&sample(), &criteria(4.0, &["Europe"], AlertFilter::All));
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|e| e.continent == "Europe"));
    }

    #[test]
    fn empty_continent_set_yields_nothing() {
        assert!(apply(&sample(), &criteria(4.0, &[], AlertFilter::All)).is_empty());
    }

    #[test]
    fn threshold_above_max_yields_nothing() {
        let out = apply(&sample(), &criteria(7.5, &["Asia", "Europe", "Africa"], AlertFilter::All));
        assert!(out.is_empty());
    }

    #[test]
    fn red_alert_excludes_missing_and_other_levels() {
        let out = apply(
            &sample(),
            &criteria(4.0, &["Asia", "Europe", "Africa"], AlertFilter::Level(AlertLevel::Red)),
        );
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|e| e.alert == Some(AlertLevel::Red)));
    }

    #[test]
    fn filtering_is_idempotent_and_leaves_input_untouched() {
        let events = sample();
        let before = events.clone();
        let c = criteria(4.5, &["Asia", "Europe"], AlertFilter::All);

        let once = apply(&events, &c);
        let twice = apply(&once, &c);
        assert_eq!(once, twice);
        assert_eq!(events, before);
    }

    #[test]
    fn all_of_selects_every_continent() {
        let catalog = EarthquakeCatalog::from_events(sample());
        let c = FilterCriteria::all_of(&catalog, 4.0);
        assert_eq!(c.continents.len(), 3);
        assert_eq!(apply(&catalog.events, &c).len(), catalog.len());
    }

    #[test]
    fn alert_choices_and_labels() {
        let labels: Vec<String> = AlertFilter::choices().map(|c| c.to_string()).collect();
        assert_eq!(labels, ["All", "green", "yellow", "orange", "red"]);
    }
}
