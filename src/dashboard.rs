//! One synchronous pass from filter widgets to everything the window draws.
//!
//! ```text
//!  EarthquakeCatalog ─► filter::apply ─► Vec<Event> ─┬─► KPIs, map, bar, line, heatmap
//!                                                    └─► analysis ─► frequency panel
//! ```
//!
//! Nothing here knows about egui, so the whole pipeline is testable headless.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::analysis::{self, AnalysisError, FitResult, FrequencyBin};
use crate::config::Settings;
use crate::data::filter::{FilterCriteria, apply};
use crate::data::model::{AlertLevel, EarthquakeCatalog, Event};

// ---------------------------------------------------------------------------
// View-model
// ---------------------------------------------------------------------------

/// Headline numbers above the charts.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub event_count: usize,
    pub mean_magnitude: f64,
    /// Events at or above the strong threshold.
    pub strong_count: usize,
}

impl Kpis {
    pub fn mean_magnitude_label(&self) -> String {
        format!("{:.2}", self.mean_magnitude)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub magnitude: f64,
    pub continent: String,
}

/// Event counts on a continent × year grid. `counts[row][col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub continents: Vec<String>,
    pub years: Vec<i32>,
    pub counts: Vec<Vec<usize>>,
}

impl Heatmap {
    pub fn max_count(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// The magnitude-frequency chart: every bin, and either a line or the reason
/// there is none.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyPanel {
    pub bins: Vec<FrequencyBin>,
    pub fit: Result<FitResult, AnalysisError>,
}

/// A row in the strongest-events table.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub place: String,
    pub magnitude: f64,
    pub date: NaiveDateTime,
    pub continent: String,
    pub alert: Option<AlertLevel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Charts {
    pub kpis: Kpis,
    pub map: Vec<MapPoint>,
    /// Mean magnitude per continent, sorted by continent.
    pub continent_means: Vec<(String, f64)>,
    /// Event count per calendar month (first day of month), chronological.
    pub monthly_counts: Vec<(NaiveDate, usize)>,
    pub heatmap: Heatmap,
    pub frequency: Result<FrequencyPanel, AnalysisError>,
    pub strongest: Vec<EventRow>,
}

/// Everything the window needs for one filter state.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    /// The filters exclude every event.
    NoData,
    Populated(Box<Charts>),
}

impl DashboardView {
    pub fn charts(&self) -> Option<&Charts> {
        match self {
            DashboardView::NoData => None,
            DashboardView::Populated(charts) => Some(charts),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Filter the catalog and derive every chart from the surviving events.
pub fn render(
    catalog: &EarthquakeCatalog,
    criteria: &FilterCriteria,
    settings: &Settings,
) -> DashboardView {
    let events = apply(&catalog.events, criteria);
    log::debug!(
        "Filter min={:.1} continents={} alert={} kept {}/{} events",
        criteria.min_magnitude,
        criteria.continents.len(),
        criteria.alert,
        events.len(),
        catalog.len()
    );
    if events.is_empty() {
        return DashboardView::NoData;
    }

    DashboardView::Populated(Box::new(Charts {
        kpis: kpis(&events, settings.strong_threshold),
        map: map_points(&events),
        continent_means: continent_means(&events),
        monthly_counts: monthly_counts(&events),
        heatmap: heatmap(&events),
        frequency: frequency_panel(&events, settings),
        strongest: strongest(&events, settings.strongest_events),
    }))
}

fn kpis(events: &[Event], strong_threshold: f64) -> Kpis {
    let total: f64 = events.iter().map(|e| e.magnitude).sum();
    Kpis {
        event_count: events.len(),
        mean_magnitude: total / events.len() as f64,
        strong_count: events.iter().filter(|e| e.magnitude >= strong_threshold).count(),
    }
}

fn map_points(events: &[Event]) -> Vec<MapPoint> {
    events
        .iter()
        .map(|e| MapPoint {
            longitude: e.longitude,
            latitude: e.latitude,
            magnitude: e.magnitude,
            continent: e.continent.clone(),
        })
        .collect()
}

fn continent_means(events: &[Event]) -> Vec<(String, f64)> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for e in events {
        let entry = sums.entry(e.continent.as_str()).or_default();
        entry.0 += e.magnitude;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(continent, (sum, n))| (continent.to_string(), sum / n as f64))
        .collect()
}

fn month_start(date: &NaiveDateTime) -> NaiveDate {
    date.date().with_day(1).unwrap_or(date.date())
}

fn monthly_counts(events: &[Event]) -> Vec<(NaiveDate, usize)> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for e in events {
        *counts.entry(month_start(&e.date)).or_default() += 1;
    }
    counts.into_iter().collect()
}

fn heatmap(events: &[Event]) -> Heatmap {
    let mut cells: BTreeMap<(&str, i32), usize> = BTreeMap::new();
    for e in events {
        *cells.entry((e.continent.as_str(), e.date.year())).or_default() += 1;
    }

    let mut continents: Vec<String> = cells.keys().map(|(c, _)| c.to_string()).collect();
    continents.dedup();
    let mut years: Vec<i32> = cells.keys().map(|(_, y)| *y).collect();
    years.sort_unstable();
    years.dedup();

    let counts = continents
        .iter()
        .map(|c| {
            years
                .iter()
                .map(|y| cells.get(&(c.as_str(), *y)).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    Heatmap {
        continents,
        years,
        counts,
    }
}

fn frequency_panel(events: &[Event], settings: &Settings) -> Result<FrequencyPanel, AnalysisError> {
    let magnitudes: Vec<f64> = events.iter().map(|e| e.magnitude).collect();
    match analysis::analyze(&magnitudes, settings.bin_spec()) {
        Ok(result) => {
            log::debug!(
                "b-value {:.3} from {} bins",
                result.fit.b_value(),
                result.fit.bins_used
            );
            Ok(FrequencyPanel {
                bins: result.bins,
                fit: Ok(result.fit),
            })
        }
        // Too few populated bins for a line; the bins themselves still plot.
        Err(e @ AnalysisError::InsufficientBins { .. }) => {
            log::warn!("No magnitude-frequency fit: {e}");
            Ok(FrequencyPanel {
                bins: analysis::histogram(&magnitudes, settings.bin_spec())?,
                fit: Err(e),
            })
        }
        Err(e) => {
            log::warn!("Magnitude-frequency analysis failed: {e}");
            Err(e)
        }
    }
}

fn strongest(events: &[Event], limit: usize) -> Vec<EventRow> {
    let mut sorted: Vec<&Event> = events.iter().collect();
    sorted.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude).then(a.date.cmp(&b.date)));
    sorted
        .into_iter()
        .take(limit)
        .map(|e| EventRow {
            place: e.place.clone(),
            magnitude: e.magnitude,
            date: e.date,
            continent: e.continent.clone(),
            alert: e.alert,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::AlertFilter;
    use crate::data::model::tests::{event, event_on};

    fn catalog() -> EarthquakeCatalog {
        EarthquakeCatalog::from_events(vec![
            event_on(4.1, "Asia", Some(AlertLevel::Green), 2020, 1, 5),
            event_on(4.2, "Asia", None, 2020, 1, 20),
            event_on(4.6, "Europe", None, 2020, 3, 2),
            event_on(5.1, "Europe", Some(AlertLevel::Yellow), 2021, 3, 9),
            event_on(5.2, "Asia", None, 2021, 6, 30),
            event_on(6.0, "Oceania", Some(AlertLevel::Red), 2021, 6, 1),
        ])
    }

    fn charts(view: &DashboardView) -> &Charts {
        view.charts().expect("expected populated view")
    }

    #[test]
    fn all_filters_open_produces_every_chart() {
        let catalog = catalog();
        let criteria = FilterCriteria::all_of(&catalog, 4.0);
        let view = render(&catalog, &criteria, &Settings::default());
        let c = charts(&view);

        assert_eq!(c.kpis.event_count, 6);
        assert_eq!(c.kpis.mean_magnitude_label(), "4.87");
        assert_eq!(c.kpis.strong_count, 1);
        assert_eq!(c.map.len(), 6);

        assert_eq!(c.continent_means.len(), 3);
        assert_eq!(c.continent_means[0].0, "Asia");
        assert!((c.continent_means[0].1 - 4.5).abs() < 1e-9);
        assert_eq!(c.continent_means[2], ("Oceania".to_string(), 6.0));

        let months: Vec<(String, usize)> = c
            .monthly_counts
            .iter()
            .map(|(d, n)| (d.to_string(), *n))
            .collect();
        assert_eq!(
            months,
            vec![
                ("2020-01-01".to_string(), 2),
                ("2020-03-01".to_string(), 1),
                ("2021-03-01".to_string(), 1),
                ("2021-06-01".to_string(), 2),
            ]
        );

        assert_eq!(c.heatmap.continents, ["Asia", "Europe", "Oceania"]);
        assert_eq!(c.heatmap.years, [2020, 2021]);
        assert_eq!(c.heatmap.counts, vec![vec![2, 1], vec![1, 1], vec![0, 1]]);
        assert_eq!(c.heatmap.max_count(), 2);

        let freq = c.frequency.as_ref().unwrap();
        let counts: Vec<usize> = freq.bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 1, 2, 0, 1]);
        assert_eq!(freq.fit.as_ref().unwrap().bins_used, 4);

        assert_eq!(c.strongest[0].magnitude, 6.0);
        assert_eq!(c.strongest[0].alert, Some(AlertLevel::Red));
    }

    #[test]
    fn impossible_threshold_is_no_data_not_a_panic() {
        let catalog = catalog();
        let criteria = FilterCriteria::all_of(&catalog, 7.5);
        assert_eq!(render(&catalog, &criteria, &Settings::default()), DashboardView::NoData);
    }

    #[test]
    fn empty_continent_selection_is_no_data() {
        let catalog = catalog();
        let mut criteria = FilterCriteria::all_of(&catalog, 4.0);
        criteria.continents.clear();
        assert!(render(&catalog, &criteria, &Settings::default()).charts().is_none());
    }

    #[test]
    fn single_bin_keeps_bins_and_explains_missing_fit() {
        let catalog = catalog();
        let mut criteria = FilterCriteria::all_of(&catalog, 4.0);
        criteria.alert = AlertFilter::Level(AlertLevel::Green);

        let view = render(&catalog, &criteria, &Settings::default());
        let freq = charts(&view).frequency.as_ref().unwrap();
        assert_eq!(freq.bins.len(), 1);
        assert_eq!(freq.fit, Err(AnalysisError::InsufficientBins { found: 1 }));
    }

    #[test]
    fn strong_threshold_and_table_size_follow_settings() {
        let catalog = catalog();
        let criteria = FilterCriteria::all_of(&catalog, 4.0);
        let settings = Settings {
            strong_threshold: 5.0,
            strongest_events: 2,
            ..Settings::default()
        };
        let view = render(&catalog, &criteria, &settings);
        let c = charts(&view);
        assert_eq!(c.kpis.strong_count, 3);
        let mags: Vec<f64> = c.strongest.iter().map(|r| r.magnitude).collect();
        assert_eq!(mags, vec![6.0, 5.2]);
    }

    #[test]
    fn data_below_bin_origin_reports_analysis_error() {
        let catalog = EarthquakeCatalog::from_events(vec![
            event(3.5, "Asia", None),
            event(4.5, "Asia", None),
        ]);
        let criteria = FilterCriteria::all_of(&catalog, 0.0);
        let view = render(&catalog, &criteria, &Settings::default());
        assert!(matches!(
            charts(&view).frequency,
            Err(AnalysisError::BelowOrigin { .. })
        ));
    }
}
