use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::Settings;
use crate::dashboard::{DashboardView, render};
use crate::data::filter::{AlertFilter, FilterCriteria};
use crate::data::model::EarthquakeCatalog;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded catalog, shared with the repository that owns it.
    pub catalog: Arc<EarthquakeCatalog>,

    pub settings: Settings,

    /// Current widget values.
    pub criteria: FilterCriteria,

    /// Output of the last pipeline run for `criteria`.
    pub view: DashboardView,

    /// One colour per continent, stable across filter changes.
    pub color_map: ColorMap,
}

impl AppState {
    /// Initial state: default threshold, every continent, any alert.
    pub fn new(catalog: Arc<EarthquakeCatalog>, settings: Settings) -> Self {
        let criteria = FilterCriteria::all_of(&catalog, settings.default_min_magnitude);
        let color_map = ColorMap::new(&catalog.continents);
        let view = render(&catalog, &criteria, &settings);
        AppState {
            catalog,
            settings,
            criteria,
            view,
            color_map,
        }
    }

    /// Recompute the view after a filter change.
    pub fn refresh(&mut self) {
        self.view = render(&self.catalog, &self.criteria, &self.settings);
    }

    pub fn set_min_magnitude(&mut self, value: f64) {
        self.criteria.min_magnitude = self.settings.clamp_magnitude(value);
        self.refresh();
    }

    /// Toggle a single continent in the selection.
    pub fn toggle_continent(&mut self, continent: &str) {
        if !self.criteria.continents.remove(continent) {
            self.criteria.continents.insert(continent.to_string());
        }
        self.refresh();
    }

    /// Select all continents.
    pub fn select_all(&mut self) {
        self.criteria.continents = self.catalog.continents.clone();
        self.refresh();
    }

    /// Deselect all continents.
    pub fn select_none(&mut self) {
        self.criteria.continents.clear();
        self.refresh();
    }

    pub fn set_alert(&mut self, alert: AlertFilter) {
        self.criteria.alert = alert;
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::AlertLevel;
    use crate::data::model::tests::event;

    fn state() -> AppState {
        let catalog = EarthquakeCatalog::from_events(vec![
            event(4.4, "Asia", Some(AlertLevel::Green)),
            event(5.6, "Europe", Some(AlertLevel::Red)),
            event(6.2, "Asia", Some(AlertLevel::Red)),
        ]);
        AppState::new(Arc::new(catalog), Settings::default())
    }

    fn count(state: &AppState) -> usize {
        state.view.charts().map_or(0, |c| c.kpis.event_count)
    }

    #[test]
    fn starts_with_everything_visible() {
        let s = state();
        assert_eq!(s.criteria.min_magnitude, 4.0);
        assert_eq!(s.criteria.continents.len(), 2);
        assert_eq!(s.criteria.alert, AlertFilter::All);
        assert_eq!(count(&s), 3);
    }

    #[test]
    fn every_widget_change_recomputes_the_view() {
        let mut s = state();

        s.set_min_magnitude(5.0);
        assert_eq!(count(&s), 2);

        s.toggle_continent("Europe");
        assert_eq!(count(&s), 1);
        s.toggle_continent("Europe");
        assert_eq!(count(&s), 2);

        s.set_alert(AlertFilter::Level(AlertLevel::Green));
        assert_eq!(s.view, DashboardView::NoData);

        s.set_alert(AlertFilter::All);
        s.select_none();
        assert_eq!(s.view, DashboardView::NoData);
        s.select_all();
        assert_eq!(count(&s), 2);
    }

    #[test]
    fn slider_values_are_clamped() {
        let mut s = state();
        s.set_min_magnitude(12.0);
        assert_eq!(s.criteria.min_magnitude, 7.0);
        assert_eq!(s.view, DashboardView::NoData);
    }
}
