use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::AlertFilter;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Minimum magnitude ----
            ui.strong("Min Magnitude");
            let [lo, hi] = state.settings.magnitude_bounds;
            let mut min_mag = state.criteria.min_magnitude;
            if ui
                .add(egui::Slider::new(&mut min_mag, lo..=hi).step_by(0.1))
                .changed()
            {
                state.set_min_magnitude(min_mag);
            }
            ui.separator();

            // ---- Alert level ----
            ui.strong("Alert level");
            let current = state.criteria.alert;
            egui::ComboBox::from_id_salt("alert_level")
                .selected_text(current.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for choice in AlertFilter::choices() {
                        if ui
                            .selectable_label(current == choice, choice.to_string())
                            .clicked()
                        {
                            state.set_alert(choice);
                        }
                    }
                });
            ui.separator();

            // ---- Continents ----
            let n_selected = state.criteria.continents.len();
            let n_total = state.catalog.continents.len();
            let header_text = format!("Continent  ({n_selected}/{n_total})");

            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("continents")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_none();
                        }
                    });

                    // Clone so the state can be mutated inside the loop.
                    let continents = state.catalog.continents.clone();
                    for continent in &continents {
                        let mut checked = state.criteria.continents.contains(continent);
                        let text = RichText::new(continent)
                            .color(state.color_map.color_for(continent));
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_continent(continent);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar – KPIs
// ---------------------------------------------------------------------------

/// Render the KPI strip, or the no-data notice.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Earthquake Magnitude and Frequency: Global Patterns");
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("{} events loaded", state.catalog.len()));
        ui.separator();

        match state.view.charts() {
            Some(charts) => {
                let kpis = &charts.kpis;
                kpi(ui, "Earthquakes", kpis.event_count.to_string());
                ui.separator();
                kpi(ui, "Avg magnitude", kpis.mean_magnitude_label());
                ui.separator();
                kpi(
                    ui,
                    &format!("M ≥ {:.1}", state.settings.strong_threshold),
                    kpis.strong_count.to_string(),
                );
            }
            None => {
                ui.label(RichText::new("No data matches the current filters.").color(Color32::RED));
            }
        }
    });
}

fn kpi(ui: &mut Ui, label: &str, value: String) {
    ui.label(label);
    ui.label(RichText::new(value).strong().size(18.0));
}
