use chrono::Datelike;
use eframe::egui::{self, Align2, Color32, FontId, RichText, ScrollArea, Sense, Ui, Vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, MarkerShape, Plot, PlotPoints, Points};

use crate::color::{alert_color, heat_color};
use crate::dashboard::{Charts, EventRow, FrequencyPanel, Heatmap, MapPoint};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render every chart for the current view, or the no-data notice.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(charts) = state.view.charts() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data matches filters");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            section(ui, "Earthquake Locations and Magnitudes");
            location_map(ui, &charts.map, state);

            section(ui, "Average Magnitude by Continent");
            continent_bars(ui, charts, state);

            section(ui, "Earthquakes per Month");
            monthly_line(ui, charts);

            section(ui, "Earthquakes by Continent and Year");
            heatmap(ui, &charts.heatmap);

            section(ui, "Magnitude–Frequency (Gutenberg–Richter)");
            match &charts.frequency {
                Ok(panel) => frequency_plot(ui, panel),
                Err(e) => {
                    let message = format!("Cannot bin magnitudes: {e}");
                    ui.label(RichText::new(message).color(Color32::RED));
                }
            }

            section(ui, "Strongest Events");
            strongest_table(ui, &charts.strongest);
        });
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(8.0);
    ui.strong(title);
}

// ---------------------------------------------------------------------------
// Map – longitude / latitude scatter sized by magnitude
// ---------------------------------------------------------------------------

fn location_map(ui: &mut Ui, points: &[MapPoint], state: &AppState) {
    Plot::new("location_map")
        .height(CHART_HEIGHT * 1.4)
        .legend(Legend::default())
        .data_aspect(1.0)
        .include_x(-180.0)
        .include_x(180.0)
        .include_y(-90.0)
        .include_y(90.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .show(ui, |plot_ui| {
            for p in points {
                // Radius grows with magnitude above the slider floor.
                let above_floor = (p.magnitude - state.settings.magnitude_bounds[0]).max(0.0);
                let radius = 1.5 + above_floor as f32 * 2.0;
                plot_ui.points(
                    Points::new(vec![[p.longitude, p.latitude]])
                        .name(&p.continent)
                        .color(state.color_map.color_for(&p.continent).gamma_multiply(0.7))
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(radius),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Bar – mean magnitude per continent
// ---------------------------------------------------------------------------

fn continent_bars(ui: &mut Ui, charts: &Charts, state: &AppState) {
    let labels: Vec<String> = charts.continent_means.iter().map(|(c, _)| c.clone()).collect();
    let bars: Vec<Bar> = charts
        .continent_means
        .iter()
        .enumerate()
        .map(|(i, (continent, mean))| {
            Bar::new(i as f64, *mean)
                .name(continent)
                .fill(state.color_map.color_for(continent))
                .width(0.6)
        })
        .collect();

    Plot::new("continent_bars")
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_scroll(false)
        .y_axis_label("Magnitude")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Average magnitude"));
        });
}

// ---------------------------------------------------------------------------
// Line – events per month
// ---------------------------------------------------------------------------

fn monthly_line(ui: &mut Ui, charts: &Charts) {
    let points: PlotPoints = charts
        .monthly_counts
        .iter()
        .map(|(month, n)| [month.year() as f64 + month.month0() as f64 / 12.0, *n as f64])
        .collect();

    Plot::new("monthly_line")
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Events")
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).name("Events").width(1.5));
        });
}

// ---------------------------------------------------------------------------
// Heatmap – continent × year, painted as cells
// ---------------------------------------------------------------------------

fn heatmap(ui: &mut Ui, grid: &Heatmap) {
    let label_width = 120.0;
    let header_height = 18.0;
    let row_height = 24.0;
    let cols = grid.years.len().max(1) as f32;
    let cell_width = ((ui.available_width() - label_width) / cols).clamp(24.0, 80.0);

    let size = Vec2::new(
        label_width + cell_width * cols,
        header_height + row_height * grid.continents.len() as f32,
    );
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();
    let font = FontId::proportional(11.0);
    let max = grid.max_count().max(1) as f32;

    for (col, year) in grid.years.iter().enumerate() {
        let x = rect.left() + label_width + cell_width * (col as f32 + 0.5);
        painter.text(
            egui::pos2(x, rect.top() + header_height / 2.0),
            Align2::CENTER_CENTER,
            year.to_string(),
            font.clone(),
            text_color,
        );
    }

    for (row, continent) in grid.continents.iter().enumerate() {
        let top = rect.top() + header_height + row_height * row as f32;
        painter.text(
            egui::pos2(rect.left() + 4.0, top + row_height / 2.0),
            Align2::LEFT_CENTER,
            continent,
            font.clone(),
            text_color,
        );
        for (col, &count) in grid.counts[row].iter().enumerate() {
            let min = egui::pos2(rect.left() + label_width + cell_width * col as f32, top);
            let cell =
                egui::Rect::from_min_size(min, Vec2::new(cell_width, row_height)).shrink(1.0);
            painter.rect_filled(cell, 2.0, heat_color(count as f32 / max));
            if count > 0 {
                painter.text(
                    cell.center(),
                    Align2::CENTER_CENTER,
                    count.to_string(),
                    font.clone(),
                    Color32::BLACK,
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Gutenberg–Richter – every bin as a point, fit line over non-empty bins
// ---------------------------------------------------------------------------

fn frequency_plot(ui: &mut Ui, panel: &FrequencyPanel) {
    match &panel.fit {
        Ok(fit) => {
            ui.label(format!(
                "b-value: {:.2}   (log N = {:.2} {:+.2} M, {} bins)",
                fit.b_value(),
                fit.intercept,
                fit.slope,
                fit.bins_used
            ));
        }
        Err(e) => {
            ui.label(RichText::new(format!("No fit: {e}")).color(Color32::DARK_RED));
        }
    }

    let bins: PlotPoints = panel.bins.iter().map(|b| [b.midpoint, b.log_frequency]).collect();
    let fit_line = panel.fit.as_ref().ok().and_then(|fit| {
        let first = panel.bins.first()?.midpoint;
        let last = panel.bins.last()?.midpoint;
        let ends = vec![[first, fit.predict(first)], [last, fit.predict(last)]];
        Some(Line::new(PlotPoints::from(ends)))
    });

    Plot::new("frequency_plot")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Magnitude")
        .y_axis_label("log10(N + 1)")
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(bins)
                    .name("Binned frequency")
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(4.0),
            );
            if let Some(line) = fit_line {
                plot_ui.line(line.name("Least-squares fit").color(Color32::RED).width(2.0));
            }
        });
}

// ---------------------------------------------------------------------------
// Strongest events table
// ---------------------------------------------------------------------------

fn strongest_table(ui: &mut Ui, rows: &[EventRow]) {
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::exact(60.0))
        .column(Column::exact(150.0))
        .column(Column::exact(110.0))
        .column(Column::exact(70.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["Mag", "Date", "Continent", "Alert", "Place"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for r in rows {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(format!("{:.1}", r.magnitude));
                    });
                    row.col(|ui| {
                        ui.label(r.date.format("%Y-%m-%d %H:%M").to_string());
                    });
                    row.col(|ui| {
                        ui.label(&r.continent);
                    });
                    row.col(|ui| {
                        let text = r.alert.map_or("–".to_string(), |a| a.to_string());
                        ui.label(RichText::new(text).color(alert_color(r.alert)));
                    });
                    row.col(|ui| {
                        ui.label(&r.place);
                    });
                });
            }
        });
}
