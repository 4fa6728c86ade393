use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::charts::{self, Heatmap, LineChart, ScatterChart};
use crate::color::{diverging, label_on, ColorMap};

const PLOT_HEIGHT: f32 = 280.0;

fn base_plot<'a>(id: &'a str, x_label: &'a str, y_label: &'a str) -> Plot<'a> {
    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
}

fn empty_hint(ui: &mut Ui, empty: bool) {
    if empty {
        ui.weak("No data for the current selection.");
    }
}

// ---------------------------------------------------------------------------
// Line chart: one line per country, broken where the value is missing
// ---------------------------------------------------------------------------

pub fn line_chart(ui: &mut Ui, id: &str, chart: &LineChart, colors: &ColorMap) {
    ui.strong(&chart.title);
    empty_hint(ui, chart.series.is_empty());

    base_plot(id, &chart.x_label, &chart.y_label).show(ui, |plot_ui| {
        for series in &chart.series {
            let color = colors.color_for(&series.country);
            for segment in series.segments() {
                // Markers keep isolated single-year segments visible.
                plot_ui.points(
                    Points::new(PlotPoints::from(segment.clone()))
                        .name(&series.country)
                        .color(color)
                        .radius(2.0),
                );
                plot_ui.line(
                    Line::new(PlotPoints::from(segment))
                        .name(&series.country)
                        .color(color)
                        .width(1.5),
                );
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Scatter with OLS trendline
// ---------------------------------------------------------------------------

pub fn scatter_chart(ui: &mut Ui, id: &str, chart: &ScatterChart, colors: &ColorMap) {
    ui.strong(&chart.title);
    empty_hint(ui, chart.series.is_empty());

    base_plot(id, &chart.x_label, &chart.y_label).show(ui, |plot_ui| {
        for series in &chart.series {
            plot_ui.points(
                Points::new(PlotPoints::from(series.points.clone()))
                    .name(&series.country)
                    .color(colors.color_for(&series.country))
                    .radius(3.0),
            );
        }
        if let Some(trend) = &chart.trendline {
            plot_ui.line(
                Line::new(PlotPoints::from(trend.endpoints().to_vec()))
                    .name("OLS trend")
                    .color(Color32::DARK_GRAY)
                    .width(2.0),
            );
        }
    });
}

// ---------------------------------------------------------------------------
// Bar chart: one bar per country, countries on the x axis
// ---------------------------------------------------------------------------

pub fn bar_chart(ui: &mut Ui, id: &str, chart: &charts::BarChart, colors: &ColorMap) {
    ui.strong(&chart.title);
    empty_hint(ui, chart.bars.is_empty());

    let names: Vec<String> = chart.bars.iter().map(|b| b.country.clone()).collect();
    let x_formatter = move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        names.get(idx as usize).cloned().unwrap_or_default()
    };

    base_plot(id, &chart.x_label, &chart.y_label)
        .x_axis_formatter(x_formatter)
        .show(ui, |plot_ui| {
            for (i, bar) in chart.bars.iter().enumerate() {
                let color = colors.color_for(&bar.country);
                plot_ui.bar_chart(
                    BarChart::new(vec![Bar::new(i as f64, bar.value)
                        .name(&bar.country)
                        .fill(color)
                        .width(0.6)])
                    .name(&bar.country)
                    .color(color),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap: annotated lower triangle
// ---------------------------------------------------------------------------

pub fn heatmap(ui: &mut Ui, heatmap: &Heatmap) {
    ui.strong(&heatmap.title);
    let n = heatmap.labels.len();

    TableBuilder::new(ui)
        .striped(false)
        .vscroll(false)
        .cell_layout(egui::Layout::centered_and_justified(egui::Direction::LeftToRight))
        .column(Column::exact(170.0))
        .columns(Column::exact(86.0), n)
        .header(40.0, |mut header| {
            header.col(|_ui| {});
            for label in &heatmap.labels {
                header.col(|ui| {
                    ui.label(RichText::new(label).small().strong());
                });
            }
        })
        .body(|mut body| {
            for (row, label) in heatmap.labels.iter().enumerate() {
                body.row(28.0, |mut table_row| {
                    table_row.col(|ui| {
                        ui.label(RichText::new(label).strong());
                    });
                    for col in 0..n {
                        table_row.col(|ui| {
                            if let Some(v) = heatmap.visible(row, col) {
                                ui.painter().rect_filled(ui.max_rect(), 0.0, diverging(v));
                                ui.label(RichText::new(format!("{v:.2}")).color(label_on(v)));
                            }
                        });
                    }
                });
            }
        });
}
