use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::MeatCategory;
use crate::data::prepare;
use crate::narrative;
use crate::state::AppState;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // ---- Meat type ----
    ui.strong("Meat type");
    let mut meat = state.selection.meat;
    egui::ComboBox::from_id_salt("meat_type")
        .selected_text(meat.column_name())
        .show_ui(ui, |ui: &mut Ui| {
            for category in MeatCategory::ALL {
                ui.selectable_value(&mut meat, category, category.column_name());
            }
        });
    state.set_meat(meat);
    ui.separator();

    // ---- Countries ----
    let n_selected = state.selection.countries.len();
    let n_total = state.table.countries.len();
    ui.strong(format!("Countries  ({n_selected}/{n_total})"));

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
        if ui.small_button("Defaults").clicked() {
            state.select_defaults();
        }
    });
    ui.add(egui::TextEdit::singleline(&mut state.country_search).hint_text("Search…"));

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let mut toggled = None;
            for country in state.visible_countries() {
                let mut checked = state.selection.countries.contains(country);
                let text = RichText::new(country).color(state.color_map.color_for(country));
                if ui.checkbox(&mut checked, text).changed() {
                    toggled = Some(country.to_string());
                }
            }
            if let Some(country) = toggled {
                state.toggle_country(&country);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Reload data").clicked() {
                reload_data(state);
                ui.close_menu();
            }
            if ui.button("Export charts…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} merged rows, {} countries",
            state.table.len(),
            state.table.countries.len()
        ));
        if prepare::global_config().restrict_to_fixed_countries {
            ui.separator();
            ui.label("fixed four-country mode");
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

/// Drop the cached table and run the pipeline again. On failure the
/// previous table stays on screen.
pub fn reload_data(state: &mut AppState) {
    prepare::clear_cache();
    match prepare::prepare() {
        Ok(table) => {
            log::info!(
                "Reloaded {} rows for {} countries",
                table.len(),
                table.countries.len()
            );
            state.set_table(table);
            state.status_message = None;
        }
        Err(e) => {
            log::error!("Failed to reload data: {e}");
            state.status_message = Some(format!("Reload failed: {e}"));
        }
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export chart specifications")
        .add_filter("JSON", &["json"])
        .set_file_name("meatscope-charts.json")
        .save_file();

    if let Some(path) = file {
        match state.export_dashboard(&path) {
            Ok(()) => {
                log::info!("Exported charts to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export charts: {e:#}");
                state.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Central panel – the dashboard document
// ---------------------------------------------------------------------------

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(16.0);
    ui.heading(title);
    ui.add_space(4.0);
}

fn analysis(ui: &mut Ui, text: &str) {
    if text.is_empty() {
        return;
    }
    ui.add_space(4.0);
    ui.label(RichText::new("Analysis").strong());
    ui.label(text);
}

pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let dashboard = &state.dashboard;
    let colors = &state.color_map;
    let meat = dashboard.selection.meat;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(RichText::new(narrative::TITLE).size(24.0));
            ui.label(narrative::INTRODUCTION);
            ui.add_space(6.0);
            ui.label(narrative::EXPLORE_HINT);
            ui.separator();

            section(ui, &format!("{meat} Consumption Over Time"));
            plot::line_chart(ui, "category_trend", &dashboard.category_trend, colors);
            analysis(ui, &narrative::category_trend_analysis(meat));
            ui.add_space(4.0);
            for summary in &dashboard.trends {
                ui.label(format!("• {summary}"));
            }

            section(ui, "GDP per Capita Over Time");
            plot::line_chart(ui, "gdp_trend", &dashboard.gdp_trend, colors);
            analysis(ui, narrative::GDP_TREND_ANALYSIS);

            section(ui, "Comparison of GDP per Capita and Total Meat Consumption");
            plot::scatter_chart(ui, "gdp_vs_total", &dashboard.gdp_vs_total, colors);
            analysis(ui, narrative::SCATTER_ANALYSIS);

            section(ui, &format!("{meat} Consumption Comparison in 2020"));
            plot::bar_chart(ui, "snapshot", &dashboard.snapshot, colors);
            analysis(ui, &narrative::snapshot_analysis(meat));

            section(ui, "Correlation Heatmap of Meat Consumption and GDP");
            plot::heatmap(ui, &dashboard.heatmap);
            analysis(ui, narrative::HEATMAP_ANALYSIS);

            for chart in &dashboard.category_bars {
                section(ui, &format!("{} Consumption Across Countries (2020)", chart.category.title()));
                let id = format!("fixed_{:?}", chart.category);
                plot::bar_chart(ui, &id, chart, colors);
                analysis(ui, narrative::fixed_bar_analysis(chart.category));
            }

            section(ui, "Conclusion");
            ui.label(narrative::CONCLUSION);
        });
}
