use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::charts::{render, Dashboard};
use crate::color::ColorMap;
use crate::data::filter::Selection;
use crate::data::model::{MeatCategory, MergedTable};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Prepared dataset, shared with the process-wide cache.
    pub table: Arc<MergedTable>,

    /// Current filter choices.
    pub selection: Selection,

    /// Charts and narrative for `selection` (rebuilt on every change).
    pub dashboard: Dashboard,

    /// Colour per country.
    pub color_map: ColorMap,

    /// Text typed into the country search box.
    pub country_search: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(table: Arc<MergedTable>) -> Self {
        let selection = Selection::default_for(&table);
        let dashboard = render(&table, &selection);
        let color_map = ColorMap::new(&table.countries);
        Self {
            table,
            selection,
            dashboard,
            color_map,
            country_search: String::new(),
            status_message: None,
        }
    }

    /// Swap in a freshly prepared table, keeping the selected countries that
    /// still exist.
    pub fn set_table(&mut self, table: Arc<MergedTable>) {
        self.selection
            .countries
            .retain(|c| table.countries.binary_search(c).is_ok());
        self.color_map = ColorMap::new(&table.countries);
        self.table = table;
        self.rerender();
    }

    /// Recompute the dashboard after a selection change.
    pub fn rerender(&mut self) {
        self.dashboard = render(&self.table, &self.selection);
    }

    pub fn set_meat(&mut self, meat: MeatCategory) {
        if self.selection.meat != meat {
            self.selection.meat = meat;
            self.rerender();
        }
    }

    /// Toggle a single country in the selection.
    pub fn toggle_country(&mut self, country: &str) {
        if !self.selection.countries.remove(country) {
            self.selection.countries.insert(country.to_string());
        }
        self.rerender();
    }

    /// Select every country in the table.
    pub fn select_all(&mut self) {
        self.selection.countries = self.table.countries.iter().cloned().collect();
        self.rerender();
    }

    /// Deselect every country.
    pub fn select_none(&mut self) {
        self.selection.countries.clear();
        self.rerender();
    }

    /// Back to the four reference countries.
    pub fn select_defaults(&mut self) {
        self.selection.countries = Selection::default_for(&self.table).countries;
        self.rerender();
    }

    /// Countries matching the search box, case-insensitively.
    pub fn visible_countries(&self) -> Vec<&str> {
        let needle = self.country_search.trim().to_lowercase();
        self.table
            .countries
            .iter()
            .filter(|c| needle.is_empty() || c.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    /// Write the current dashboard as pretty JSON.
    pub fn export_dashboard(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.dashboard)
            .context("serializing dashboard")?;
        writer
            .flush()
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::MergedRecord;

    fn table(countries: &[&str]) -> Arc<MergedTable> {
        let records = countries
            .iter()
            .map(|c| MergedRecord {
                country: c.to_string(),
                year: 2020,
                quantities: [Some(1.0); 6],
                gdp_per_capita: Some(1000.0),
                total_meat_consumption: 6.0,
            })
            .collect();
        Arc::new(MergedTable::from_records(records))
    }

    #[test]
    fn starts_with_default_countries_present_in_data() {
        let state = AppState::new(table(&["Germany", "India", "Brazil"]));
        assert_eq!(state.selection.countries.len(), 2);
        assert_eq!(state.dashboard.snapshot.bars.len(), 2);
    }

    #[test]
    fn every_change_rerenders() {
        let mut state = AppState::new(table(&["Germany", "India", "Brazil"]));

        state.toggle_country("Brazil");
        assert_eq!(state.dashboard.snapshot.bars.len(), 3);

        state.set_meat(MeatCategory::Beef);
        assert_eq!(state.dashboard.selection.meat, MeatCategory::Beef);

        state.select_none();
        assert!(state.dashboard.category_trend.series.is_empty());

        state.select_all();
        assert_eq!(state.dashboard.category_trend.series.len(), 3);

        state.select_defaults();
        assert_eq!(state.dashboard.category_trend.series.len(), 2);
    }

    #[test]
    fn reload_drops_vanished_countries() {
        let mut state = AppState::new(table(&["Germany", "India"]));
        state.set_table(table(&["Germany"]));
        assert_eq!(state.selection.countries.len(), 1);
        assert_eq!(state.dashboard.trends.len(), 1);
    }

    #[test]
    fn search_is_case_insensitive() {
        let mut state = AppState::new(table(&["Germany", "India", "Indonesia"]));
        state.country_search = "  IND ".into();
        assert_eq!(state.visible_countries(), vec!["India", "Indonesia"]);
    }

    #[test]
    fn exports_dashboard_json() -> Result<()> {
        let state = AppState::new(table(&["Germany"]));
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("charts.json");
        state.export_dashboard(&path)?;

        let json: serde_json::Value = serde_json::from_reader(std::fs::File::open(&path)?)?;
        assert_eq!(json["selection"]["meat"], "Poultry");
        assert_eq!(json["snapshot"]["bars"][0]["country"], "Germany");
        assert_eq!(json["heatmap"]["labels"].as_array().map(Vec::len), Some(8));
        Ok(())
    }
}
