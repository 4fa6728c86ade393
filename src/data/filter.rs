use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::FIXED_COUNTRIES;

use super::model::{MeatCategory, MergedRecord, MergedTable};

// ---------------------------------------------------------------------------
// Selection: which countries and which meat category are on screen
// ---------------------------------------------------------------------------

/// The user's filter choices, passed to the core as plain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub countries: BTreeSet<String>,
    pub meat: MeatCategory,
}

impl Default for Selection {
    /// The four reference countries and the first category.
    fn default() -> Self {
        Self {
            countries: FIXED_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            meat: MeatCategory::default(),
        }
    }
}

impl Selection {
    pub fn new<I, S>(countries: I, meat: MeatCategory) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            countries: countries.into_iter().map(Into::into).collect(),
            meat,
        }
    }

    /// Default selection, keeping only countries the table actually has.
    pub fn default_for(table: &MergedTable) -> Self {
        let mut selection = Self::default();
        selection
            .countries
            .retain(|c| table.countries.binary_search(c).is_ok());
        selection
    }
}

// ---------------------------------------------------------------------------
// FilteredView
// ---------------------------------------------------------------------------

/// The merged rows whose country is selected, in table order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    pub records: Vec<&'a MergedRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn new(table: &'a MergedTable, countries: &BTreeSet<String>) -> Self {
        Self {
            records: table
                .records
                .iter()
                .filter(|r| countries.contains(&r.country))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows of one country, sorted by year.
    pub fn country_rows(&self, country: &str) -> Vec<&'a MergedRecord> {
        let mut rows: Vec<&MergedRecord> = self
            .records
            .iter()
            .copied()
            .filter(|r| r.country == country)
            .collect();
        rows.sort_by_key(|r| r.year);
        rows
    }

    /// Rows of a single year, in table order.
    pub fn year_rows(&self, year: i32) -> Vec<&'a MergedRecord> {
        self.records.iter().copied().filter(|r| r.year == year).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MergedTable {
        let rec = |c: &str, y| MergedRecord {
            country: c.into(),
            year: y,
            quantities: [Some(1.0); 6],
            gdp_per_capita: Some(1000.0),
            total_meat_consumption: 6.0,
        };
        MergedTable::from_records(vec![
            rec("Germany", 2001),
            rec("India", 2000),
            rec("Germany", 2000),
            rec("Brazil", 2000),
        ])
    }

    #[test]
    fn view_contains_only_selected_countries() {
        let table = table();
        let selection = Selection::new(["Germany", "Nowhere"], MeatCategory::Beef);
        let view = FilteredView::new(&table, &selection.countries);

        assert_eq!(view.len(), 2);
        assert!(view.records.iter().all(|r| selection.countries.contains(&r.country)));
        assert!(view.records.iter().all(|r| table.records.contains(*r)));
    }

    #[test]
    fn empty_selection_gives_empty_view() {
        let table = table();
        let view = FilteredView::new(&table, &BTreeSet::new());
        assert!(view.is_empty());
    }

    #[test]
    fn country_rows_are_year_ordered() {
        let table = table();
        let view = FilteredView::new(&table, &Selection::new(["Germany"], MeatCategory::Pork).countries);
        let years: Vec<i32> = view.country_rows("Germany").iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2000, 2001]);
    }

    #[test]
    fn default_selection_drops_absent_countries() {
        let selection = Selection::default_for(&table());
        assert_eq!(selection.countries, BTreeSet::from(["Germany".to_string(), "India".to_string()]));
        assert_eq!(selection.meat, MeatCategory::Poultry);
    }
}
