//! Narrative text: the static document around the charts and the
//! per-country trend sentences derived from the current selection.

use std::fmt;

use serde::Serialize;

use crate::data::filter::{FilteredView, Selection};
use crate::data::model::MeatCategory;

// ---------------------------------------------------------------------------
// Trend sentences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increased,
    Decreased,
}

impl Direction {
    /// Strict comparison: an unchanged value reads as "decreased".
    pub fn between(first: f64, last: f64) -> Self {
        if last > first {
            Direction::Increased
        } else {
            Direction::Decreased
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Increased => "increased",
            Direction::Decreased => "decreased",
        })
    }
}

/// One line of the trend narrative.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrendSummary {
    NoSelection,
    NoData {
        country: String,
        meat: MeatCategory,
    },
    Trend {
        country: String,
        meat: MeatCategory,
        direction: Direction,
        first_year: i32,
        first: f64,
        last_year: i32,
        last: f64,
    },
}

impl fmt::Display for TrendSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendSummary::NoSelection => write!(f, "No countries selected."),
            TrendSummary::NoData { country, meat } => {
                write!(f, "No available data for {meat} consumption in {country}.")
            }
            TrendSummary::Trend {
                country,
                meat,
                direction,
                first_year,
                first,
                last_year,
                last,
            } => write!(
                f,
                "{meat} consumption in {country} {direction} from {first:.2} kg per capita \
                 in {first_year} to {last:.2} kg per capita in {last_year}."
            ),
        }
    }
}

/// One summary per selected country, in name order. Compares the earliest
/// and latest non-null observations of the selected meat in `view`.
pub fn trend_summaries(view: &FilteredView<'_>, selection: &Selection) -> Vec<TrendSummary> {
    if selection.countries.is_empty() {
        return vec![TrendSummary::NoSelection];
    }

    let meat = selection.meat;
    selection
        .countries
        .iter()
        .map(|country| {
            let observed: Vec<(i32, f64)> = view
                .country_rows(country)
                .into_iter()
                .filter_map(|r| Some((r.year, r.quantity(meat)?)))
                .collect();

            match (observed.first(), observed.last()) {
                (Some(&(first_year, first)), Some(&(last_year, last))) => TrendSummary::Trend {
                    country: country.clone(),
                    meat,
                    direction: Direction::between(first, last),
                    first_year,
                    first,
                    last_year,
                    last,
                },
                _ => TrendSummary::NoData {
                    country: country.clone(),
                    meat,
                },
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Static document text
// ---------------------------------------------------------------------------

pub const TITLE: &str = "The Relationship Between Economic Growth and Meat Consumption";

pub const INTRODUCTION: &str = "This dashboard explores how economic growth, measured as GDP \
per capita, relates to meat consumption across countries, with a focus on the contrast between \
developed and developing nations. Economic prosperity shapes diets, and so do culture, \
environment and religion.";

pub const EXPLORE_HINT: &str = "Select countries and a meat type to see how consumption and GDP \
have changed over time.";

pub fn category_trend_analysis(meat: MeatCategory) -> String {
    format!(
        "The line chart shows how {meat} consumption evolved in the selected countries. Richer \
         economies such as the United States and Germany tend to show sustained growth, while \
         India and Nigeria grow more slowly or stay flat, held back by cultural factors and \
         economic constraints."
    )
}

pub const GDP_TREND_ANALYSIS: &str = "GDP per capita rose steadily in the United States and \
Germany over the decades. Nigeria and India remain far lower, and these economic gaps bear \
directly on which meats households can afford.";

pub const SCATTER_ANALYSIS: &str = "Higher GDP per capita generally goes with higher total meat \
consumption, most clearly among developed countries. Developing countries scatter more widely, \
a sign that cultural norms and dietary restrictions matter as much as purchasing power.";

pub fn snapshot_analysis(meat: MeatCategory) -> String {
    format!(
        "In 2020 the developed nations consumed more {meat} than the developing ones. Prosperity \
         widens access to food, while preference and affordability keep shaping consumption in \
         developing regions."
    )
}

pub const HEATMAP_ANALYSIS: &str = "Correlations are computed over every country and year in \
the dataset, independent of the current selection. Strong positive correlations between GDP and \
particular meats suggest that income drives those choices; weak or negative ones point at \
regional and cultural preferences.";

/// Commentary shown under the fixed per-category bar charts.
pub fn fixed_bar_analysis(category: MeatCategory) -> &'static str {
    match category {
        MeatCategory::Pork => {
            "Pork reflects cultural differences sharply: high in Germany's traditional cuisine, \
             minimal in India and Nigeria because of cultural and religious restrictions."
        }
        MeatCategory::SheepAndGoat => {
            "Sheep and goat is more common in Nigeria and lower in the United States and \
             Germany, showing the weight of local agriculture and food culture."
        }
        MeatCategory::Beef => {
            "Beef is high in the United States, in line with its beef industry, very low in India \
             for religious reasons, with Nigeria and Germany in between."
        }
        MeatCategory::OtherMeats => {
            "Other meats covers less common species; its consumption follows regional culinary \
             traditions more than income."
        }
        MeatCategory::Poultry | MeatCategory::FishAndSeafood => "",
    }
}

pub const CONCLUSION: &str = "Economic growth clearly influences meat consumption: developed \
countries eat more meat than developing ones. Cultural norms, dietary preferences and religious \
practice shape the pattern too, which is why income alone does not predict what ends up on the \
plate.";

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::model::{MergedRecord, MergedTable};

    fn rec(country: &str, year: i32, pork: Option<f64>) -> MergedRecord {
        let mut quantities = [None; 6];
        quantities[MeatCategory::Pork.index()] = pork;
        MergedRecord {
            country: country.into(),
            year,
            quantities,
            gdp_per_capita: None,
            total_meat_consumption: pork.unwrap_or(0.0),
        }
    }

    fn summarize(table: &MergedTable, countries: &[&str]) -> Vec<TrendSummary> {
        let selection = Selection::new(countries.iter().copied(), MeatCategory::Pork);
        let view = FilteredView::new(table, &selection.countries);
        trend_summaries(&view, &selection)
    }

    #[test]
    fn single_country_sentence() {
        let table = MergedTable::from_records(vec![
            rec("Germany", 2020, Some(33.52)),
            rec("Germany", 1961, Some(28.0)),
            rec("Germany", 1990, Some(50.0)),
        ]);
        let summaries = summarize(&table, &["Germany"]);

        assert_eq!(summaries.len(), 1);
        assert_eq!(
            summaries[0].to_string(),
            "Pork consumption in Germany increased from 28.00 kg per capita in 1961 \
             to 33.52 kg per capita in 2020."
        );
    }

    #[test]
    fn equal_endpoints_read_as_decreased() {
        let table = MergedTable::from_records(vec![
            rec("India", 1961, Some(0.3)),
            rec("India", 1980, Some(5.0)),
            rec("India", 2020, Some(0.3)),
        ]);
        let summaries = summarize(&table, &["India"]);
        assert!(matches!(
            summaries[0],
            TrendSummary::Trend { direction: Direction::Decreased, .. }
        ));
        assert!(summaries[0].to_string().contains("decreased"));
    }

    #[test]
    fn endpoints_skip_null_years() {
        let table = MergedTable::from_records(vec![
            rec("Nigeria", 1961, None),
            rec("Nigeria", 1970, Some(1.0)),
            rec("Nigeria", 2010, Some(0.5)),
            rec("Nigeria", 2020, None),
        ]);
        match &summarize(&table, &["Nigeria"])[0] {
            TrendSummary::Trend { first_year, last_year, direction, .. } => {
                assert_eq!((*first_year, *last_year), (1970, 2010));
                assert_eq!(*direction, Direction::Decreased);
            }
            other => panic!("unexpected summary: {other:?}"),
        }
    }

    #[test]
    fn all_null_or_absent_country_has_no_data() {
        let table = MergedTable::from_records(vec![rec("Nigeria", 1961, None)]);
        let summaries = summarize(&table, &["Nigeria", "Germany"]);
        assert_eq!(
            summaries.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            vec![
                "No available data for Pork consumption in Germany.",
                "No available data for Pork consumption in Nigeria.",
            ]
        );
    }

    #[test]
    fn empty_selection_says_so() {
        let table = MergedTable::from_records(vec![rec("Nigeria", 1961, Some(1.0))]);
        let selection = Selection {
            countries: BTreeSet::new(),
            meat: MeatCategory::Beef,
        };
        let view = FilteredView::new(&table, &selection.countries);
        assert_eq!(trend_summaries(&view, &selection), vec![TrendSummary::NoSelection]);
    }

    #[test]
    fn trend_serializes_with_kind_tag() -> anyhow::Result<()> {
        let summary = TrendSummary::NoData {
            country: "India".into(),
            meat: MeatCategory::Beef,
        };
        let json = serde_json::to_value(&summary)?;
        assert_eq!(json["kind"], "no_data");
        assert_eq!(json["meat"], "Beef");
        Ok(())
    }
}
