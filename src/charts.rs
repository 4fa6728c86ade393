use serde::Serialize;

use crate::data::filter::{FilteredView, Selection};
use crate::data::model::{MeatCategory, MergedRecord, MergedTable, Metric};
use crate::data::stats::{correlation_matrix, ols, LinearFit};
use crate::narrative::{trend_summaries, TrendSummary};

/// Reference year for every bar chart. Fixed, not "latest available".
pub const SNAPSHOT_YEAR: i32 = 2020;

/// Categories that always get their own snapshot bar chart.
pub const FIXED_BAR_CATEGORIES: [MeatCategory; 4] = [
    MeatCategory::Pork,
    MeatCategory::SheepAndGoat,
    MeatCategory::Beef,
    MeatCategory::OtherMeats,
];

const GDP_AXIS: &str = "GDP per Capita (constant 2017 international $)";
const TOTAL_AXIS: &str = "Total Meat Consumption (kg per capita)";

// ---------------------------------------------------------------------------
// Chart specifications
// ---------------------------------------------------------------------------

/// One country's line. `None` values are gaps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub country: String,
    pub points: Vec<(i32, Option<f64>)>,
}

impl LineSeries {
    /// Contiguous runs of non-null points, as plot coordinates.
    pub fn segments(&self) -> Vec<Vec<[f64; 2]>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for &(year, value) in &self.points {
            match value {
                Some(v) => current.push([year as f64, v]),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<LineSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub country: String,
    pub points: Vec<[f64; 2]>,
}

/// Regression overlay fitted over every point of the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trendline {
    pub fit: LinearFit,
    pub x_min: f64,
    pub x_max: f64,
}

impl Trendline {
    pub fn endpoints(&self) -> [[f64; 2]; 2] {
        [
            [self.x_min, self.fit.predict(self.x_min)],
            [self.x_max, self.fit.predict(self.x_max)],
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ScatterSeries>,
    pub trendline: Option<Trendline>,
}

/// One bar per country; the country is both the x category and the series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub country: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub category: MeatCategory,
    pub bars: Vec<Bar>,
}

/// Pearson correlation matrix with the upper triangle (diagonal included)
/// masked out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl Heatmap {
    pub fn is_masked(row: usize, col: usize) -> bool {
        col >= row
    }

    /// Value shown at `(row, col)`; `None` when masked or undefined.
    pub fn visible(&self, row: usize, col: usize) -> Option<f64> {
        if Self::is_masked(row, col) {
            return None;
        }
        self.values.get(row)?.get(col).copied().flatten()
    }
}

/// Everything the shell draws for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub selection: Selection,
    pub category_trend: LineChart,
    pub gdp_trend: LineChart,
    pub gdp_vs_total: ScatterChart,
    pub snapshot: BarChart,
    pub category_bars: Vec<BarChart>,
    pub heatmap: Heatmap,
    pub trends: Vec<TrendSummary>,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Build every chart and the trend narrative for `selection`.
///
/// Pure: the table is never modified and the same inputs always give the
/// same dashboard. The heatmap ignores the selection.
pub fn render(table: &MergedTable, selection: &Selection) -> Dashboard {
    let view = FilteredView::new(table, &selection.countries);
    let meat = selection.meat;
    let span = year_span(&view);

    let dashboard = Dashboard {
        selection: selection.clone(),
        category_trend: line_chart(
            &view,
            format!("{meat} Consumption in Selected Countries{span}"),
            format!("{meat} Consumption (kg per capita)"),
            |r| r.quantity(meat),
        ),
        gdp_trend: line_chart(
            &view,
            format!("GDP per Capita in Selected Countries{span}"),
            GDP_AXIS.to_string(),
            |r| r.gdp_per_capita,
        ),
        gdp_vs_total: gdp_vs_total(&view),
        snapshot: snapshot_bars(
            &view,
            meat,
            format!("{meat} Consumption in Selected Countries ({SNAPSHOT_YEAR})"),
            format!("{meat} Consumption (kg per capita)"),
        ),
        category_bars: FIXED_BAR_CATEGORIES
            .into_iter()
            .map(|c| {
                snapshot_bars(
                    &view,
                    c,
                    format!("{} Consumption in Selected Countries ({SNAPSHOT_YEAR})", c.title()),
                    format!("{} Consumption (kg per capita)", c.title()),
                )
            })
            .collect(),
        heatmap: heatmap(table),
        trends: trend_summaries(&view, selection),
    };

    log::debug!(
        "rendered {} countries / {} rows for {}",
        selection.countries.len(),
        view.len(),
        meat
    );
    dashboard
}

/// Distinct countries in the view, in name order.
fn countries(view: &FilteredView<'_>) -> Vec<String> {
    let mut names: Vec<String> = view.records.iter().map(|r| r.country.clone()).collect();
    names.sort();
    names.dedup();
    names
}

fn year_span(view: &FilteredView<'_>) -> String {
    let years = view.records.iter().map(|r| r.year);
    match (years.clone().min(), years.max()) {
        (Some(first), Some(last)) => format!(" ({first}-{last})"),
        _ => String::new(),
    }
}

fn line_chart(
    view: &FilteredView<'_>,
    title: String,
    y_label: String,
    value: impl Fn(&MergedRecord) -> Option<f64>,
) -> LineChart {
    let series = countries(view)
        .into_iter()
        .map(|country| LineSeries {
            points: view
                .country_rows(&country)
                .into_iter()
                .map(|r| (r.year, value(r)))
                .collect(),
            country,
        })
        .collect();

    LineChart {
        title,
        x_label: "Year".to_string(),
        y_label,
        series,
    }
}

fn gdp_vs_total(view: &FilteredView<'_>) -> ScatterChart {
    let series: Vec<ScatterSeries> = countries(view)
        .into_iter()
        .map(|country| ScatterSeries {
            points: view
                .country_rows(&country)
                .into_iter()
                .filter_map(|r| Some([r.gdp_per_capita?, r.total_meat_consumption]))
                .collect(),
            country,
        })
        .filter(|s| !s.points.is_empty())
        .collect();

    let all: Vec<(f64, f64)> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| (p[0], p[1])))
        .collect();
    let trendline = ols(&all).map(|fit| Trendline {
        fit,
        x_min: all.iter().map(|p| p.0).fold(f64::INFINITY, f64::min),
        x_max: all.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max),
    });

    ScatterChart {
        title: "GDP per Capita vs Total Meat Consumption in Selected Countries".to_string(),
        x_label: GDP_AXIS.to_string(),
        y_label: TOTAL_AXIS.to_string(),
        series,
        trendline,
    }
}

fn snapshot_bars(
    view: &FilteredView<'_>,
    category: MeatCategory,
    title: String,
    y_label: String,
) -> BarChart {
    let mut bars: Vec<Bar> = view
        .year_rows(SNAPSHOT_YEAR)
        .into_iter()
        .filter_map(|r| {
            Some(Bar {
                country: r.country.clone(),
                value: r.quantity(category)?,
            })
        })
        .collect();
    bars.sort_by(|a, b| a.country.cmp(&b.country));

    BarChart {
        title,
        x_label: "Country".to_string(),
        y_label,
        category,
        bars,
    }
}

/// Correlations over the whole table, whatever the selection.
fn heatmap(table: &MergedTable) -> Heatmap {
    let metrics = Metric::correlation_columns();
    let columns: Vec<Vec<Option<f64>>> = metrics
        .iter()
        .map(|&m| table.records.iter().map(|r| r.metric(m)).collect())
        .collect();

    Heatmap {
        title: "Correlation Heatmap of Meat Consumption and GDP".to_string(),
        labels: metrics.iter().map(|m| m.label().to_string()).collect(),
        values: correlation_matrix(&columns),
    }
}
