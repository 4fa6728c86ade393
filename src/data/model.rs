use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a source table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from a CSV or Parquet source, before the
/// typed extraction into [`RawMeatRecord`] / [`RawGdpRecord`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the cell as a nullable number. Outer `None` means the
    /// cell holds text and is not numeric at all.
    pub fn as_nullable_f64(&self) -> Option<Option<f64>> {
        match self {
            CellValue::Float(v) if v.is_nan() => Some(None),
            CellValue::Float(v) => Some(Some(*v)),
            CellValue::Integer(i) => Some(Some(*i as f64)),
            CellValue::Null => Some(None),
            CellValue::String(_) => None,
        }
    }

    /// Interpret the cell as an exact integer year.
    ///
    /// Floats are accepted only when they carry no fractional part.
    pub fn as_year(&self) -> Option<i32> {
        match self {
            CellValue::Integer(i) => i32::try_from(*i).ok(),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => {
                let y = *v as i64;
                i32::try_from(y).ok()
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// MeatCategory – the six tracked meat types
// ---------------------------------------------------------------------------

/// One of the six meat categories tracked by the consumption dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MeatCategory {
    #[default]
    Poultry,
    Beef,
    #[serde(rename = "Sheep and goat")]
    SheepAndGoat,
    Pork,
    #[serde(rename = "Other meats")]
    OtherMeats,
    #[serde(rename = "Fish and seafood")]
    FishAndSeafood,
}

impl MeatCategory {
    /// All categories, in source column order.
    pub const ALL: [MeatCategory; 6] = [
        MeatCategory::Poultry,
        MeatCategory::Beef,
        MeatCategory::SheepAndGoat,
        MeatCategory::Pork,
        MeatCategory::OtherMeats,
        MeatCategory::FishAndSeafood,
    ];

    /// Column header in the consumption file (also the display label).
    pub fn column_name(self) -> &'static str {
        match self {
            MeatCategory::Poultry => "Poultry",
            MeatCategory::Beef => "Beef",
            MeatCategory::SheepAndGoat => "Sheep and goat",
            MeatCategory::Pork => "Pork",
            MeatCategory::OtherMeats => "Other meats",
            MeatCategory::FishAndSeafood => "Fish and seafood",
        }
    }

    /// Title-cased label used in chart headings ("Sheep and Goat").
    pub fn title(self) -> &'static str {
        match self {
            MeatCategory::SheepAndGoat => "Sheep and Goat",
            MeatCategory::OtherMeats => "Other Meats",
            MeatCategory::FishAndSeafood => "Fish and Seafood",
            other => other.column_name(),
        }
    }

    /// Position inside [`RawMeatRecord::quantities`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MeatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ---------------------------------------------------------------------------
// Source rows
// ---------------------------------------------------------------------------

/// One row of the meat consumption file (kg per person per year).
#[derive(Debug, Clone, PartialEq)]
pub struct RawMeatRecord {
    pub country: String,
    pub year: i32,
    /// Indexed by [`MeatCategory::index`].
    pub quantities: [Option<f64>; 6],
}

/// One row of the GDP file (constant 2017 PPP international dollars).
#[derive(Debug, Clone, PartialEq)]
pub struct RawGdpRecord {
    pub country: String,
    pub year: i32,
    pub gdp_per_capita: Option<f64>,
}

// ---------------------------------------------------------------------------
// MergedRecord / MergedTable
// ---------------------------------------------------------------------------

/// A `(country, year)` present in both sources, with the derived total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub country: String,
    pub year: i32,
    pub quantities: [Option<f64>; 6],
    pub gdp_per_capita: Option<f64>,
    /// Sum of the non-null category quantities; `0.0` when all are null.
    pub total_meat_consumption: f64,
}

impl MergedRecord {
    pub fn quantity(&self, category: MeatCategory) -> Option<f64> {
        self.quantities[category.index()]
    }

    /// Look up any numeric column used by the correlation matrix.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::GdpPerCapita => self.gdp_per_capita,
            Metric::TotalMeat => Some(self.total_meat_consumption),
            Metric::Meat(category) => self.quantity(category),
        }
    }
}

/// Numeric columns of a [`MergedRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    GdpPerCapita,
    TotalMeat,
    Meat(MeatCategory),
}

impl Metric {
    /// Correlation heatmap axis order.
    pub fn correlation_columns() -> Vec<Metric> {
        let mut cols = vec![Metric::GdpPerCapita, Metric::TotalMeat];
        cols.extend(MeatCategory::ALL.into_iter().map(Metric::Meat));
        cols
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::GdpPerCapita => "GDP per capita",
            Metric::TotalMeat => "Total meat consumption",
            Metric::Meat(category) => category.column_name(),
        }
    }
}

/// The analysis-ready joined table. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    /// Rows in meat-file order.
    pub records: Vec<MergedRecord>,
    /// Sorted distinct countries present in `records`.
    pub countries: Vec<String>,
}

impl MergedTable {
    pub fn from_records(records: Vec<MergedRecord>) -> Self {
        let countries: BTreeSet<String> = records.iter().map(|r| r.country.clone()).collect();
        MergedTable {
            records,
            countries: countries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
