use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{cast_with_options, CastOptions};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::PrepareError;
use super::model::{CellValue, MeatCategory, RawGdpRecord, RawMeatRecord};

/// Country column shared by both files.
pub const ENTITY_COLUMN: &str = "Entity";
/// Year column shared by both files.
pub const YEAR_COLUMN: &str = "Year";
/// Descriptive GDP header in the source file, exposed as `gdp_per_capita`.
pub const GDP_SOURCE_COLUMN: &str = "GDP per capita, PPP (constant 2017 international $)";

/// Tokens read as a missing value in delimited text (pandas' default
/// `na_values`, plus the empty cell).
const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// RawTable – a source file before typed extraction
// ---------------------------------------------------------------------------

/// A source table with dynamically typed cells. Row `i` of `rows` is data
/// row `i + 1` of the file (the header is not counted).
#[derive(Debug, Clone)]
pub struct RawTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    fn column(&self, name: &str) -> Result<usize, PrepareError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PrepareError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read the meat consumption file into typed rows.
pub fn load_meat(path: &Path) -> Result<Vec<RawMeatRecord>, PrepareError> {
    let table = read_table(path)?;
    let entity_idx = table.column(ENTITY_COLUMN)?;
    let year_idx = table.column(YEAR_COLUMN)?;
    let category_idx = MeatCategory::ALL
        .iter()
        .map(|c| table.column(c.column_name()))
        .collect::<Result<Vec<_>, _>>()?;

    let records = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut quantities = [None; 6];
            for (slot, (&col, category)) in quantities
                .iter_mut()
                .zip(category_idx.iter().zip(MeatCategory::ALL))
            {
                *slot = number_cell(&table, i, &row[col], category.column_name())?;
            }
            Ok(RawMeatRecord {
                country: country_cell(&row[entity_idx]),
                year: year_cell(&table, i, &row[year_idx])?,
                quantities,
            })
        })
        .collect::<Result<Vec<_>, PrepareError>>()?;

    log::info!("Loaded {} meat rows from {}", records.len(), path.display());
    Ok(records)
}

/// Read the GDP file into typed rows, renaming the descriptive GDP header to
/// the canonical `gdp_per_capita` field.
pub fn load_gdp(path: &Path) -> Result<Vec<RawGdpRecord>, PrepareError> {
    let table = read_table(path)?;
    let entity_idx = table.column(ENTITY_COLUMN)?;
    let year_idx = table.column(YEAR_COLUMN)?;
    let gdp_idx = table.column(GDP_SOURCE_COLUMN)?;

    let records = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Ok(RawGdpRecord {
                country: country_cell(&row[entity_idx]),
                year: year_cell(&table, i, &row[year_idx])?,
                gdp_per_capita: number_cell(&table, i, &row[gdp_idx], GDP_SOURCE_COLUMN)?,
            })
        })
        .collect::<Result<Vec<_>, PrepareError>>()?;

    log::info!("Loaded {} GDP rows from {}", records.len(), path.display());
    Ok(records)
}

/// Load any supported tabular file. Dispatch by extension:
/// * `.csv`             – header row, comma separated
/// * `.parquet` / `.pq` – flat columns of string / integer / float type
pub fn read_table(path: &Path) -> Result<RawTable, PrepareError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => read_csv(path),
        "parquet" | "pq" => read_parquet(path),
        _ => Err(PrepareError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

// -- typed cell extraction --

fn country_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn year_cell(table: &RawTable, row: usize, cell: &CellValue) -> Result<i32, PrepareError> {
    cell.as_year().ok_or_else(|| PrepareError::YearCoercion {
        path: table.path.clone(),
        row: row + 1,
        value: cell.to_string(),
    })
}

fn number_cell(
    table: &RawTable,
    row: usize,
    cell: &CellValue,
    column: &str,
) -> Result<Option<f64>, PrepareError> {
    cell.as_nullable_f64()
        .ok_or_else(|| PrepareError::InvalidNumber {
            path: table.path.clone(),
            row: row + 1,
            column: column.to_string(),
            value: cell.to_string(),
        })
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawTable, PrepareError> {
    let file = File::open(path).map_err(|source| PrepareError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let csv_err = |source| PrepareError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_reader(file);
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    // Country names are kept verbatim, never guessed as numbers or nulls.
    let text_columns: Vec<bool> = headers.iter().map(|h| h == ENTITY_COLUMN).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        rows.push(
            record
                .iter()
                .zip(&text_columns)
                .map(|(raw, &text)| {
                    if text {
                        CellValue::String(raw.trim().to_string())
                    } else {
                        guess_cell_type(raw)
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

fn guess_cell_type(raw: &str) -> CellValue {
    let s = raw.trim();
    if s.is_empty() || NULL_TOKENS.contains(&s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`); only flat scalar columns are read.
fn read_parquet(path: &Path) -> Result<RawTable, PrepareError> {
    let file = File::open(path).map_err(|source| PrepareError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parquet_err = |source: anyhow::Error| PrepareError::Parquet {
        path: path.to_path_buf(),
        source,
    };

    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| parquet_err(e.into()))?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().map_err(|e| parquet_err(e.into()))?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| parquet_err(e.into()))?;
        let columns = batch
            .columns()
            .iter()
            .zip(&headers)
            .map(|(col, name)| {
                let decoded = decode_column(col).map_err(|e| parquet_err(e.into()))?;
                if !is_supported(decoded.data_type()) {
                    return Err(PrepareError::UnsupportedColumnType {
                        path: path.to_path_buf(),
                        column: name.clone(),
                        data_type: decoded.data_type().to_string(),
                    });
                }
                Ok(decoded)
            })
            .collect::<Result<Vec<_>, PrepareError>>()?;

        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| extract_cell(col, row)).collect());
        }
    }

    Ok(RawTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

/// Unpack dictionary / view encodings and widen narrow numeric types so
/// that every readable column ends up in one of the [`is_supported`] types.
/// Anything else is returned unchanged. Overflowing casts are errors.
fn decode_column(col: &ArrayRef) -> Result<ArrayRef, arrow::error::ArrowError> {
    let target = match col.data_type() {
        DataType::Utf8View => DataType::Utf8,
        DataType::Dictionary(_, values)
            if matches!(
                values.as_ref(),
                DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View
            ) =>
        {
            DataType::Utf8
        }
        DataType::Int8
        | DataType::Int16
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => DataType::Int64,
        DataType::Float16 => DataType::Float64,
        _ => return Ok(col.clone()),
    };
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    cast_with_options(col, &target, &options)
}

fn is_supported(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Null
            | DataType::Utf8
            | DataType::LargeUtf8
            | DataType::Int32
            | DataType::Int64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Extract a single cell from a decoded Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        // Null columns; other types are rejected before extraction.
        _ => CellValue::Null,
    }
}
