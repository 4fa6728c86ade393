use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::config::{DataConfig, FIXED_COUNTRIES};

use super::error::PrepareError;
use super::loader::{load_gdp, load_meat};
use super::model::{MergedRecord, MergedTable, RawGdpRecord, RawMeatRecord};

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Load both input files and build the merged table. Uncached.
pub fn prepare_with(config: &DataConfig) -> Result<MergedTable, PrepareError> {
    let meat = load_meat(&config.meat_path())?;
    let gdp = load_gdp(&config.gdp_path())?;

    let mut records = join(&meat, &gdp);
    if config.restrict_to_fixed_countries {
        records.retain(|r| FIXED_COUNTRIES.contains(&r.country.as_str()));
    }

    let table = MergedTable::from_records(records);
    if table.is_empty() {
        log::warn!("No (country, year) pair appears in both input files");
    }
    log::info!(
        "Prepared {} merged rows covering {} countries",
        table.len(),
        table.countries.len()
    );
    Ok(table)
}

/// Inner join on `(country, year)`, in meat-row order. A key that appears
/// several times in `gdp` yields one output row per match.
pub fn join(meat: &[RawMeatRecord], gdp: &[RawGdpRecord]) -> Vec<MergedRecord> {
    let mut by_key: HashMap<(&str, i32), Vec<&RawGdpRecord>> = HashMap::new();
    for g in gdp {
        by_key.entry((g.country.as_str(), g.year)).or_default().push(g);
    }

    let mut merged = Vec::with_capacity(meat.len().min(gdp.len()));
    let mut unmatched_meat = 0usize;
    for m in meat {
        let Some(matches) = by_key.get(&(m.country.as_str(), m.year)) else {
            unmatched_meat += 1;
            continue;
        };
        for g in matches {
            merged.push(MergedRecord {
                country: m.country.clone(),
                year: m.year,
                quantities: m.quantities,
                gdp_per_capita: g.gdp_per_capita,
                total_meat_consumption: total_consumption(&m.quantities),
            });
        }
    }

    if log::log_enabled!(log::Level::Debug) {
        log::debug!(
            "join kept {} rows; dropped {} of {} meat rows and {} GDP rows without a partner",
            merged.len(),
            unmatched_meat,
            meat.len(),
            gdp.len().saturating_sub(matched_gdp_rows(meat, &by_key)),
        );
    }
    merged
}

fn matched_gdp_rows(
    meat: &[RawMeatRecord],
    by_key: &HashMap<(&str, i32), Vec<&RawGdpRecord>>,
) -> usize {
    let mut seen: Vec<(&str, i32)> = meat
        .iter()
        .map(|m| (m.country.as_str(), m.year))
        .filter(|k| by_key.contains_key(k))
        .collect();
    seen.sort_unstable();
    seen.dedup();
    seen.iter().map(|k| by_key[k].len()).sum()
}

/// Sum of the non-null quantities. All-null gives `0.0`.
pub fn total_consumption(quantities: &[Option<f64>; 6]) -> f64 {
    quantities.iter().flatten().sum()
}

// ---------------------------------------------------------------------------
// Memoization
// ---------------------------------------------------------------------------

/// Computes the merged table at most once per configuration until cleared.
///
/// The slot lock is held across the computation, so concurrent first access
/// runs the pipeline exactly once. Failures are not cached.
pub struct DatasetCache {
    config: DataConfig,
    slot: Mutex<Option<Arc<MergedTable>>>,
}

impl DatasetCache {
    pub fn new(config: DataConfig) -> Self {
        Self {
            config,
            slot: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// Return the cached table, building it on first use.
    pub fn get(&self) -> Result<Arc<MergedTable>, PrepareError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = slot.as_ref() {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(prepare_with(&self.config)?);
        *slot = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Drop the cached table; the next [`get`](Self::get) reloads.
    pub fn clear(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            log::info!("Cleared cached dataset");
        }
    }
}

fn global_cache() -> &'static DatasetCache {
    static CACHE: OnceLock<DatasetCache> = OnceLock::new();
    CACHE.get_or_init(|| DatasetCache::new(DataConfig::from_env()))
}

/// Process-wide memoized pipeline, configured from the environment.
pub fn prepare() -> Result<Arc<MergedTable>, PrepareError> {
    global_cache().get()
}

/// Invalidate the process-wide cache.
pub fn clear_cache() {
    global_cache().clear();
}

pub fn global_config() -> &'static DataConfig {
    global_cache().config()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs;
    use std::path::Path;

    use anyhow::Result;
    use tempfile::{tempdir, TempDir};

    use super::*;
    use crate::data::model::MeatCategory;

    const MEAT_CSV: &str = "\
Entity,Code,Year,Poultry,Beef,Sheep and goat,Pork,Other meats,Fish and seafood
Germany,DEU,2019,13.0,9.5,0.9,35.0,1.1,12.6
Germany,DEU,2020,13.5,9.3,0.8,34.0,1.0,12.5
India,IND,2020,2.4,0.5,0.7,0.2,0.1,5.0
Nigeria,NGA,2020,,,,,,
France,FRA,2020,25.0,22.0,2.5,32.0,2.0,33.0
Atlantis,,2020,1,1,1,1,1,1
";

    const GDP_CSV: &str = "\
Entity,Code,Year,\"GDP per capita, PPP (constant 2017 international $)\"
Germany,DEU,2019,54000.0
Germany,DEU,2020,52000.0
India,IND,2020,6100.0
Nigeria,NGA,2020,4900.0
France,FRA,2020,
United States,USA,2020,60000.0
";

    fn write_inputs(meat: &str, gdp: &str) -> Result<(TempDir, DataConfig)> {
        let dir = tempdir()?;
        fs::write(dir.path().join("meat.csv"), meat)?;
        fs::write(dir.path().join("gdp.csv"), gdp)?;
        let config = DataConfig {
            data_dir: dir.path().to_path_buf(),
            meat_file: "meat.csv".into(),
            gdp_file: "gdp.csv".into(),
            restrict_to_fixed_countries: false,
        };
        Ok((dir, config))
    }

    fn keys_of(path: &Path, gdp: bool) -> Result<HashSet<(String, i32)>> {
        Ok(if gdp {
            load_gdp(path)?.into_iter().map(|r| (r.country, r.year)).collect()
        } else {
            load_meat(path)?.into_iter().map(|r| (r.country, r.year)).collect()
        })
    }

    #[test]
    fn join_is_a_strict_intersection() -> Result<()> {
        let (_dir, config) = write_inputs(MEAT_CSV, GDP_CSV)?;
        let table = prepare_with(&config)?;

        let meat_keys = keys_of(&config.meat_path(), false)?;
        let gdp_keys = keys_of(&config.gdp_path(), true)?;
        let merged_keys: HashSet<(String, i32)> =
            table.records.iter().map(|r| (r.country.clone(), r.year)).collect();

        assert_eq!(merged_keys, &meat_keys & &gdp_keys);
        assert!(!merged_keys.contains(&("Atlantis".to_string(), 2020)));
        assert!(!merged_keys.contains(&("United States".to_string(), 2020)));
        assert_eq!(table.len(), 5);
        assert_eq!(table.countries, vec!["France", "Germany", "India", "Nigeria"]);
        Ok(())
    }

    #[test]
    fn total_skips_nulls_and_never_goes_null() -> Result<()> {
        let (_dir, config) = write_inputs(MEAT_CSV, GDP_CSV)?;
        let table = prepare_with(&config)?;

        for r in &table.records {
            let expected: f64 = r.quantities.iter().flatten().sum();
            assert_eq!(r.total_meat_consumption, expected);
            assert!(r.total_meat_consumption >= 0.0);
        }
        let nigeria = table.records.iter().find(|r| r.country == "Nigeria").unwrap();
        assert_eq!(nigeria.total_meat_consumption, 0.0);
        Ok(())
    }

    #[test]
    fn null_gdp_keeps_the_row() -> Result<()> {
        let (_dir, config) = write_inputs(MEAT_CSV, GDP_CSV)?;
        let table = prepare_with(&config)?;
        let france = table.records.iter().find(|r| r.country == "France").unwrap();
        assert_eq!(france.gdp_per_capita, None);
        assert_eq!(france.quantity(MeatCategory::Pork), Some(32.0));
        Ok(())
    }

    #[test]
    fn duplicate_gdp_keys_fan_out() {
        let meat = vec![RawMeatRecord {
            country: "India".into(),
            year: 2000,
            quantities: [Some(1.0), None, None, None, None, None],
        }];
        let gdp = vec![
            RawGdpRecord { country: "India".into(), year: 2000, gdp_per_capita: Some(1.0) },
            RawGdpRecord { country: "India".into(), year: 2000, gdp_per_capita: Some(2.0) },
        ];
        let merged = join(&meat, &gdp);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].gdp_per_capita, Some(2.0));
    }

    #[test]
    fn fixed_country_mode_keeps_only_the_allow_list() -> Result<()> {
        let (_dir, mut config) = write_inputs(MEAT_CSV, GDP_CSV)?;
        config.restrict_to_fixed_countries = true;
        let table = prepare_with(&config)?;

        assert!(table
            .records
            .iter()
            .all(|r| FIXED_COUNTRIES.contains(&r.country.as_str())));
        assert_eq!(table.countries, vec!["Germany", "India", "Nigeria"]);
        Ok(())
    }

    #[test]
    fn malformed_row_fails_the_whole_load() -> Result<()> {
        let bad = format!("{MEAT_CSV}Spain,ESP,20x0,1,1,1,1,1,1\n");
        let (_dir, config) = write_inputs(&bad, GDP_CSV)?;
        assert!(matches!(
            prepare_with(&config),
            Err(PrepareError::YearCoercion { .. })
        ));
        Ok(())
    }

    #[test]
    fn disjoint_inputs_give_an_empty_table() -> Result<()> {
        let gdp = GDP_CSV.replace(",2020,", ",1999,").replace(",2019,", ",1998,");
        let (_dir, config) = write_inputs(MEAT_CSV, &gdp)?;
        let table = prepare_with(&config)?;
        assert!(table.is_empty());
        assert!(table.countries.is_empty());
        Ok(())
    }

    #[test]
    fn cache_returns_the_same_table_until_cleared() -> Result<()> {
        let (_dir, config) = write_inputs(MEAT_CSV, GDP_CSV)?;
        let cache = DatasetCache::new(config.clone());

        let first = cache.get()?;
        let second = cache.get()?;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, prepare_with(&config)?);

        cache.clear();
        let third = cache.get()?;
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(*first, *third);
        Ok(())
    }

    #[test]
    fn failed_loads_are_not_cached() -> Result<()> {
        let (dir, config) = write_inputs(MEAT_CSV, GDP_CSV)?;
        fs::remove_file(dir.path().join("gdp.csv"))?;
        let cache = DatasetCache::new(config);

        assert!(matches!(cache.get(), Err(PrepareError::Io { .. })));
        fs::write(dir.path().join("gdp.csv"), GDP_CSV)?;
        assert_eq!(cache.get()?.len(), 5);
        Ok(())
    }

    #[test]
    fn parquet_and_csv_inputs_agree() -> Result<()> {
        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{DataType, Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let (dir, config) = write_inputs(MEAT_CSV, GDP_CSV)?;
        let from_csv = prepare_with(&config)?;

        let gdp = load_gdp(&config.gdp_path())?;
        let schema = Arc::new(Schema::new(vec![
            Field::new("Entity", DataType::Utf8, false),
            Field::new("Year", DataType::Int64, false),
            Field::new(
                "GDP per capita, PPP (constant 2017 international $)",
                DataType::Float64,
                true,
            ),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from_iter_values(gdp.iter().map(|g| g.country.as_str()))),
                Arc::new(Int64Array::from_iter_values(gdp.iter().map(|g| g.year as i64))),
                Arc::new(gdp.iter().map(|g| g.gdp_per_capita).collect::<Float64Array>()),
            ],
        )?;
        let file = fs::File::create(dir.path().join("gdp.parquet"))?;
        let mut writer = ArrowWriter::try_new(file, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;

        let parquet_config = DataConfig {
            gdp_file: "gdp.parquet".into(),
            ..config
        };
        assert_eq!(prepare_with(&parquet_config)?, from_csv);
        Ok(())
    }
}
