use std::env;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Data configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_MEAT_FILE: &str = "Consumption of meat per capita.csv";
pub const DEFAULT_GDP_FILE: &str = "GDP per capita PPP.csv";

/// The four countries shown by default, and the allow-list applied when
/// [`DataConfig::restrict_to_fixed_countries`] is set.
pub const FIXED_COUNTRIES: [&str; 4] = ["United States", "India", "Germany", "Nigeria"];

/// Where the input files live and how the pipeline treats them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub meat_file: PathBuf,
    pub gdp_file: PathBuf,
    /// Keep only [`FIXED_COUNTRIES`] in the merged table.
    pub restrict_to_fixed_countries: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            meat_file: PathBuf::from(DEFAULT_MEAT_FILE),
            gdp_file: PathBuf::from(DEFAULT_GDP_FILE),
            restrict_to_fixed_countries: false,
        }
    }
}

impl DataConfig {
    /// Defaults overridden by `MEATSCOPE_DATA_DIR`, `MEATSCOPE_MEAT_FILE`,
    /// `MEATSCOPE_GDP_FILE` and `MEATSCOPE_FIXED_COUNTRIES`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = lookup("MEATSCOPE_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("MEATSCOPE_MEAT_FILE") {
            config.meat_file = PathBuf::from(file);
        }
        if let Some(file) = lookup("MEATSCOPE_GDP_FILE") {
            config.gdp_file = PathBuf::from(file);
        }
        if let Some(flag) = lookup("MEATSCOPE_FIXED_COUNTRIES") {
            config.restrict_to_fixed_countries = parse_flag(&flag);
        }
        config
    }

    pub fn meat_path(&self) -> PathBuf {
        self.data_dir.join(&self.meat_file)
    }

    pub fn gdp_path(&self) -> PathBuf {
        self.data_dir.join(&self.gdp_file)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
