//! Dataset path configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Locations of the five CSV datasets
///
/// The conventional layout is a single data directory containing
/// `bonds.csv`, `bond_finder.csv`, `companies.csv`, `financial_metrics.csv`
/// and `news.csv`; [`DataConfig::from_dir`] maps a directory to that layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Bond directory dataset
    pub bonds_csv: PathBuf,
    /// Cross-platform bond finder dataset
    pub finder_csv: PathBuf,
    /// Company master dataset
    pub companies_csv: PathBuf,
    /// Financial metrics dataset
    pub financials_csv: PathBuf,
    /// Company news dataset
    pub news_csv: PathBuf,
}

impl DataConfig {
    /// Build a config pointing at the conventional file names under `dir`
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            bonds_csv: dir.join("bonds.csv"),
            finder_csv: dir.join("bond_finder.csv"),
            companies_csv: dir.join("companies.csv"),
            financials_csv: dir.join("financial_metrics.csv"),
            news_csv: dir.join("news.csv"),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self::from_dir("data")
    }
}
