use serde::Deserialize;
use std::path::PathBuf;

/// Locations of every file the pipeline reads or writes.
#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub claims_csv: PathBuf,
    pub database: PathBuf,
    pub table: String,
    pub sql_audit: PathBuf,
    pub output_dir: PathBuf,
    pub workbook: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            claims_csv: PathBuf::from("data/car_insurance_claims.csv"),
            database: PathBuf::from("insurance.db"),
            table: String::from("claims"),
            sql_audit: PathBuf::from("sql/insurance_data_analysis.sql"),
            output_dir: PathBuf::from("output"),
            workbook: PathBuf::from("data/dashboard_data_source.xlsx"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub record_count: usize,
    pub seed: u64,
    /// Generation instant as `YYYY-MM-DD HH:MM:SS`; wall clock when absent
    pub anchor: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            record_count: 1000,
            seed: 42,
            anchor: None,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    /// Seed of the simulated premium factors, independent from the generator seed
    pub premium_seed: u64,
    /// CJK font families tried in order
    pub font_families: Vec<String>,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            premium_seed: 42,
            font_families: vec![
                String::from("Microsoft YaHei"),
                String::from("SimHei"),
                String::from("Noto Sans CJK SC"),
                String::from("Source Han Sans SC"),
                String::from("WenQuanYi Micro Hei"),
                String::from("PingFang SC"),
            ],
        }
    }
}
