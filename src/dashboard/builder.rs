//! Chart and dashboard stage.

use std::fs;
use std::path::PathBuf;

use chrono::{Local, SubsecRound};
use log::{error, info};

use super::summary;
use crate::analysis::aggregates::{
    age_bracket_summary, cause_by_category_means, loss_ratio, monthly_summary, simulate_premiums,
    LossRatio,
};
use crate::analysis::format::{percent, thousands};
use crate::charts::{self, resolve_font};
use crate::configuration::Config;
use crate::dataset::{read_records, ClaimRecord};
use crate::error_handling::types::{DatasetError, PipelineError};

pub const SUMMARY_FILE: &str = "analysis_summary.txt";

const RULE_WIDTH: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardReport {
    pub loss_ratio: LossRatio,
    pub charts: Vec<PathBuf>,
    pub summary: PathBuf,
}

/// Re-reads the flat file and writes the three charts and the text summary.
pub fn run(config: &Config) -> Result<DashboardReport, PipelineError> {
    let records = load_records(config)?;
    let premiums = simulate_premiums(&records, config.charts.premium_seed);
    let loss = loss_ratio(&records, &premiums);

    println!("{}", "=".repeat(RULE_WIDTH));
    println!("核心业务指标计算结果：");
    println!("  总理赔金额：{} 元", thousands(loss.total_claim, 2));
    println!("  总模拟保费：{} 元", thousands(loss.total_premium, 2));
    println!("  整体赔付率：{}", percent(loss.ratio));
    println!("{}", "=".repeat(RULE_WIDTH));
    info!(
        "Loss ratio {} over {} record(s) with premium seed {}",
        percent(loss.ratio),
        records.len(),
        config.charts.premium_seed
    );

    let output_dir = &config.paths.output_dir;
    fs::create_dir_all(output_dir).map_err(|e| {
        error!("Failed to create output dir {}: {}", output_dir.display(), e);
        PipelineError::IoError(e)
    })?;

    let font = resolve_font(&config.charts.font_families);
    let ages = age_bracket_summary(&records);
    let months = monthly_summary(&records);
    let tab = cause_by_category_means(&records);

    let age_chart = output_dir.join(charts::AGE_BRACKET_CHART);
    charts::age_brackets::render(&age_chart, &ages, &font)?;
    info!("Chart saved to {}", age_chart.display());

    let trend_chart = output_dir.join(charts::MONTHLY_TREND_CHART);
    charts::monthly_trend::render(&trend_chart, &months, &font)?;
    info!("Chart saved to {}", trend_chart.display());

    let heatmap_chart = output_dir.join(charts::HEATMAP_CHART);
    charts::heatmap::render(&heatmap_chart, &tab, &font)?;
    info!("Chart saved to {}", heatmap_chart.display());

    let summary_path = output_dir.join(SUMMARY_FILE);
    let text = summary::render(
        records.len(),
        &loss,
        &ages,
        &months,
        Local::now().naive_local().trunc_subsecs(0),
    );
    fs::write(&summary_path, text)?;
    info!("Summary saved to {}", summary_path.display());

    Ok(DashboardReport {
        loss_ratio: loss,
        charts: vec![age_chart, trend_chart, heatmap_chart],
        summary: summary_path,
    })
}

pub(crate) fn load_records(config: &Config) -> Result<Vec<ClaimRecord>, PipelineError> {
    let records = read_records(&config.paths.claims_csv)?;
    if records.is_empty() {
        error!("No claim records in {}", config.paths.claims_csv.display());
        return Err(DatasetError::Empty.into());
    }
    info!(
        "Read {} claim record(s) from {}",
        records.len(),
        config.paths.claims_csv.display()
    );
    Ok(records)
}
