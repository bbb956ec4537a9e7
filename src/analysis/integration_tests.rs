#[cfg(test)]
mod integration_tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::analysis::aggregates::{loss_ratio, simulate_premiums};
    use crate::analysis::queries::{DAYTIME_LABEL, NIGHTTIME_LABEL};
    use crate::analysis::report_runner;
    use crate::configuration::Config;
    use crate::dashboard::{builder, workbook};
    use crate::dataset::{read_records, ClaimCause};
    use crate::generator;
    use crate::storage::loader;

    const ANCHOR: &str = "2024-11-24 21:15:00";

    fn pipeline_config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.claims_csv = dir.path().join("data").join("car_insurance_claims.csv");
        config.paths.database = dir.path().join("insurance.db");
        config.paths.sql_audit = dir.path().join("sql").join("insurance_data_analysis.sql");
        config.paths.output_dir = dir.path().join("output");
        config.paths.workbook = dir.path().join("data").join("dashboard_data_source.xlsx");
        config.generator.anchor = Some(ANCHOR.to_string());
        config
    }

    #[test]
    fn test_generate_load_report() {
        let dir = TempDir::new().unwrap();
        let config = pipeline_config(&dir);

        let records = generator::run(&config).unwrap();
        assert_eq!(records.len(), 1000);
        let loaded = loader::run(&config).unwrap();
        assert_eq!(loaded.rows_loaded, 1000);

        let reports = report_runner::run(&config).unwrap();
        assert_eq!(reports.len(), 3);

        let q1 = &reports[0].result;
        let share: f64 = q1.f64_column("占比百分比").iter().sum();
        assert!((share - 100.0).abs() <= 0.01, "Q1 shares sum to {}", share);
        let counts = q1.f64_column("出险次数");
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(counts.iter().sum::<f64>(), 1000.0);

        let q2 = &reports[1].result;
        assert_eq!(q2.f64_column("保单数量").iter().sum::<f64>(), 1000.0);
        let means = q2.f64_column("平均理赔金额");
        assert!(means.windows(2).all(|w| w[0] >= w[1]));

        let q3 = &reports[2].result;
        assert_eq!(q3.f64_column("出险次数").iter().sum::<f64>(), 1000.0);
        // every generated claim shares the anchor's time of day
        assert_eq!(q3.rows.len(), 1);
        assert_eq!(q3.rows[0][0].as_str(), Some(NIGHTTIME_LABEL));
        assert_ne!(q3.rows[0][0].as_str(), Some(DAYTIME_LABEL));

        let audit = fs::read_to_string(&config.paths.sql_audit).unwrap();
        for report in &reports {
            assert!(audit.contains(&report.query.sql));
        }
    }

    #[test]
    fn test_regeneration_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let config = pipeline_config(&dir);
        generator::run(&config).unwrap();
        let first = fs::read(&config.paths.claims_csv).unwrap();
        generator::run(&config).unwrap();
        let second = fs::read(&config.paths.claims_csv).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_loss_ratio_and_cause_severity() {
        let dir = TempDir::new().unwrap();
        let config = pipeline_config(&dir);
        generator::run(&config).unwrap();
        let records = read_records(&config.paths.claims_csv).unwrap();

        let premiums = simulate_premiums(&records, config.charts.premium_seed);
        let lr = loss_ratio(&records, &premiums);
        assert!(lr.ratio > 0.33 && lr.ratio < 0.67, "loss ratio {}", lr.ratio);

        let mean_of = |cause: ClaimCause| {
            let amounts: Vec<f64> = records
                .iter()
                .filter(|r| r.claim_cause == cause)
                .map(|r| r.claim_amount)
                .collect();
            amounts.iter().sum::<f64>() / amounts.len() as f64
        };
        assert!(mean_of(ClaimCause::Theft) > 10.0 * mean_of(ClaimCause::Scratch));
    }

    #[test]
    fn test_export_after_generate() {
        let dir = TempDir::new().unwrap();
        let config = pipeline_config(&dir);
        generator::run(&config).unwrap();
        workbook::run(&config).unwrap();
        assert!(config.paths.workbook.exists());
    }

    #[test]
    fn test_charts_stage_writes_all_outputs() {
        let dir = TempDir::new().unwrap();
        let config = pipeline_config(&dir);
        generator::run(&config).unwrap();

        let report = builder::run(&config).unwrap();
        assert_eq!(report.charts.len(), 3);
        for chart in &report.charts {
            assert!(fs::metadata(chart).unwrap().len() > 0, "{}", chart.display());
        }
        let summary = fs::read_to_string(&report.summary).unwrap();
        assert!(summary.contains("共 1000 条理赔记录"));
        assert!(summary.contains("【月度趋势分析】"));
    }
}
