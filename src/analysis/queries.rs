use chrono::NaiveDateTime;

use crate::configuration::config::TIMESTAMP_FORMAT;
use crate::storage::database_storage::quote_ident;

pub const DAYTIME_LABEL: &str = "白天 (7:00-19:00)";
pub const NIGHTTIME_LABEL: &str = "夜间 (19:00-次日7:00)";

/// Hour of day at which the daytime bucket starts (inclusive).
pub const DAYTIME_START_HOUR: u32 = 7;
/// Hour of day at which the daytime bucket ends (exclusive).
pub const DAYTIME_END_HOUR: u32 = 19;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisQuery {
    /// Heading printed above the result table.
    pub title: &'static str,
    /// Comment preceding the statement in the audit file.
    pub audit_heading: &'static str,
    pub sql: String,
}

/// The three fixed grouping queries against `table`.
pub fn standard_queries(table: &str) -> Vec<AnalysisQuery> {
    let t = quote_ident(table);
    vec![
        AnalysisQuery {
            title: "最常见的出险原因分析",
            audit_heading: "最常见的出险原因",
            sql: format!(
                "SELECT
    出险原因,
    COUNT(*) AS 出险次数,
    ROUND(COUNT(*) * 100.0 / (SELECT COUNT(*) FROM {t}), 2) AS 占比百分比
FROM {t}
GROUP BY 出险原因
ORDER BY 出险次数 DESC, 出险原因;"
            ),
        },
        AnalysisQuery {
            title: "不同车型类别的理赔金额分析",
            audit_heading: "不同车型的平均理赔金额",
            sql: format!(
                "SELECT
    车型类别,
    COUNT(*) AS 保单数量,
    ROUND(AVG(\"理赔金额(元)\"), 2) AS 平均理赔金额,
    ROUND(SUM(\"理赔金额(元)\"), 2) AS 总理赔金额
FROM {t}
GROUP BY 车型类别
ORDER BY 平均理赔金额 DESC, 车型类别;"
            ),
        },
        AnalysisQuery {
            title: "日间与夜间出险情况对比",
            audit_heading: "日间与夜间出险情况对比",
            sql: format!(
                "SELECT
    CASE
        WHEN CAST(strftime('%H', 出险时间) AS INTEGER) >= {start}
             AND CAST(strftime('%H', 出险时间) AS INTEGER) < {end} THEN '{day}'
        ELSE '{night}'
    END AS 出险时段,
    COUNT(*) AS 出险次数,
    ROUND(COUNT(*) * 100.0 / (SELECT COUNT(*) FROM {t}), 2) AS 时段占比百分比,
    ROUND(AVG(\"理赔金额(元)\"), 2) AS 该时段平均理赔金额
FROM {t}
GROUP BY 出险时段
ORDER BY 出险次数 DESC, 出险时段;",
                start = DAYTIME_START_HOUR,
                end = DAYTIME_END_HOUR,
                day = DAYTIME_LABEL,
                night = NIGHTTIME_LABEL,
            ),
        },
    ]
}

/// Renders the audit script: header comments, then each numbered statement.
pub fn audit_script(queries: &[AnalysisQuery], generated_at: NaiveDateTime) -> String {
    let mut out = String::from("-- 车险理赔数据探索分析SQL脚本\n");
    out.push_str(&format!(
        "-- 生成时间：{}\n",
        generated_at.format(TIMESTAMP_FORMAT)
    ));
    for (i, query) in queries.iter().enumerate() {
        out.push_str(&format!("\n-- {}. {}\n{}\n", i + 1, query.audit_heading, query.sql));
    }
    out
}
