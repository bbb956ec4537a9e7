use chrono::NaiveDateTime;

use crate::analysis::aggregates::{AgeBracket, GroupStats, LossRatio, MonthlyStats, YearMonth};
use crate::analysis::format::{percent, round2, thousands};
use crate::configuration::config::TIMESTAMP_FORMAT;
use crate::storage::types::{CellValue, ResultTable};

/// Headline figures and aggregate tables restated as plain text.
pub fn render(
    record_count: usize,
    loss: &LossRatio,
    ages: &[(AgeBracket, GroupStats)],
    months: &[MonthlyStats],
    generated_at: NaiveDateTime,
) -> String {
    let mut out = String::new();
    out.push_str("车险理赔数据分析项目 - 关键指标摘要\n");
    out.push_str(&format!("生成时间：{}\n", generated_at.format(TIMESTAMP_FORMAT)));
    out.push_str(&format!("数据分析范围：共 {} 条理赔记录\n\n", record_count));

    out.push_str("【核心业务指标】\n");
    out.push_str(&format!("1. 总理赔金额：{} 元\n", thousands(loss.total_claim, 2)));
    out.push_str(&format!("2. 总模拟保费：{} 元\n", thousands(loss.total_premium, 2)));
    out.push_str(&format!("3. 整体赔付率：{}\n\n", percent(loss.ratio)));

    out.push_str("【年龄段分析】\n");
    out.push_str(&age_table(ages).to_string());
    out.push('\n');

    out.push_str("【月度趋势分析】\n");
    if let (Some(first), Some(last)) = (months.first(), months.last()) {
        out.push_str(&format!("观测期：{} 至 {}\n", first.month, last.month));
        let mean_count =
            months.iter().map(|m| m.stats.count).sum::<usize>() as f64 / months.len() as f64;
        out.push_str(&format!("月均理赔次数：{:.1} 次\n", mean_count));
        if let Some((month, count)) = peak_month(months) {
            out.push_str(&format!("理赔次数最高月份：{} ({} 次)\n", month, count));
        }
        out.push('\n');
        out.push_str(&month_table(months).to_string());
    } else {
        out.push_str("观测期：无数据\n");
    }
    out
}

/// Month with the most claims; the earliest one wins a tie.
pub fn peak_month(months: &[MonthlyStats]) -> Option<(YearMonth, usize)> {
    months.iter().fold(None, |best, m| match best {
        Some((_, count)) if count >= m.stats.count => best,
        _ => Some((m.month, m.stats.count)),
    })
}

pub fn age_table(ages: &[(AgeBracket, GroupStats)]) -> ResultTable {
    ResultTable {
        columns: ["年龄段", "记录数", "平均理赔金额", "总理赔金额"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        rows: ages
            .iter()
            .map(|(bracket, s)| {
                vec![
                    CellValue::Text(bracket.label().to_string()),
                    CellValue::Integer(s.count as i64),
                    CellValue::Real(round2(s.mean)),
                    CellValue::Real(round2(s.total)),
                ]
            })
            .collect(),
    }
}

pub fn month_table(months: &[MonthlyStats]) -> ResultTable {
    ResultTable {
        columns: ["出险年月", "理赔次数", "平均金额"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        rows: months
            .iter()
            .map(|m| {
                vec![
                    CellValue::Text(m.month.to_string()),
                    CellValue::Integer(m.stats.count as i64),
                    CellValue::Real(round2(m.stats.mean)),
                ]
            })
            .collect(),
    }
}
