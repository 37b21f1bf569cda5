//! Flattened, display-formatted report rows.

use crate::domain::batch::FamilyOutcome;
use crate::domain::stationarity::AdfResult;
use std::collections::HashSet;
use std::fmt::Write;
use std::str::FromStr;

pub const COLUMN_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    Zh,
    En,
}

impl Locale {
    pub fn headers(&self) -> [&'static str; COLUMN_COUNT] {
        match self {
            Locale::Zh => [
                "品种",
                "合约对",
                "ADF统计量",
                "p值",
                "1%临界值",
                "5%临界值",
                "10%临界值",
                "是否平稳(5%显著性)",
            ],
            Locale::En => [
                "family",
                "pair",
                "adf_statistic",
                "p_value",
                "critical_1pct",
                "critical_5pct",
                "critical_10pct",
                "stationary_5pct",
            ],
        }
    }

    pub fn verdict(&self, stationary: bool) -> &'static str {
        match (self, stationary) {
            (Locale::Zh, true) => "是",
            (Locale::Zh, false) => "否",
            (Locale::En, true) => "yes",
            (Locale::En, false) => "no",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zh" | "zh-cn" | "cn" => Ok(Locale::Zh),
            "en" | "en-us" => Ok(Locale::En),
            other => Err(format!("unknown locale '{other}' (expected zh or en)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub family: String,
    pub pair: String,
    pub adf_statistic: String,
    pub p_value: String,
    pub critical_1pct: String,
    pub critical_5pct: String,
    pub critical_10pct: String,
    pub stationary: String,
}

impl SummaryRow {
    pub fn from_result(family: &str, result: &AdfResult, locale: Locale) -> Self {
        Self {
            family: family.to_uppercase(),
            pair: result.pair.label(),
            adf_statistic: format!("{:.4}", result.statistic),
            p_value: format!("{:.4}", result.p_value),
            critical_1pct: format!("{:.4}", result.critical_values.one_pct),
            critical_5pct: format!("{:.4}", result.critical_values.five_pct),
            critical_10pct: format!("{:.4}", result.critical_values.ten_pct),
            stationary: locale.verdict(result.is_stationary).to_string(),
        }
    }

    pub fn fields(&self) -> [&str; COLUMN_COUNT] {
        [
            &self.family,
            &self.pair,
            &self.adf_statistic,
            &self.p_value,
            &self.critical_1pct,
            &self.critical_5pct,
            &self.critical_10pct,
            &self.stationary,
        ]
    }

    pub fn from_fields(fields: [String; COLUMN_COUNT]) -> Self {
        let [family, pair, adf_statistic, p_value, critical_1pct, critical_5pct, critical_10pct, stationary] =
            fields;
        Self {
            family,
            pair,
            adf_statistic,
            p_value,
            critical_1pct,
            critical_5pct,
            critical_10pct,
            stationary,
        }
    }
}

/// One row per (family, pair) over the completed families. A family that
/// appears more than once keeps only its first outcome.
pub fn build_summary(outcomes: &[FamilyOutcome<Vec<AdfResult>>], locale: Locale) -> Vec<SummaryRow> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for outcome in outcomes {
        if !seen.insert(outcome.family().symbol().to_string()) {
            continue;
        }
        if let FamilyOutcome::Completed { family, value } = outcome {
            rows.extend(
                value
                    .iter()
                    .map(|result| SummaryRow::from_result(family.symbol(), result, locale)),
            );
        }
    }

    rows
}

/// Column-aligned text rendering for the console.
pub fn render_table(rows: &[SummaryRow], locale: Locale) -> String {
    let headers = locale.headers();
    let mut widths: [usize; COLUMN_COUNT] = headers.map(display_width);
    for row in rows {
        for (w, field) in widths.iter_mut().zip(row.fields()) {
            *w = (*w).max(display_width(field));
        }
    }

    let mut out = String::new();
    push_line(&mut out, &headers, &widths);
    let rule: usize = widths.iter().sum::<usize>() + 2 * (COLUMN_COUNT - 1);
    let _ = writeln!(out, "{}", "-".repeat(rule));
    for row in rows {
        push_line(&mut out, &row.fields(), &widths);
    }
    out
}

fn push_line(out: &mut String, fields: &[&str; COLUMN_COUNT], widths: &[usize; COLUMN_COUNT]) {
    let mut line = String::new();
    for (i, (field, width)) in fields.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        let pad = width - display_width(field);
        // Text columns left-aligned, numbers right-aligned.
        if (2..7).contains(&i) {
            line.push_str(&" ".repeat(pad));
            line.push_str(field);
        } else {
            line.push_str(field);
            line.push_str(&" ".repeat(pad));
        }
    }
    let _ = writeln!(out, "{}", line.trim_end());
}

/// Terminal column count, treating CJK characters as double width.
fn display_width(s: &str) -> usize {
    s.chars()
        .map(|c| if is_wide(c) { 2 } else { 1 })
        .sum()
}

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F | 0x2E80..=0x303E | 0x3040..=0xA4CF | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF | 0xFE30..=0xFE4F | 0xFF00..=0xFF60 | 0xFFE0..=0xFFE6)
}
