//! Descriptive statistics for built spread tables.

use crate::domain::family::{LegPair, LEG_COUNT};
use crate::domain::spread::SpreadTable;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    /// NaN values are ignored. Returns `None` when nothing is left.
    pub fn compute(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = sorted.iter().map(|v| (v - mean) * (v - mean)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        Some(Self {
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }
}

/// Linear interpolation between closest ranks on sorted input.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Stats for each close column followed by each spread column.
pub fn describe_table(table: &SpreadTable) -> Vec<(String, Option<ColumnStats>)> {
    let mut out = Vec::with_capacity(LEG_COUNT + LegPair::all().len());
    for leg in 0..LEG_COUNT {
        out.push((
            table.family.close_column(leg),
            ColumnStats::compute(&table.closes(leg)),
        ));
    }
    for pair in LegPair::all() {
        out.push((pair.column_name(), ColumnStats::compute(&table.spread_series(pair))));
    }
    out
}

pub fn format_describe(table: &SpreadTable) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for (name, stats) in describe_table(table) {
        match stats {
            Some(s) => {
                let _ = writeln!(
                    out,
                    "{:<20} {:>6} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
                    name, s.count, s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max
                );
            }
            None => {
                let _ = writeln!(out, "{:<20} {:>6}", name, 0);
            }
        }
    }
    out
}
