//! Augmented Dickey-Fuller unit-root test with a constant term.
//!
//! Regression: dy_t = a + b y_{t-1} + sum_{k=1..p} g_k dy_{t-k} + e_t.
//! The lag order p is the AIC minimizer over 0..=max_lag, with every
//! candidate fitted on the same sample (trimmed by max_lag) so that their
//! AIC values are comparable. The chosen order is then refitted on the
//! longest sample it allows and the statistic is the t-value of b.

use crate::domain::error::SpreadError;
use crate::domain::mackinnon::{self, CriticalValues};
use crate::domain::ols::{self, Design};
use tracing::debug;

/// Deterministic regressors in the test regression (the constant only).
const TREND_TERMS: usize = 1;

/// Smallest sample that leaves room for one lag.
pub const MIN_OBSERVATIONS: usize = 2 * (TREND_TERMS + 2);

#[derive(Debug, Clone, PartialEq)]
pub struct AdfOutcome {
    pub statistic: f64,
    pub p_value: f64,
    pub critical_values: CriticalValues,
    pub used_lag: usize,
    /// Observations in the final regression.
    pub nobs: usize,
    pub aic: f64,
}

/// Largest lag order the sample supports.
pub fn lag_cap(observations: usize) -> usize {
    (observations / 2).saturating_sub(TREND_TERMS + 1)
}

/// Schwert's rule, ceil(12 (n/100)^(1/4)), bounded by [`lag_cap`].
pub fn default_max_lag(observations: usize) -> usize {
    let schwert = (12.0 * (observations as f64 / 100.0).powf(0.25)).ceil() as usize;
    schwert.min(lag_cap(observations))
}

pub fn adf_test(series: &[f64], max_lag: Option<usize>) -> Result<AdfOutcome, SpreadError> {
    let n = series.len();
    if n < MIN_OBSERVATIONS {
        return Err(SpreadError::InsufficientObservations {
            observations: n,
            required: MIN_OBSERVATIONS,
        });
    }

    let (lo, hi) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo == hi {
        return Err(SpreadError::DegenerateSeries {
            reason: format!("series is constant at {lo}"),
        });
    }

    let cap = lag_cap(n);
    let max_lag = match max_lag {
        Some(lag) if lag > cap => {
            return Err(SpreadError::InsufficientObservations {
                observations: n,
                required: 2 * (lag + TREND_TERMS + 1),
            });
        }
        Some(lag) => lag,
        None => default_max_lag(n),
    };

    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=max_lag {
        let (y, x) = regression_inputs(series, &diffs, max_lag, lag);
        match ols::fit(&y, &x) {
            Ok(fit) => {
                if best.is_none_or(|(aic, _)| fit.aic < aic) {
                    best = Some((fit.aic, lag));
                }
            }
            Err(SpreadError::DegenerateSeries { reason }) => {
                debug!(lag, %reason, "skipping lag candidate");
            }
            Err(e) => return Err(e),
        }
    }
    let (_, used_lag) = best.ok_or_else(|| SpreadError::DegenerateSeries {
        reason: "no lag order yields a non-singular regression".into(),
    })?;

    let (y, x) = regression_inputs(series, &diffs, used_lag, used_lag);
    let fit = ols::fit(&y, &x)?;
    // Column 1 is y_{t-1}; column 0 is the constant.
    let statistic = fit.t_value(1);
    if !statistic.is_finite() {
        return Err(SpreadError::DegenerateSeries {
            reason: format!("test statistic is not finite ({statistic})"),
        });
    }

    Ok(AdfOutcome {
        statistic,
        p_value: mackinnon::p_value(statistic),
        critical_values: mackinnon::critical_values(fit.nobs),
        used_lag,
        nobs: fit.nobs,
        aic: fit.aic,
    })
}

/// Response and design for `lag` augmentation terms on the sample that
/// starts after the first `trim` differences.
///
/// Row for difference index t (t >= trim): response dy_t, regressors
/// [1, y_t, dy_{t-1}, ..., dy_{t-lag}], where dy_t = y_{t+1} - y_t.
fn regression_inputs(series: &[f64], diffs: &[f64], trim: usize, lag: usize) -> (Vec<f64>, Design) {
    let rows = diffs.len() - trim;
    let mut y = Vec::with_capacity(rows);
    let mut x = Design::with_capacity(rows, TREND_TERMS + 1 + lag);
    let mut row = Vec::with_capacity(TREND_TERMS + 1 + lag);

    for t in trim..diffs.len() {
        row.clear();
        row.push(1.0);
        row.push(series[t]);
        row.extend((1..=lag).map(|k| diffs[t - k]));
        x.push_row(&row);
        y.push(diffs[t]);
    }

    (y, x)
}
