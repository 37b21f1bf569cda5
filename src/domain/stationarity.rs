//! Stationarity testing of spread tables.
//!
//! Each of a family's six spreads gets an ADF test; a spread is judged
//! stationary when the unit-root null is rejected at [`SIGNIFICANCE_LEVEL`].
//! Failures are isolated per family: the batch always runs to the end.

use crate::domain::adf::{adf_test, AdfOutcome};
use crate::domain::batch::FamilyOutcome;
use crate::domain::error::SpreadError;
use crate::domain::family::{InstrumentFamily, LegPair};
use crate::domain::mackinnon::CriticalValues;
use crate::domain::spread::SpreadTable;
use crate::ports::spread_port::SpreadStore;
use tracing::{info, warn};

pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AdfSettings {
    /// Upper bound for the AIC lag search; `None` picks it from the sample size.
    pub max_lag: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdfResult {
    pub pair: LegPair,
    pub statistic: f64,
    pub p_value: f64,
    pub critical_values: CriticalValues,
    pub is_stationary: bool,
    pub used_lag: usize,
    pub nobs: usize,
}

impl AdfResult {
    pub fn from_outcome(pair: LegPair, outcome: AdfOutcome) -> Self {
        Self {
            pair,
            statistic: outcome.statistic,
            p_value: outcome.p_value,
            critical_values: outcome.critical_values,
            is_stationary: outcome.p_value <= SIGNIFICANCE_LEVEL,
            used_lag: outcome.used_lag,
            nobs: outcome.nobs,
        }
    }
}

pub fn test_spread(
    table: &SpreadTable,
    pair: LegPair,
    settings: &AdfSettings,
) -> Result<AdfResult, SpreadError> {
    let series = table.spread_series(pair);
    let outcome = adf_test(&series, settings.max_lag)?;
    Ok(AdfResult::from_outcome(pair, outcome))
}

/// One result per pair, in [`LegPair::all`] order. The first failing pair
/// fails the whole table.
pub fn test_spread_table(
    table: &SpreadTable,
    settings: &AdfSettings,
) -> Result<Vec<AdfResult>, SpreadError> {
    LegPair::all()
        .into_iter()
        .map(|pair| test_spread(table, pair, settings))
        .collect()
}

pub fn analyze_family(
    store: &dyn SpreadStore,
    family: &InstrumentFamily,
    settings: &AdfSettings,
) -> Result<Vec<AdfResult>, SpreadError> {
    let table = store.load(family)?;
    test_spread_table(&table, settings)
}

pub fn analyze_families(
    store: &dyn SpreadStore,
    families: &[InstrumentFamily],
    settings: &AdfSettings,
) -> Vec<FamilyOutcome<Vec<AdfResult>>> {
    families
        .iter()
        .map(|family| {
            info!(family = %family, "analyzing spread combinations");
            let result = analyze_family(store, family, settings);
            match &result {
                Ok(results) => {
                    let stationary = results.iter().filter(|r| r.is_stationary).count();
                    info!(
                        family = %family,
                        pairs = results.len(),
                        stationary,
                        "analysis complete"
                    );
                }
                Err(e) => warn!(family = %family, error = %e, "analysis failed"),
            }
            FamilyOutcome::from_result(family.clone(), result)
        })
        .collect()
}
