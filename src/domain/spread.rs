//! Spread table construction.
//!
//! The four legs of a family are inner-joined on `trade_date`: a date missing
//! from any leg drops the whole row, since a spread needs both of its legs on
//! the same day. Each surviving row carries the four closes and the six
//! pairwise differences `close_i - close_j` for `i < j`.

use crate::domain::batch::FamilyOutcome;
use crate::domain::contract::ContractSeries;
use crate::domain::error::SpreadError;
use crate::domain::family::{InstrumentFamily, LegPair, LEG_COUNT, PAIR_COUNT};
use crate::ports::data_port::ContractSource;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct SpreadRow {
    pub trade_date: NaiveDate,
    pub closes: [f64; LEG_COUNT],
    /// Indexed by [`LegPair::index`]. `None` marks a missing value in a
    /// persisted table.
    pub spreads: [Option<f64>; PAIR_COUNT],
}

impl SpreadRow {
    pub fn from_closes(trade_date: NaiveDate, closes: [f64; LEG_COUNT]) -> Self {
        let mut spreads = [None; PAIR_COUNT];
        for pair in LegPair::all() {
            spreads[pair.index()] = Some(closes[pair.near] - closes[pair.far]);
        }
        Self {
            trade_date,
            closes,
            spreads,
        }
    }

    pub fn spread(&self, pair: LegPair) -> Option<f64> {
        self.spreads[pair.index()]
    }
}

#[derive(Debug, Clone)]
pub struct SpreadTable {
    pub family: InstrumentFamily,
    pub rows: Vec<SpreadRow>,
}

impl SpreadTable {
    pub fn new(family: InstrumentFamily, rows: Vec<SpreadRow>) -> Self {
        Self { family, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.trade_date).collect()
    }

    pub fn closes(&self, leg: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r.closes[leg]).collect()
    }

    /// Spread values for one pair in date order, with missing and
    /// non-finite entries dropped.
    pub fn spread_series(&self, pair: LegPair) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|r| r.spread(pair))
            .filter(|v| v.is_finite())
            .collect()
    }
}

/// Join the four legs of `family` and derive every pairwise spread.
///
/// `legs` must hold exactly one series for each leg index 0..4, in any order.
pub fn build_spread_table(
    family: &InstrumentFamily,
    legs: &[ContractSeries],
) -> Result<SpreadTable, SpreadError> {
    let mut ordered: [Option<&ContractSeries>; LEG_COUNT] = [None; LEG_COUNT];
    for series in legs {
        if series.leg >= LEG_COUNT || ordered[series.leg].is_some() {
            return Err(SpreadError::Parse {
                source_name: family.raw_file_name(series.leg),
                reason: format!("leg {} supplied more than once or out of range", series.leg),
            });
        }
        ordered[series.leg] = Some(series);
    }

    let mut present = Vec::with_capacity(LEG_COUNT);
    for (leg, slot) in ordered.iter().enumerate() {
        match slot {
            Some(series) => present.push(*series),
            None => {
                return Err(SpreadError::SchemaMismatch {
                    source_name: family.raw_file_name(leg),
                    column: family.close_column(leg),
                });
            }
        }
    }

    let mut joined: Vec<(NaiveDate, [f64; LEG_COUNT])> = present[0]
        .bars()
        .iter()
        .map(|bar| {
            let mut closes = [0.0; LEG_COUNT];
            closes[0] = bar.close;
            (bar.trade_date, closes)
        })
        .collect();

    for series in &present[1..] {
        let index: HashMap<NaiveDate, f64> = series
            .bars()
            .iter()
            .map(|bar| (bar.trade_date, bar.close))
            .collect();
        joined.retain_mut(|(date, closes)| match index.get(date) {
            Some(&close) => {
                closes[series.leg] = close;
                true
            }
            None => false,
        });
    }

    let rows = joined
        .into_iter()
        .map(|(date, closes)| SpreadRow::from_closes(date, closes))
        .collect();

    Ok(SpreadTable::new(family.clone(), rows))
}

fn load_and_build(
    source: &dyn ContractSource,
    family: &InstrumentFamily,
) -> Result<SpreadTable, SpreadError> {
    let mut legs = Vec::with_capacity(LEG_COUNT);
    for leg in 0..LEG_COUNT {
        legs.push(source.load_leg(family, leg)?);
    }
    build_spread_table(family, &legs)
}

/// Build spread tables for every family; a failing family is recorded and
/// the rest proceed.
pub fn build_families(
    source: &dyn ContractSource,
    families: &[InstrumentFamily],
) -> Vec<FamilyOutcome<SpreadTable>> {
    families
        .iter()
        .map(|family| {
            info!(family = %family, "building spread table");
            let result = load_and_build(source, family);
            match &result {
                Ok(table) => info!(family = %family, rows = table.len(), "spread table built"),
                Err(e) => warn!(family = %family, error = %e, "failed to build spread table"),
            }
            FamilyOutcome::from_result(family.clone(), result)
        })
        .collect()
}
