#![allow(dead_code)]

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spreadcheck::domain::contract::{ContractBar, ContractSeries};
use spreadcheck::domain::error::SpreadError;
use spreadcheck::domain::family::{InstrumentFamily, LEG_COUNT};
use spreadcheck::domain::spread::SpreadTable;
use spreadcheck::ports::data_port::ContractSource;
use spreadcheck::ports::spread_port::SpreadStore;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct MockContractSource {
    pub legs: HashMap<(String, usize), Vec<ContractBar>>,
}

impl MockContractSource {
    pub fn new() -> Self {
        Self {
            legs: HashMap::new(),
        }
    }

    pub fn with_leg(mut self, symbol: &str, leg: usize, bars: Vec<ContractBar>) -> Self {
        self.legs.insert((symbol.to_string(), leg), bars);
        self
    }

    pub fn with_family(mut self, symbol: &str, closes: &[[f64; LEG_COUNT]]) -> Self {
        for leg in 0..LEG_COUNT {
            let bars = closes
                .iter()
                .enumerate()
                .map(|(i, c)| ContractBar {
                    trade_date: day(i),
                    close: c[leg],
                })
                .collect();
            self.legs.insert((symbol.to_string(), leg), bars);
        }
        self
    }
}

impl ContractSource for MockContractSource {
    fn load_leg(
        &self,
        family: &InstrumentFamily,
        leg: usize,
    ) -> Result<ContractSeries, SpreadError> {
        match self.legs.get(&(family.symbol().to_string(), leg)) {
            Some(bars) => ContractSeries::new(family.clone(), leg, bars.clone()),
            None => Err(SpreadError::DataUnavailable {
                path: family.raw_file_name(leg),
            }),
        }
    }
}

/// In-memory spread store.
pub struct MemorySpreadStore {
    pub tables: RefCell<HashMap<String, SpreadTable>>,
}

impl MemorySpreadStore {
    pub fn new() -> Self {
        Self {
            tables: RefCell::new(HashMap::new()),
        }
    }
}

impl SpreadStore for MemorySpreadStore {
    fn load(&self, family: &InstrumentFamily) -> Result<SpreadTable, SpreadError> {
        self.tables
            .borrow()
            .get(family.symbol())
            .cloned()
            .ok_or_else(|| SpreadError::DataUnavailable {
                path: family.spread_file_name(),
            })
    }

    fn save(&self, table: &SpreadTable) -> Result<(), SpreadError> {
        self.tables
            .borrow_mut()
            .insert(table.family.symbol().to_string(), table.clone());
        Ok(())
    }
}

/// Consecutive calendar days from 2022-01-03.
pub fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 3).unwrap() + chrono::Days::new(i as u64)
}

pub fn gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Four legs sharing a random-walk level, each offset by a fixed basis plus
/// independent noise, so every spread mean-reverts.
pub fn cointegrated_legs(seed: u64, n: usize) -> Vec<[f64; LEG_COUNT]> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut level = 4000.0;
    (0..n)
        .map(|_| {
            level += 20.0 * gaussian(&mut rng);
            let mut closes = [0.0; LEG_COUNT];
            for (leg, close) in closes.iter_mut().enumerate() {
                *close = level - 15.0 * leg as f64 + 2.0 * gaussian(&mut rng);
            }
            closes
        })
        .collect()
}

/// Four independent random walks: no spread mean-reverts.
pub fn independent_walks(seed: u64, n: usize) -> Vec<[f64; LEG_COUNT]> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut levels = [4000.0, 3990.0, 3975.0, 3960.0];
    (0..n)
        .map(|_| {
            for level in levels.iter_mut() {
                *level += 10.0 * gaussian(&mut rng);
            }
            levels
        })
        .collect()
}

/// Write one family's raw per-leg files (`<SYM>0<leg>.csv`) in the exporter's
/// layout: newest first, `YYYYMMDD` dates, extra columns.
pub fn write_raw_family(dir: &Path, symbol: &str, closes: &[[f64; LEG_COUNT]]) {
    let upper = symbol.to_uppercase();
    for leg in 0..LEG_COUNT {
        let mut content = String::from("ts_code,trade_date,open,close,vol\n");
        for (i, c) in closes.iter().enumerate().rev() {
            content.push_str(&format!(
                "{upper}{leg}.CFX,{},{},{},100\n",
                day(i).format("%Y%m%d"),
                c[leg] - 1.0,
                c[leg]
            ));
        }
        fs::write(dir.join(format!("{upper}0{leg}.csv")), content).unwrap();
    }
}
