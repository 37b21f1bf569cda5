//! CSV persistence for spread tables.
//!
//! Layout of `<symbol>_spread.csv`:
//! `trade_date,close_<s>0..close_<s>3,price_spread_0_1..price_spread_2_3`
//! with ISO dates. Floats are written in shortest round-trip form so a
//! reload reproduces every value exactly; an empty spread cell loads as
//! missing.

use crate::adapters::csv_adapter::{column_index, open_reader, parse_f64};
use crate::domain::contract::parse_trade_date;
use crate::domain::error::SpreadError;
use crate::domain::family::{InstrumentFamily, LegPair, LEG_COUNT, PAIR_COUNT};
use crate::domain::spread::{SpreadRow, SpreadTable};
use crate::ports::spread_port::SpreadStore;
use std::fs;
use std::path::PathBuf;

pub struct CsvSpreadStore {
    base_path: PathBuf,
}

impl CsvSpreadStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn csv_path(&self, family: &InstrumentFamily) -> PathBuf {
        self.base_path.join(family.spread_file_name())
    }
}

fn header(family: &InstrumentFamily) -> Vec<String> {
    let mut cols = Vec::with_capacity(1 + LEG_COUNT + PAIR_COUNT);
    cols.push("trade_date".to_string());
    cols.extend((0..LEG_COUNT).map(|leg| family.close_column(leg)));
    cols.extend(LegPair::all().iter().map(|p| p.column_name()));
    cols
}

impl SpreadStore for CsvSpreadStore {
    fn load(&self, family: &InstrumentFamily) -> Result<SpreadTable, SpreadError> {
        let path = self.csv_path(family);
        let source_name = family.spread_file_name();
        let mut rdr = open_reader(&path)?;

        let headers = rdr.headers()?.clone();
        let date_idx = column_index(&headers, "trade_date", &source_name)?;
        let mut close_idx = [0usize; LEG_COUNT];
        for (leg, idx) in close_idx.iter_mut().enumerate() {
            *idx = column_index(&headers, &family.close_column(leg), &source_name)?;
        }
        let mut spread_idx = [0usize; PAIR_COUNT];
        for pair in LegPair::all() {
            spread_idx[pair.index()] = column_index(&headers, &pair.column_name(), &source_name)?;
        }

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let field = |idx: usize| record.get(idx).unwrap_or_default();

            let trade_date = parse_trade_date(field(date_idx)).ok_or_else(|| SpreadError::Parse {
                source_name: source_name.clone(),
                reason: format!("invalid trade_date '{}'", field(date_idx)),
            })?;

            let mut closes = [0.0; LEG_COUNT];
            for leg in 0..LEG_COUNT {
                closes[leg] = parse_f64(field(close_idx[leg]), &family.close_column(leg), &source_name)?;
            }

            let mut spreads = [None; PAIR_COUNT];
            for pair in LegPair::all() {
                let raw = field(spread_idx[pair.index()]);
                spreads[pair.index()] = if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
                    None
                } else {
                    Some(parse_f64(raw, &pair.column_name(), &source_name)?)
                };
            }

            rows.push(SpreadRow {
                trade_date,
                closes,
                spreads,
            });
        }

        rows.sort_by_key(|r| r.trade_date);
        if let Some(pair) = rows.windows(2).find(|w| w[0].trade_date == w[1].trade_date) {
            return Err(SpreadError::DuplicateDate {
                source_name,
                date: pair[0].trade_date,
            });
        }
        Ok(SpreadTable::new(family.clone(), rows))
    }

    fn save(&self, table: &SpreadTable) -> Result<(), SpreadError> {
        fs::create_dir_all(&self.base_path)?;
        let mut wtr = csv::Writer::from_path(self.csv_path(&table.family))?;
        wtr.write_record(header(&table.family))?;

        let mut record: Vec<String> = Vec::with_capacity(1 + LEG_COUNT + PAIR_COUNT);
        for row in &table.rows {
            record.clear();
            record.push(row.trade_date.format("%Y-%m-%d").to_string());
            record.extend(row.closes.iter().map(|c| c.to_string()));
            record.extend(
                row.spreads
                    .iter()
                    .map(|s| s.map(|v| v.to_string()).unwrap_or_default()),
            );
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
