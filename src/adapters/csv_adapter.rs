//! Raw per-leg CSV contract source.
//!
//! One file per leg, named `<SYMBOL>0<leg>.csv` (e.g. `IF00.csv`). Only the
//! `trade_date` and `close` columns are read; any other columns of the
//! exporter's format are ignored.

use crate::domain::contract::{parse_trade_date, ContractBar, ContractSeries};
use crate::domain::error::SpreadError;
use crate::domain::family::InstrumentFamily;
use crate::ports::data_port::ContractSource;
use std::fs::File;
use std::path::{Path, PathBuf};

pub struct CsvContractSource {
    base_path: PathBuf,
}

impl CsvContractSource {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, family: &InstrumentFamily, leg: usize) -> PathBuf {
        self.base_path.join(family.raw_file_name(leg))
    }
}

/// Open `path` as a headed CSV reader, mapping a missing file to
/// `DataUnavailable`.
pub(crate) fn open_reader(path: &Path) -> Result<csv::Reader<File>, SpreadError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SpreadError::DataUnavailable {
            path: path.display().to_string(),
        },
        _ => SpreadError::Io(e),
    })?;
    Ok(csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file))
}

/// Position of `column` in the header, ignoring a leading byte-order mark.
pub(crate) fn column_index(
    headers: &csv::StringRecord,
    column: &str,
    source_name: &str,
) -> Result<usize, SpreadError> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == column)
        .ok_or_else(|| SpreadError::SchemaMismatch {
            source_name: source_name.to_string(),
            column: column.to_string(),
        })
}

pub(crate) fn parse_f64(value: &str, column: &str, source_name: &str) -> Result<f64, SpreadError> {
    value.parse().map_err(|e| SpreadError::Parse {
        source_name: source_name.to_string(),
        reason: format!("invalid {column} value '{value}': {e}"),
    })
}

impl ContractSource for CsvContractSource {
    fn load_leg(
        &self,
        family: &InstrumentFamily,
        leg: usize,
    ) -> Result<ContractSeries, SpreadError> {
        let path = self.csv_path(family, leg);
        let source_name = family.raw_file_name(leg);
        let mut rdr = open_reader(&path)?;

        let headers = rdr.headers()?.clone();
        let date_idx = column_index(&headers, "trade_date", &source_name)?;
        let close_idx = column_index(&headers, "close", &source_name)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let date_str = record.get(date_idx).unwrap_or_default();
            let trade_date = parse_trade_date(date_str).ok_or_else(|| SpreadError::Parse {
                source_name: source_name.clone(),
                reason: format!("invalid trade_date '{date_str}'"),
            })?;
            let close = parse_f64(record.get(close_idx).unwrap_or_default(), "close", &source_name)?;
            bars.push(ContractBar { trade_date, close });
        }

        ContractSeries::new(family.clone(), leg, bars)
    }
}
