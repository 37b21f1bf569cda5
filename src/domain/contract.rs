//! Per-leg daily close series.

use crate::domain::error::SpreadError;
use crate::domain::family::{InstrumentFamily, LEG_COUNT};
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractBar {
    pub trade_date: NaiveDate,
    pub close: f64,
}

/// One leg's observations, ascending by `trade_date` with no duplicates.
#[derive(Debug, Clone)]
pub struct ContractSeries {
    pub family: InstrumentFamily,
    pub leg: usize,
    bars: Vec<ContractBar>,
}

impl ContractSeries {
    pub fn new(
        family: InstrumentFamily,
        leg: usize,
        mut bars: Vec<ContractBar>,
    ) -> Result<Self, SpreadError> {
        if leg >= LEG_COUNT {
            return Err(SpreadError::Parse {
                source_name: family.raw_file_name(leg),
                reason: format!("leg index {leg} out of range 0..{LEG_COUNT}"),
            });
        }

        bars.sort_by_key(|b| b.trade_date);
        if let Some(pair) = bars.windows(2).find(|w| w[0].trade_date == w[1].trade_date) {
            return Err(SpreadError::DuplicateDate {
                source_name: family.raw_file_name(leg),
                date: pair[0].trade_date,
            });
        }

        Ok(Self { family, leg, bars })
    }

    pub fn bars(&self) -> &[ContractBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Parse a trade date in raw (`20240102`) or ISO (`2024-01-02`, optionally
/// with a time part) form.
pub fn parse_trade_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn family() -> InstrumentFamily {
        InstrumentFamily::new("if").unwrap()
    }

    #[test]
    fn new_sorts_ascending() {
        let bars = vec![
            ContractBar { trade_date: d(2024, 1, 4), close: 3.0 },
            ContractBar { trade_date: d(2024, 1, 2), close: 1.0 },
            ContractBar { trade_date: d(2024, 1, 3), close: 2.0 },
        ];
        let series = ContractSeries::new(family(), 0, bars).unwrap();
        let closes: Vec<f64> = series.bars().iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn new_rejects_duplicate_dates() {
        let bars = vec![
            ContractBar { trade_date: d(2024, 1, 2), close: 1.0 },
            ContractBar { trade_date: d(2024, 1, 2), close: 2.0 },
        ];
        let err = ContractSeries::new(family(), 1, bars).unwrap_err();
        assert!(matches!(
            err,
            SpreadError::DuplicateDate { ref source_name, date }
                if source_name == "IF01.csv" && date == d(2024, 1, 2)
        ));
    }

    #[test]
    fn new_rejects_out_of_range_leg() {
        let err = ContractSeries::new(family(), 4, Vec::new()).unwrap_err();
        assert!(matches!(err, SpreadError::Parse { .. }));
    }

    #[test]
    fn parse_trade_date_formats() {
        assert_eq!(parse_trade_date("20240102"), Some(d(2024, 1, 2)));
        assert_eq!(parse_trade_date("2024-01-02"), Some(d(2024, 1, 2)));
        assert_eq!(parse_trade_date("2024-01-02 00:00:00"), Some(d(2024, 1, 2)));
        assert_eq!(parse_trade_date("02/01/2024"), None);
        assert_eq!(parse_trade_date(""), None);
    }
}
