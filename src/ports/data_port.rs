//! Raw contract data access port.

use crate::domain::contract::ContractSeries;
use crate::domain::error::SpreadError;
use crate::domain::family::InstrumentFamily;

pub trait ContractSource {
    /// Load one leg's daily close series. A missing source is
    /// `SpreadError::DataUnavailable`.
    fn load_leg(
        &self,
        family: &InstrumentFamily,
        leg: usize,
    ) -> Result<ContractSeries, SpreadError>;
}
