//! Persisted spread table port.
//!
//! This is the hand-off between building spreads and testing them; the
//! tester only ever sees what a `SpreadStore` returns.

use crate::domain::error::SpreadError;
use crate::domain::family::InstrumentFamily;
use crate::domain::spread::SpreadTable;

pub trait SpreadStore {
    fn load(&self, family: &InstrumentFamily) -> Result<SpreadTable, SpreadError>;

    fn save(&self, table: &SpreadTable) -> Result<(), SpreadError>;
}
