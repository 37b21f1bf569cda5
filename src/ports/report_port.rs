//! Summary report port.

use crate::domain::error::SpreadError;
use crate::domain::summary::{Locale, SummaryRow};
use std::path::Path;

/// Port for persisting the stationarity summary table.
pub trait ReportPort {
    fn write(
        &self,
        rows: &[SummaryRow],
        locale: Locale,
        output_path: &Path,
    ) -> Result<(), SpreadError>;

    fn read(&self, input_path: &Path) -> Result<Vec<SummaryRow>, SpreadError>;
}
