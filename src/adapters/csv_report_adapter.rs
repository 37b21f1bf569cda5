//! Delimited-text summary report.
//!
//! The file starts with a UTF-8 byte-order mark so spreadsheet tools pick the
//! right encoding for the localized headers.

use crate::domain::error::SpreadError;
use crate::domain::summary::{Locale, SummaryRow, COLUMN_COUNT};
use crate::ports::report_port::ReportPort;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

const BOM: &str = "\u{feff}";

pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        rows: &[SummaryRow],
        locale: Locale,
        output_path: &Path,
    ) -> Result<(), SpreadError> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = BufWriter::new(File::create(output_path)?);
        file.write_all(BOM.as_bytes())?;

        let mut wtr = csv::Writer::from_writer(file);
        wtr.write_record(locale.headers())?;
        for row in rows {
            wtr.write_record(row.fields())?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn read(&self, input_path: &Path) -> Result<Vec<SummaryRow>, SpreadError> {
        let content = fs::read_to_string(input_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SpreadError::DataUnavailable {
                path: input_path.display().to_string(),
            },
            _ => SpreadError::Io(e),
        })?;
        let body = content.strip_prefix(BOM).unwrap_or(&content);

        let mut rdr = csv::Reader::from_reader(body.as_bytes());
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            if record.len() != COLUMN_COUNT {
                return Err(SpreadError::Parse {
                    source_name: input_path.display().to_string(),
                    reason: format!("expected {COLUMN_COUNT} fields, found {}", record.len()),
                });
            }
            let fields: [String; COLUMN_COUNT] =
                std::array::from_fn(|i| record.get(i).unwrap_or_default().to_string());
            rows.push(SummaryRow::from_fields(fields));
        }
        Ok(rows)
    }
}
