//! CSV output of extracted steps.
//!
//! Files are opened in append mode so several runs (one per plans section)
//! can accumulate into one sheet. The `page,step,text` header is written only
//! when the file is empty.

use std::fs::OpenOptions;
use std::path::Path;

use csv::WriterBuilder;
use plansteps_core::types::StepRecord;

use crate::error::Error;

const HEADER: [&str; 3] = ["page", "step", "text"];

/// Append `records` to the CSV at `path`, creating it if needed.
///
/// Returns the number of rows written, header excluded.
pub fn append_records(path: &Path, records: &[StepRecord]) -> Result<usize, Error> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::Output(format!("{}: {}", path.display(), e)))?;

    let is_new_file = file
        .metadata()
        .map_err(|e| Error::Output(format!("{}: {}", path.display(), e)))?
        .len()
        == 0;

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    if is_new_file {
        writer
            .write_record(HEADER)
            .map_err(|e| Error::Output(e.to_string()))?;
    }

    for record in records {
        writer
            .serialize(record)
            .map_err(|e| Error::Output(e.to_string()))?;
    }

    writer.flush().map_err(|e| Error::Output(e.to_string()))?;

    log::debug!("wrote {} rows to {}", records.len(), path.display());
    Ok(records.len())
}
