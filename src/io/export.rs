//! CSV export for flexibility tables.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::flex::record::{FLEX_COLUMNS, FlexTable};

/// Exports one device's flexibility table to a CSV file at the given path.
///
/// Writes a header row followed by one data row per time step. Column names
/// are the stable record schema prefixed with the timestep index. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(table: &FlexTable, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(table, buf)
}

/// Writes a flexibility table as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(table: &FlexTable, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    // Header: timestep plus the stable record columns
    let mut header = vec!["timestep"];
    header.extend_from_slice(FLEX_COLUMNS);
    wtr.write_record(&header)?;

    for (t, r) in table.records.iter().enumerate() {
        wtr.write_record(&[
            t.to_string(),
            format!("{:.4}", r.scheduled_power),
            format!("{:.4}", r.neg_power_delta),
            format!("{:.4}", r.pos_power_delta),
            format!("{:.4}", r.neg_energy),
            format!("{:.4}", r.pos_energy),
            format!("{:.4}", r.neg_price),
            format!("{:.4}", r.pos_price),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports every table into `dir` as `flex_<device>.csv`.
///
/// # Errors
///
/// Returns an `io::Error` if the directory cannot be created or any file
/// fails to write.
pub fn export_all(tables: &[FlexTable], dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    for table in tables {
        let path = dir.join(format!("flex_{}.csv", table.device));
        export_csv(table, &path)?;
    }
    Ok(())
}
