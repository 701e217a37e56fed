use crate::domain::operation::OperationLogEntry;
use crate::error::Result;
use std::io::Write;

pub const HEADER: [&str; 3] = ["user_id", "operation_type", "operation_date"];

/// Writes the operation log as CSV.
///
/// The header row is always written, so an empty log still yields a valid
/// file.
pub struct OperationWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OperationWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        Self { writer }
    }

    pub fn write_entries(&mut self, entries: &[OperationLogEntry]) -> Result<()> {
        self.writer.write_record(HEADER)?;
        for entry in entries {
            self.writer.serialize(entry)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
