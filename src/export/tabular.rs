use crate::config::SizeUnit;
use crate::walker::FileRecord;
use std::io::Write;

/// Fixed header row of the tabular artifact
pub const HEADERS: [&str; 3] = ["Path", "Metrics", "Code"];

/// Writes one `Path, Metrics, Code` row per record
pub struct TabularExporter {
    unit: SizeUnit,
}

impl TabularExporter {
    pub fn new(unit: SizeUnit) -> Self {
        Self { unit }
    }

    pub fn write<W: Write>(&self, records: &[FileRecord], out: W) -> Result<(), csv::Error> {
        let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(out);
        wtr.write_record(HEADERS)?;

        for record in records {
            wtr.write_record([
                record.display_path.as_str(),
                record.metrics_string(self.unit).as_str(),
                record.content.as_str(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }
}
