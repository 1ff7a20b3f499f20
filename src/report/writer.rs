use std::fs;
use std::io::BufWriter;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::info;

use crate::dataset::table::Table;
use crate::error::{PipelineError, Result};
use crate::report::digest::HashingWriter;
use crate::transform::aggregate::ArtistSummary;

pub const SUMMARY_HEADER: [&str; 5] = [
    "artist_id",
    "name",
    "artwork_count",
    "total_price",
    "avg_price",
];

type CsvSink = csv::Writer<HashingWriter<BufWriter<NamedTempFile>>>;

#[derive(Debug, Clone, PartialEq)]
pub struct WrittenArtifact {
    pub path: PathBuf,
    pub rows: usize,
    pub sha256: String,
}

/// Writes pipeline outputs into one directory. Each artifact is staged in a
/// temporary file next to its target and renamed over it, so a failed write
/// leaves the previous artifact in place.
pub struct ReportWriter {
    out_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir).map_err(|e| PipelineError::write(&out_dir, e))?;
        Ok(Self { out_dir })
    }

    pub fn write_table(&self, table: &Table, file_name: &str) -> Result<WrittenArtifact> {
        self.write_atomic(file_name, table.len(), |writer| {
            writer.write_record(table.columns())?;
            for row in table.rows() {
                writer.write_record(row.iter().map(|v| v.to_string()))?;
            }
            Ok(())
        })
    }

    pub fn write_summary(&self, summary: &[ArtistSummary], file_name: &str) -> Result<WrittenArtifact> {
        self.write_atomic(file_name, summary.len(), |writer| {
            writer.write_record(SUMMARY_HEADER)?;
            for entry in summary {
                writer.serialize(entry)?;
            }
            Ok(())
        })
    }

    fn write_atomic<F>(&self, file_name: &str, rows: usize, fill: F) -> Result<WrittenArtifact>
    where
        F: FnOnce(&mut CsvSink) -> csv::Result<()>,
    {
        let target = self.out_dir.join(file_name);
        let fail = |e: std::io::Error| PipelineError::write(&target, e);

        let staged = NamedTempFile::new_in(&self.out_dir).map_err(fail)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(HashingWriter::new(BufWriter::new(staged)));

        fill(&mut writer).map_err(|e| fail(e.into()))?;

        let hashing = writer.into_inner().map_err(|e| fail(e.into_error()))?;
        let (buffered, sha256) = hashing.finish();
        let staged = buffered.into_inner().map_err(|e| fail(e.into_error()))?;
        staged.as_file().sync_all().map_err(fail)?;
        staged.persist(&target).map_err(|e| fail(e.error))?;

        info!("Saved {} ({} rows, sha256 {})", target.display(), rows, sha256);
        Ok(WrittenArtifact {
            path: target,
            rows,
            sha256,
        })
    }
}
