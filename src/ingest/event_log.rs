use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::dataset::schema::{ARTWORK_FINANCIAL, FINANCIAL_HEADER};
use crate::dataset::table::{format_timestamp, Table, Value};
use crate::error::{PipelineError, Result};
use crate::ingest::loader::load_table;

/// Operator-supplied fields of a new financial event.
#[derive(Debug, Clone, Default)]
pub struct NewFinancialEvent {
    pub artwork_id: String,
    pub event_type: String,
    pub event_date: String,
    pub currency: String,
    pub price_amount: Option<f64>,
    pub buyer_name: String,
    pub seller_name: String,
    pub sale_location: String,
    pub source: String,
    pub notes: String,
}

impl NewFinancialEvent {
    fn validate(&self) -> Result<()> {
        let fields = [
            ("artwork_id", &self.artwork_id),
            ("event_type", &self.event_type),
            ("event_date", &self.event_date),
            ("currency", &self.currency),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(PipelineError::InvalidEvent(format!("{} must not be empty", name)));
            }
        }
        if let Some(price) = self.price_amount {
            if !price.is_finite() {
                return Err(PipelineError::InvalidEvent("price_amount must be finite".into()));
            }
        }
        Ok(())
    }
}

/// Append-only source of financial events. Existing events are never
/// rewritten; new ones get a fresh id.
pub trait EventLog {
    fn load(&self) -> Result<Table>;

    /// Appends one event and returns its generated id.
    fn append(&self, event: NewFinancialEvent) -> Result<String>;
}

pub struct CsvEventLog {
    path: PathBuf,
}

impl CsvEventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn existing_header(&self) -> Result<Option<Vec<String>>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PipelineError::schema(
                    ARTWORK_FINANCIAL.name,
                    format!("cannot read {}: {}", self.path.display(), e),
                ))
            }
        };
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);
        let header = reader
            .headers()
            .map_err(|e| PipelineError::schema(ARTWORK_FINANCIAL.name, e.to_string()))?;
        if header.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            header
                .iter()
                .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
                .collect(),
        ))
    }
}

impl EventLog for CsvEventLog {
    fn load(&self) -> Result<Table> {
        load_table(&self.path, &ARTWORK_FINANCIAL)
    }

    fn append(&self, event: NewFinancialEvent) -> Result<String> {
        event.validate()?;

        let id = Uuid::new_v4().to_string();
        let now = format_timestamp(&Utc::now().naive_utc());
        let price = event
            .price_amount
            .map(|p| Value::Decimal(p).to_string())
            .unwrap_or_default();

        let (header, write_header) = match self.existing_header()? {
            Some(h) => (h, false),
            None => (FINANCIAL_HEADER.iter().map(|s| s.to_string()).collect(), true),
        };

        let record: Vec<&str> = header
            .iter()
            .map(|column| match column.as_str() {
                "id" => id.as_str(),
                "artwork_id" => event.artwork_id.trim(),
                "event_type" => event.event_type.as_str(),
                "event_date" => event.event_date.trim(),
                "currency" => event.currency.as_str(),
                "price_amount" => price.as_str(),
                "buyer_name" => event.buyer_name.as_str(),
                "seller_name" => event.seller_name.as_str(),
                "sale_location" => event.sale_location.as_str(),
                "source" => event.source.as_str(),
                "notes" => event.notes.as_str(),
                "created_at" | "updated_at" => now.as_str(),
                _ => "",
            })
            .collect();

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PipelineError::write(&self.path, e))?;

        if write_header {
            // The file may exist but be empty.
            file.set_len(0).map_err(|e| PipelineError::write(&self.path, e))?;
        } else if !ends_with_newline(&mut file).map_err(|e| PipelineError::write(&self.path, e))? {
            file.write_all(b"\n")
                .map_err(|e| PipelineError::write(&self.path, e))?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if write_header {
            writer
                .write_record(&header)
                .map_err(|e| PipelineError::write(&self.path, e))?;
        }
        writer
            .write_record(&record)
            .map_err(|e| PipelineError::write(&self.path, e))?;
        writer.flush().map_err(|e| PipelineError::write(&self.path, e))?;

        info!("Recorded financial event {} for artwork {}", id, event.artwork_id.trim());
        Ok(id)
    }
}

fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
