use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{info, warn};

use crate::dataset::schema::{self, ColumnType, TableSchema};
use crate::dataset::table::{Table, Value};
use crate::dataset::Datasets;
use crate::error::{PipelineError, Result};
use crate::ingest::event_log::EventLog;

/// Loads the four static tables from `data_dir` and the financial events
/// from the injected log.
pub fn load_datasets(data_dir: &Path, events: &dyn EventLog) -> Result<Datasets> {
    let artist = load_table(&data_dir.join(schema::ARTIST.source_file), &schema::ARTIST)?;
    let artwork = load_table(&data_dir.join(schema::ARTWORK.source_file), &schema::ARTWORK)?;
    let image_asset = load_table(
        &data_dir.join(schema::IMAGE_ASSET.source_file),
        &schema::IMAGE_ASSET,
    )?;
    let user = load_table(&data_dir.join(schema::USER.source_file), &schema::USER)?;
    let artwork_financial = events.load()?;

    Ok(Datasets {
        artist,
        artwork,
        image_asset,
        user,
        artwork_financial,
    })
}

pub fn load_table(path: &Path, schema: &TableSchema) -> Result<Table> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PipelineError::DatasetNotFound {
            dataset: schema.name.to_string(),
            path: path.to_path_buf(),
        },
        _ => PipelineError::schema(schema.name, format!("cannot open {}: {}", path.display(), e)),
    })?;

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| PipelineError::schema(schema.name, format!("unreadable header: {}", e)))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    if header.iter().all(|h| h.is_empty()) {
        return Err(PipelineError::schema(schema.name, "file has no header row"));
    }
    for (i, name) in header.iter().enumerate() {
        if header[..i].contains(name) {
            return Err(PipelineError::schema(
                schema.name,
                format!("duplicate column '{}'", name),
            ));
        }
    }
    for required in schema.required_columns() {
        if !header.iter().any(|h| h == required) {
            return Err(PipelineError::schema(
                schema.name,
                format!("missing column '{}'", required),
            ));
        }
    }

    let layout: Vec<(String, ColumnType, bool)> = header
        .iter()
        .map(|name| match schema.column(name) {
            Some(col) => (name.clone(), col.kind, col.required),
            None => (name.clone(), ColumnType::Text, false),
        })
        .collect();

    let mut table = Table::new(
        schema.name,
        layout.iter().map(|(n, k, _)| (n.clone(), *k)).collect(),
    );

    let mut coerced = 0usize;
    for (row_idx, record) in reader.records().enumerate() {
        // Header is line 1.
        let line = row_idx + 2;
        let record = record
            .map_err(|e| PipelineError::schema(schema.name, format!("line {}: {}", line, e)))?;

        let mut row = Vec::with_capacity(layout.len());
        for ((name, kind, required), raw) in layout.iter().zip(record.iter()) {
            let value = match Value::parse(raw, *kind) {
                Ok(v) => v,
                Err(reason) if *required => {
                    return Err(PipelineError::schema(
                        schema.name,
                        format!("line {}: column '{}': {}", line, name, reason),
                    ));
                }
                Err(reason) => {
                    warn!(
                        "{} line {}: column '{}': {}; treating as empty",
                        schema.name, line, name, reason
                    );
                    coerced += 1;
                    Value::Null
                }
            };

            if *required && value.is_null() {
                return Err(PipelineError::schema(
                    schema.name,
                    format!("line {}: empty value in required column '{}'", line, name),
                ));
            }
            row.push(value);
        }
        table.push_row(row);
    }

    info!("Loaded {}: columns={:?}", schema.name, table.columns());
    if coerced > 0 {
        warn!("{}: {} malformed cells coerced to empty", schema.name, coerced);
    }
    Ok(table)
}
