use std::collections::{BTreeSet, HashSet};

use crate::dataset::table::Table;
use crate::dataset::Datasets;

/// Key values that occur more than once in the column at `column_idx`, sorted.
pub fn duplicate_keys(table: &Table, column_idx: usize) -> BTreeSet<String> {
    let mut seen = HashSet::new();
    table
        .rows()
        .iter()
        .filter_map(|row| row[column_idx].as_key())
        .filter(|key| !seen.insert(key.clone()))
        .collect()
}

pub fn not_unique_warning(table: &Table, column: &str, duplicates: BTreeSet<String>) -> String {
    format!(
        "{}.{} is not unique: {{{}}}",
        table.name(),
        column,
        duplicates.into_iter().collect::<Vec<_>>().join(", ")
    )
}

/// Primary keys of the reference tables. A repeated key fans every matching
/// artwork out once per copy, so each one is reported.
pub fn validate_keys(data: &Datasets) -> Vec<String> {
    let keys = [
        (&data.artist, "artist_id"),
        (&data.artwork, "artwork_id"),
        (&data.image_asset, "image_id"),
    ];

    keys.into_iter()
        .filter_map(|(table, column)| {
            let Some(idx) = table.column_index(column) else {
                return Some(format!("{}.{}: not checked (column missing)", table.name(), column));
            };
            let duplicates = duplicate_keys(table, idx);
            (!duplicates.is_empty()).then(|| not_unique_warning(table, column, duplicates))
        })
        .collect()
}
