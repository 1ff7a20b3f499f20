use std::collections::HashMap;

use tracing::{debug, info};

use crate::dataset::schema::ColumnType;
use crate::dataset::table::{Table, Value};
use crate::dataset::Datasets;
use crate::error::{PipelineError, Result};

pub const ENRICHED_TABLE: &str = "artworks_enriched";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Unmatched left rows are dropped.
    Inner,
    /// Unmatched left rows are kept once with every right column empty.
    Left,
}

#[derive(Debug, Clone, Copy)]
pub struct JoinSpec<'a> {
    pub left_on: &'a str,
    pub right_on: &'a str,
    pub kind: JoinKind,
    /// Appended to right-hand column names that collide with an output column.
    pub suffix: &'a str,
}

/// Stable equi-join. Output rows follow the left table's order; the matches
/// for one left row are contiguous and in right-table order. Left columns keep
/// their names, and a right key column with the same name as the left key is
/// merged into it.
pub fn join(left: &Table, right: &Table, spec: &JoinSpec) -> Result<Table> {
    let left_key = left.require_column(spec.left_on)?;
    let right_key = right.require_column(spec.right_on)?;
    let merge_key = spec.left_on == spec.right_on;

    let mut columns: Vec<(String, ColumnType)> = left
        .columns()
        .iter()
        .cloned()
        .zip(left.kinds().iter().copied())
        .collect();

    let mut carried = Vec::new();
    for (idx, (name, kind)) in right.columns().iter().zip(right.kinds()).enumerate() {
        if merge_key && idx == right_key {
            continue;
        }
        let mut out_name = name.clone();
        while columns.iter().any(|(existing, _)| *existing == out_name) {
            out_name.push_str(spec.suffix);
        }
        columns.push((out_name, *kind));
        carried.push(idx);
    }

    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, row) in right.rows().iter().enumerate() {
        if let Some(key) = row[right_key].as_key() {
            index.entry(key).or_default().push(i);
        }
    }

    let mut out = Table::new(format!("{}+{}", left.name(), right.name()), columns);
    for row in left.rows() {
        let matches = row[left_key].as_key().and_then(|key| index.get(&key));
        match (matches, spec.kind) {
            (Some(hits), _) => {
                for &hit in hits {
                    let right_row = &right.rows()[hit];
                    let mut merged = row.clone();
                    merged.extend(carried.iter().map(|&i| right_row[i].clone()));
                    out.push_row(merged);
                }
            }
            (None, JoinKind::Left) => {
                let mut merged = row.clone();
                merged.extend(std::iter::repeat(Value::Null).take(carried.len()));
                out.push_row(merged);
            }
            (None, JoinKind::Inner) => {}
        }
    }

    debug!(
        "{:?} join {} ({}) x {} ({}) on {}={} -> {} rows",
        spec.kind,
        left.name(),
        left.len(),
        right.name(),
        right.len(),
        spec.left_on,
        spec.right_on,
        out.len()
    );
    Ok(out)
}

/// The enriched record set.
#[derive(Debug, Clone)]
pub struct Enriched {
    pub table: Table,
    /// Output column carrying the artist's `name`. It is `name_artist` when
    /// artwork.csv has a `name` column of its own.
    pub artist_name_column: String,
}

/// Builds the enriched record set: artworks with their artist, their primary
/// image, and one row per financial event (or one row with empty financial
/// columns when an artwork has none).
pub fn enrich(data: &Datasets) -> Result<Enriched> {
    data.artist.require_column("name")?;
    let with_artist = join(
        &data.artwork,
        &data.artist,
        &JoinSpec {
            left_on: "artist_id",
            right_on: "artist_id",
            kind: JoinKind::Inner,
            suffix: "_artist",
        },
    )?;
    // Right columns land after the left ones, in order, minus the merged key.
    let name_slot = data
        .artist
        .columns()
        .iter()
        .filter(|c| *c != "artist_id")
        .position(|c| c == "name")
        .map(|pos| data.artwork.columns().len() + pos);
    let artist_name_column = match name_slot.and_then(|i| with_artist.columns().get(i)) {
        Some(column) => column.clone(),
        None => {
            return Err(PipelineError::MissingColumn {
                table: with_artist.name().to_string(),
                column: "name".to_string(),
            })
        }
    };

    let with_image = join(
        &with_artist,
        &data.image_asset,
        &JoinSpec {
            left_on: "image_primary_id",
            right_on: "image_id",
            kind: JoinKind::Inner,
            suffix: "_image",
        },
    )?;

    let mut enriched = join(
        &with_image,
        &data.artwork_financial,
        &JoinSpec {
            left_on: "artwork_id",
            right_on: "artwork_id",
            kind: JoinKind::Left,
            suffix: "_financial",
        },
    )?;
    enriched.rename(ENRICHED_TABLE);

    let dropped = data.artwork.len().saturating_sub(with_image.len());
    info!(
        "Enriched {} artworks into {} rows ({} artworks dropped without artist or primary image)",
        with_image.len(),
        enriched.len(),
        dropped
    );
    Ok(Enriched {
        table: enriched,
        artist_name_column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use anyhow::Result;

    fn ids(table: &Table, column: &str) -> Vec<String> {
        table
            .column_values(column)
            .unwrap()
            .map(|v| v.to_string())
            .collect()
    }

    #[test]
    fn one_row_per_event_and_one_for_artworks_without_events() -> Result<()> {
        let enriched = enrich(&Fixture::sample()?.load()?)?.table;

        assert_eq!(enriched.name(), ENRICHED_TABLE);
        assert_eq!(ids(&enriched, "artwork_id"), ["10", "10", "11", "12"]);
        assert_eq!(ids(&enriched, "id"), ["e1", "e2", "", "e3"]);

        let lonely = 2;
        for column in ["id", "event_type", "price_amount", "currency", "created_at"] {
            assert!(enriched.get(lonely, column).unwrap().is_null(), "{}", column);
        }
        Ok(())
    }

    #[test]
    fn fan_out_rows_repeat_non_financial_columns() -> Result<()> {
        let data = Fixture::sample()?.load()?;
        let enriched = enrich(&data)?.table;

        let financial_start = enriched.columns().len() - (data.artwork_financial.columns().len() - 1);
        let rows = enriched.rows();
        assert_eq!(rows[0][..financial_start], rows[1][..financial_start]);
        assert_ne!(rows[0][financial_start..], rows[1][financial_start..]);
        Ok(())
    }

    #[test]
    fn collisions_get_suffixed_and_keys_merge() -> Result<()> {
        let enriched = enrich(&Fixture::sample()?.load()?)?.table;
        let columns = enriched.columns();

        assert_eq!(columns.iter().filter(|c| *c == "artwork_id").count(), 1);
        assert_eq!(columns.iter().filter(|c| *c == "artist_id").count(), 1);
        assert!(columns.contains(&"artwork_id_image".to_string()));
        assert!(columns.contains(&"image_id".to_string()));
        assert!(columns.contains(&"name".to_string()));
        assert_eq!(enriched.get(0, "artwork_id_image"), Some(&Value::Text("10".into())));
        Ok(())
    }

    #[test]
    fn drops_artworks_without_artist_or_primary_image() -> Result<()> {
        let fixture = Fixture::sample()?;
        fixture.write(
            "artwork.csv",
            "artwork_id,artist_id,image_primary_id,storage_key\n\
             10,1,100,a.jpg\n\
             20,99,101,\n\
             21,1,,\n\
             22,2,555,\n\
             12,2,102,\n",
        )?;

        let enriched = enrich(&fixture.load()?)?.table;
        assert_eq!(ids(&enriched, "artwork_id"), ["10", "10", "12"]);
        for row in 0..enriched.len() {
            assert!(!enriched.get(row, "name").unwrap().is_null());
            assert!(!enriched.get(row, "image_id").unwrap().is_null());
        }
        Ok(())
    }

    #[test]
    fn worked_example_fans_out_two_rows() -> Result<()> {
        let fixture = Fixture::empty()?;
        fixture.write("artist.csv", "artist_id,name\n1,A\n")?;
        fixture.write("artwork.csv", "artwork_id,artist_id,image_primary_id\n10,1,100\n")?;
        fixture.write("image_asset.csv", "image_id,artwork_id\n100,10\n")?;
        fixture.write("user.csv", "user_id\n")?;
        fixture.write(
            "artwork_financial.csv",
            "id,artwork_id,price_amount\nf1,10,500\nf2,10,700\n",
        )?;

        let enriched = enrich(&fixture.load()?)?;
        assert_eq!(enriched.artist_name_column, "name");
        let enriched = enriched.table;
        assert_eq!(
            enriched.columns(),
            [
                "artwork_id",
                "artist_id",
                "image_primary_id",
                "name",
                "image_id",
                "artwork_id_image",
                "id",
                "price_amount"
            ]
        );
        assert_eq!(enriched.len(), 2);
        assert_eq!(ids(&enriched, "price_amount"), ["500", "700"]);
        Ok(())
    }

    #[test]
    fn artwork_name_column_pushes_artist_name_aside() -> Result<()> {
        let fixture = Fixture::sample()?;
        fixture.write(
            "artwork.csv",
            "artwork_id,artist_id,image_primary_id,name
10,1,100,Harbor piece
",
        )?;

        let enriched = enrich(&fixture.load()?)?;
        assert_eq!(enriched.artist_name_column, "name_artist");
        let table = &enriched.table;
        assert_eq!(table.get(0, "name"), Some(&Value::Text("Harbor piece".into())));
        assert_eq!(table.get(0, "name_artist"), Some(&Value::Text("Alice Arden".into())));
        Ok(())
    }

    #[test]
    fn float_formatted_image_id_still_joins() -> Result<()> {
        let fixture = Fixture::sample()?;
        fixture.write(
            "artwork.csv",
            "artwork_id,artist_id,image_primary_id
10,1,100.0
11.0,1,101
",
        )?;

        let data = fixture.load()?;
        let enriched = enrich(&data)?.table;
        assert_eq!(ids(&enriched, "artwork_id"), ["10", "10", "11"]);
        assert_eq!(ids(&enriched, "image_id"), ["100", "100", "101"]);
        Ok(())
    }

    #[test]
    fn join_rejects_unknown_key_column() {
        let left = Table::new("l", vec![("a".into(), ColumnType::Id)]);
        let right = Table::new("r", vec![("b".into(), ColumnType::Id)]);
        let spec = JoinSpec {
            left_on: "a",
            right_on: "missing",
            kind: JoinKind::Inner,
            suffix: "_r",
        };
        assert!(join(&left, &right, &spec).is_err());
    }

    #[test]
    fn left_join_keeps_left_order_and_duplicate_matches() {
        let mut left = Table::new("l", vec![("k".into(), ColumnType::Id), ("v".into(), ColumnType::Text)]);
        left.push_row(vec![Value::Text("b".into()), Value::Text("first".into())]);
        left.push_row(vec![Value::Null, Value::Text("keyless".into())]);
        left.push_row(vec![Value::Text("a".into()), Value::Text("second".into())]);

        let mut right = Table::new("r", vec![("k".into(), ColumnType::Id), ("v".into(), ColumnType::Text)]);
        right.push_row(vec![Value::Text("a".into()), Value::Text("a1".into())]);
        right.push_row(vec![Value::Text("b".into()), Value::Text("b1".into())]);
        right.push_row(vec![Value::Text("a".into()), Value::Text("a2".into())]);

        let spec = JoinSpec {
            left_on: "k",
            right_on: "k",
            kind: JoinKind::Left,
            suffix: "_r",
        };
        let out = join(&left, &right, &spec).unwrap();
        assert_eq!(out.columns(), ["k", "v", "v_r"]);
        assert_eq!(ids(&out, "v"), ["first", "keyless", "second", "second"]);
        assert_eq!(ids(&out, "v_r"), ["b1", "", "a1", "a2"]);
    }
}
