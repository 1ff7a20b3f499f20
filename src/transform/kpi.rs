use std::collections::HashSet;

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::dataset::table::{Table, Value};
use crate::error::Result;

/// Catalog-level figures printed alongside the artist summary.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogKpis {
    pub artworks: usize,
    pub artists: usize,
    pub artworks_with_images: usize,
    /// Sum over artworks of the price of their most recent priced event.
    pub sum_last_valuations: f64,
}

struct PricedEvent {
    date: Option<NaiveDate>,
    price: Option<f64>,
}

pub fn catalog_kpis(enriched: &Table) -> Result<CatalogKpis> {
    let artwork_idx = enriched.require_column("artwork_id")?;
    let artist_idx = enriched.require_column("artist_id")?;
    let storage_idx = enriched.column_index("storage_key");
    let date_idx = enriched.column_index("event_date");
    let price_idx = enriched.column_index("price_amount");

    let mut artists = HashSet::new();
    let mut with_images = HashSet::new();
    let mut events: IndexMap<String, Vec<PricedEvent>> = IndexMap::new();

    for row in enriched.rows() {
        let Some(artwork) = row[artwork_idx].as_key() else {
            continue;
        };
        if let Some(artist) = row[artist_idx].as_key() {
            artists.insert(artist);
        }
        if storage_idx.is_some_and(|i| !row[i].is_null()) {
            with_images.insert(artwork.clone());
        }
        events.entry(artwork).or_default().push(PricedEvent {
            date: date_idx.and_then(|i| match &row[i] {
                Value::Date(d) => Some(*d),
                _ => None,
            }),
            price: price_idx.and_then(|i| row[i].as_f64()),
        });
    }

    let sum_last_valuations: f64 = events
        .values_mut()
        .filter_map(|history| {
            // Stable sort; undated events sort after dated ones.
            history.sort_by_key(|e| (e.date.is_none(), e.date));
            history.iter().rev().find_map(|e| e.price)
        })
        .sum();

    Ok(CatalogKpis {
        artworks: events.len(),
        artists: artists.len(),
        artworks_with_images: with_images.len(),
        sum_last_valuations,
    })
}
