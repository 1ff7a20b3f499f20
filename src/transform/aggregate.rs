use std::collections::HashSet;

use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::transform::join::Enriched;

/// What `artwork_count` counts for each artist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CountPolicy {
    /// Enriched rows, i.e. (artwork, financial event) pairs.
    #[default]
    Rows,
    /// Distinct artworks regardless of how many events they have.
    DistinctArtworks,
}

#[derive(Debug, Clone, Default)]
pub struct AggregateOptions {
    pub count_policy: CountPolicy,
    /// When set, only events of these types (case-insensitive) contribute to
    /// the price totals. When unset, every event type is blended.
    pub price_event_types: Option<Vec<String>>,
}

impl AggregateOptions {
    fn counts_price_of(&self, event_type: Option<&str>) -> bool {
        match &self.price_event_types {
            None => true,
            Some(allowed) => event_type
                .map(|t| allowed.iter().any(|a| a.trim().eq_ignore_ascii_case(t.trim())))
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistSummary {
    pub artist_id: String,
    pub name: Option<String>,
    pub artwork_count: usize,
    pub total_price: f64,
    pub avg_price: Option<f64>,
}

#[derive(Default)]
struct Group {
    name: Option<String>,
    rows: usize,
    artworks: HashSet<String>,
    total: f64,
    priced: usize,
}

/// Groups enriched rows by artist in first-appearance order. Missing or
/// non-numeric prices are left out of both the sum and the mean.
pub fn summarize_by_artist(enriched: &Enriched, opts: &AggregateOptions) -> Result<Vec<ArtistSummary>> {
    let table = &enriched.table;
    let artist_idx = table.require_column("artist_id")?;
    let artwork_idx = table.require_column("artwork_id")?;
    let name_idx = table.require_column(&enriched.artist_name_column)?;
    let price_idx = table.column_index("price_amount");
    let type_idx = table.column_index("event_type");

    let mut groups: IndexMap<String, Group> = IndexMap::new();
    for row in table.rows() {
        let Some(artist_id) = row[artist_idx].as_key() else {
            continue;
        };
        let group = groups.entry(artist_id).or_default();

        group.rows += 1;
        if let Some(artwork) = row[artwork_idx].as_key() {
            group.artworks.insert(artwork);
        }
        if group.name.is_none() {
            group.name = row[name_idx]
                .as_str()
                .filter(|n| !n.trim().is_empty())
                .map(str::to_string);
        }

        let event_type = type_idx.and_then(|i| row[i].as_str());
        let price = price_idx.and_then(|i| row[i].as_f64());
        if let Some(price) = price.filter(|_| opts.counts_price_of(event_type)) {
            group.total += price;
            group.priced += 1;
        }
    }

    let summaries: Vec<ArtistSummary> = groups
        .into_iter()
        .map(|(artist_id, g)| ArtistSummary {
            artist_id,
            name: g.name,
            artwork_count: match opts.count_policy {
                CountPolicy::Rows => g.rows,
                CountPolicy::DistinctArtworks => g.artworks.len(),
            },
            total_price: g.total,
            avg_price: (g.priced > 0).then(|| g.total / g.priced as f64),
        })
        .collect();

    debug!("Summarized {} rows into {} artists", table.len(), summaries.len());
    Ok(summaries)
}
