use tracing::{info, warn};

use crate::error::Result;
use crate::ingest::event_log::EventLog;
use crate::ingest::loader::load_datasets;
use crate::report::summary::render_summary;
use crate::report::writer::{ReportWriter, WrittenArtifact};
use crate::transform::aggregate::{summarize_by_artist, ArtistSummary};
use crate::transform::join::enrich;
use crate::transform::kpi::{catalog_kpis, CatalogKpis};
use crate::utils::config::PipelineConfig;
use crate::validate::events::validate_events;
use crate::validate::keys::validate_keys;
use crate::validate::links::validate_links;

#[derive(Debug)]
pub struct RunReport {
    pub warnings: Vec<String>,
    pub enriched: WrittenArtifact,
    pub summary: WrittenArtifact,
    pub artists: Vec<ArtistSummary>,
    pub kpis: CatalogKpis,
    /// Console report, ready to print.
    pub rendered: String,
}

/// One full batch pass: load, validate, join, aggregate, write.
/// Loader and writer failures abort the run; validation findings do not.
pub fn run(config: &PipelineConfig, events: &dyn EventLog) -> Result<RunReport> {
    info!("Loading datasets from {}", config.data_dir.display());
    let data = load_datasets(&config.data_dir, events)?;
    info!(
        "Loaded {} artists, {} artworks, {} images, {} users, {} financial events",
        data.artist.len(),
        data.artwork.len(),
        data.image_asset.len(),
        data.user.len(),
        data.artwork_financial.len()
    );

    let mut warnings = validate_links(&data);
    warnings.extend(validate_keys(&data));
    warnings.extend(validate_events(&data.artwork_financial));
    if warnings.is_empty() {
        info!("All key relationships validated.");
    } else {
        for warning in &warnings {
            warn!("Validation: {}", warning);
        }
    }

    let enriched = enrich(&data)?;
    let artists = summarize_by_artist(&enriched, &config.aggregate_options())?;
    let kpis = catalog_kpis(&enriched.table)?;

    let writer = ReportWriter::new(&config.out_dir)?;
    let enriched_artifact = writer.write_table(&enriched.table, &config.enriched_file)?;
    let summary_artifact = writer.write_summary(&artists, &config.summary_file)?;

    let rendered = render_summary(&artists, &kpis);
    Ok(RunReport {
        warnings,
        enriched: enriched_artifact,
        summary: summary_artifact,
        artists,
        kpis,
        rendered,
    })
}
