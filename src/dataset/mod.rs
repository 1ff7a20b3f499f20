pub mod schema;
pub mod table;

use table::Table;

/// The five source tables of one pipeline run.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub artist: Table,
    pub artwork: Table,
    pub image_asset: Table,
    pub user: Table,
    pub artwork_financial: Table,
}
