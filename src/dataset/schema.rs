#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Foreign or primary key, compared as text.
    Id,
    Text,
    Integer,
    Decimal,
    Date,
    Timestamp,
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
    /// Every row must carry a value. Only meaningful for key columns.
    pub required: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnType) -> Self {
        Self { name, kind, required: false }
    }

    pub const fn required(name: &'static str, kind: ColumnType) -> Self {
        Self { name, kind, required: true }
    }
}

#[derive(Debug)]
pub struct TableSchema {
    pub name: &'static str,
    pub source_file: &'static str,
    pub columns: &'static [Column],
    /// Declared columns that must be present in the header even though
    /// individual cells may be empty.
    pub expected: &'static [&'static str],
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn required_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns
            .iter()
            .filter(|c| c.required)
            .map(|c| c.name)
            .chain(self.expected.iter().copied())
    }
}

pub static ARTIST: TableSchema = TableSchema {
    name: "artist",
    source_file: "artist.csv",
    columns: &[
        Column::required("artist_id", ColumnType::Id),
        Column::new("name", ColumnType::Text),
    ],
    expected: &["name"],
};

pub static ARTWORK: TableSchema = TableSchema {
    name: "artwork",
    source_file: "artwork.csv",
    columns: &[
        Column::required("artwork_id", ColumnType::Id),
        Column::required("artist_id", ColumnType::Id),
        Column::new("image_primary_id", ColumnType::Id),
        Column::new("title", ColumnType::Text),
        Column::new("medium", ColumnType::Text),
        Column::new("creation_year_start", ColumnType::Integer),
        Column::new("location_text", ColumnType::Text),
        Column::new("rights", ColumnType::Text),
        Column::new("attributes_json", ColumnType::Json),
        Column::new("storage_key", ColumnType::Text),
    ],
    expected: &["image_primary_id"],
};

pub static IMAGE_ASSET: TableSchema = TableSchema {
    name: "image_asset",
    source_file: "image_asset.csv",
    columns: &[
        Column::required("image_id", ColumnType::Id),
        Column::required("artwork_id", ColumnType::Id),
    ],
    expected: &[],
};

// Only consumed by the dashboard; loaded so a missing file still fails the run.
pub static USER: TableSchema = TableSchema {
    name: "user",
    source_file: "user.csv",
    columns: &[],
    expected: &[],
};

pub static ARTWORK_FINANCIAL: TableSchema = TableSchema {
    name: "artwork_financial",
    source_file: "artwork_financial.csv",
    columns: &[
        Column::required("id", ColumnType::Id),
        Column::required("artwork_id", ColumnType::Id),
        Column::new("event_type", ColumnType::Text),
        Column::new("event_date", ColumnType::Date),
        Column::new("currency", ColumnType::Text),
        Column::new("price_amount", ColumnType::Decimal),
        Column::new("price_estimate_min", ColumnType::Decimal),
        Column::new("price_estimate_max", ColumnType::Decimal),
        Column::new("buyer_name", ColumnType::Text),
        Column::new("seller_name", ColumnType::Text),
        Column::new("sale_location", ColumnType::Text),
        Column::new("source", ColumnType::Text),
        Column::new("notes", ColumnType::Text),
        Column::new("created_at", ColumnType::Timestamp),
        Column::new("updated_at", ColumnType::Timestamp),
    ],
    expected: &[],
};

/// Header written when the financial log is created from scratch.
pub const FINANCIAL_HEADER: [&str; 15] = [
    "id",
    "artwork_id",
    "event_type",
    "event_date",
    "currency",
    "price_amount",
    "price_estimate_min",
    "price_estimate_max",
    "buyer_name",
    "seller_name",
    "sale_location",
    "source",
    "notes",
    "created_at",
    "updated_at",
];
