//! CSV fixtures shared by the unit tests.

use std::fs;
use std::path::Path;

use anyhow::Result;
use tempfile::TempDir;

use crate::dataset::Datasets;
use crate::ingest::event_log::CsvEventLog;
use crate::ingest::loader::load_datasets;

pub const ARTIST_CSV: &str = "\
artist_id,name,nationality
1,Alice Arden,FR
2,Bruno Berg,DE
";

pub const ARTWORK_CSV: &str = "\
artwork_id,artist_id,image_primary_id,title,medium,creation_year_start,location_text,rights,attributes_json,storage_key
10,1,100,Harbor,Oil,1901,Paris,PD,\"{\"\"size\"\":\"\"large\"\"}\",images/10.jpg
11,1,101,Meadow,Watercolor,1905,Lyon,PD,,
12,2,102,Study,Ink,1920,Berlin,CC,,images/12.jpg
";

pub const IMAGE_ASSET_CSV: &str = "\
image_id,artwork_id,width
100,10,800
101,11,640
102,12,1024
";

pub const USER_CSV: &str = "\
user_id,email
1,ops@example.com
";

pub const FINANCIAL_CSV: &str = "\
id,artwork_id,event_type,event_date,currency,price_amount,price_estimate_min,price_estimate_max,buyer_name,seller_name,sale_location,source,notes,created_at,updated_at
e1,10,sale,2020-01-01,USD,500,,,Buyer A,Seller A,Paris,auction,,2024-01-01T00:00:00,2024-01-01T00:00:00
e2,10,valuation,2022-06-01,USD,700,,,,,,appraisal,,2024-01-02T00:00:00,2024-01-02T00:00:00
e3,12,valuation,2021-01-01,USD,,400,600,,,,appraisal,estimate only,2024-01-03T00:00:00,2024-01-03T00:00:00
";

pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)?;
    Ok(())
}

/// A temporary data directory holding the five source CSVs.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn empty() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Two artists, three artworks (one without events), three events.
    pub fn sample() -> Result<Self> {
        let fixture = Self::empty()?;
        fixture.write("artist.csv", ARTIST_CSV)?;
        fixture.write("artwork.csv", ARTWORK_CSV)?;
        fixture.write("image_asset.csv", IMAGE_ASSET_CSV)?;
        fixture.write("user.csv", USER_CSV)?;
        fixture.write("artwork_financial.csv", FINANCIAL_CSV)?;
        Ok(fixture)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, file: &str, contents: &str) -> Result<()> {
        write_file(&self.dir.path().join(file), contents)
    }

    pub fn event_log(&self) -> CsvEventLog {
        CsvEventLog::new(self.dir.path().join("artwork_financial.csv"))
    }

    pub fn load(&self) -> Result<Datasets> {
        Ok(load_datasets(self.path(), &self.event_log())?)
    }
}
