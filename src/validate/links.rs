use std::collections::{BTreeSet, HashSet};

use crate::dataset::table::Table;
use crate::dataset::Datasets;

/// A foreign key from `from.from_column` to `to.to_column`.
struct Link<'a> {
    from: &'a Table,
    from_column: &'static str,
    to: &'a Table,
    to_column: &'static str,
}

impl Link<'_> {
    fn label(&self) -> String {
        format!(
            "{}.{} missing in {}.{}",
            self.from.name(),
            self.from_column,
            self.to.name(),
            self.to_column
        )
    }

    /// Referencing values with no counterpart in the referenced column.
    /// Empty references are optional links and never count as orphans.
    fn orphans(&self) -> Result<BTreeSet<String>, String> {
        let known: HashSet<String> = self
            .to
            .column_values(self.to_column)
            .map_err(|e| e.to_string())?
            .filter_map(|v| v.as_key())
            .collect();

        Ok(self
            .from
            .column_values(self.from_column)
            .map_err(|e| e.to_string())?
            .filter_map(|v| v.as_key())
            .filter(|k| !known.contains(k))
            .collect())
    }
}

/// Checks the four declared relationships and returns one warning per
/// relationship that has orphaned references. Never fails: a relationship
/// that cannot be checked is itself reported as a warning.
pub fn validate_links(data: &Datasets) -> Vec<String> {
    let links = [
        Link {
            from: &data.artwork,
            from_column: "artist_id",
            to: &data.artist,
            to_column: "artist_id",
        },
        Link {
            from: &data.image_asset,
            from_column: "artwork_id",
            to: &data.artwork,
            to_column: "artwork_id",
        },
        Link {
            from: &data.artwork,
            from_column: "image_primary_id",
            to: &data.image_asset,
            to_column: "image_id",
        },
        Link {
            from: &data.artwork_financial,
            from_column: "artwork_id",
            to: &data.artwork,
            to_column: "artwork_id",
        },
    ];

    links
        .iter()
        .filter_map(|link| match link.orphans() {
            Ok(orphans) if orphans.is_empty() => None,
            Ok(orphans) => Some(format!(
                "{}: {{{}}}",
                link.label(),
                orphans.into_iter().collect::<Vec<_>>().join(", ")
            )),
            Err(reason) => Some(format!("{}: not checked ({})", link.label(), reason)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use anyhow::Result;

    #[test]
    fn clean_sample_has_no_warnings() -> Result<()> {
        let data = Fixture::sample()?.load()?;
        assert!(validate_links(&data).is_empty());
        Ok(())
    }

    #[test]
    fn removed_artist_yields_exactly_one_warning() -> Result<()> {
        let fixture = Fixture::sample()?;
        fixture.write("artist.csv", "artist_id,name\n1,Alice Arden\n")?;

        let warnings = validate_links(&fixture.load()?);
        assert_eq!(warnings, vec!["artwork.artist_id missing in artist.artist_id: {2}"]);
        Ok(())
    }

    #[test]
    fn reports_every_relationship_with_full_offender_sets() -> Result<()> {
        let fixture = Fixture::sample()?;
        fixture.write(
            "artwork.csv",
            "artwork_id,artist_id,image_primary_id\n10,1,100\n20,99,555\n21,98,\n",
        )?;
        fixture.write("image_asset.csv", "image_id,artwork_id\n100,10\n101,77\n")?;
        fixture.write(
            "artwork_financial.csv",
            "id,artwork_id,price_amount\ne1,10,1\ne2,42,2\ne3,42,3\n",
        )?;

        let warnings = validate_links(&fixture.load()?);
        assert_eq!(
            warnings,
            vec![
                "artwork.artist_id missing in artist.artist_id: {98, 99}",
                "image_asset.artwork_id missing in artwork.artwork_id: {77}",
                "artwork.image_primary_id missing in image_asset.image_id: {555}",
                "artwork_financial.artwork_id missing in artwork.artwork_id: {42}",
            ]
        );
        Ok(())
    }
}
