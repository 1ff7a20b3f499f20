use std::collections::BTreeSet;

use crate::dataset::table::{Table, Value};
use crate::validate::keys::{duplicate_keys, not_unique_warning};

/// Diagnostic checks on the financial-event log: ids must be unique and
/// `created_at` must not be later than `updated_at`.
pub fn validate_events(events: &Table) -> Vec<String> {
    let mut warnings = Vec::new();

    let Some(id_idx) = events.column_index("id") else {
        warnings.push(format!("{}.id: not checked (column missing)", events.name()));
        return warnings;
    };

    let duplicates = duplicate_keys(events, id_idx);
    if !duplicates.is_empty() {
        warnings.push(not_unique_warning(events, "id", duplicates));
    }

    if let (Some(created), Some(updated)) = (
        events.column_index("created_at"),
        events.column_index("updated_at"),
    ) {
        let backwards: BTreeSet<String> = events
            .rows()
            .iter()
            .filter(|row| match (&row[created], &row[updated]) {
                (Value::Timestamp(c), Value::Timestamp(u)) => u < c,
                _ => false,
            })
            .filter_map(|row| row[id_idx].as_key())
            .collect();
        if !backwards.is_empty() {
            warnings.push(format!(
                "{}.updated_at precedes created_at: {{{}}}",
                events.name(),
                backwards.into_iter().collect::<Vec<_>>().join(", ")
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use anyhow::Result;

    #[test]
    fn sample_events_are_consistent() -> Result<()> {
        let data = Fixture::sample()?.load()?;
        assert!(validate_events(&data.artwork_financial).is_empty());
        Ok(())
    }

    #[test]
    fn flags_duplicate_ids_and_backwards_timestamps() -> Result<()> {
        let fixture = Fixture::sample()?;
        fixture.write(
            "artwork_financial.csv",
            "id,artwork_id,created_at,updated_at\n\
             e1,10,2024-01-01T00:00:00,2024-01-01T00:00:00\n\
             e1,10,2024-01-02T00:00:00,2024-01-03T00:00:00\n\
             e2,11,2024-02-01T00:00:00,2024-01-01T00:00:00\n\
             e3,11,,2024-01-01T00:00:00\n",
        )?;

        let warnings = validate_events(&fixture.load()?.artwork_financial);
        assert_eq!(
            warnings,
            vec![
                "artwork_financial.id is not unique: {e1}",
                "artwork_financial.updated_at precedes created_at: {e2}",
            ]
        );
        Ok(())
    }
}
