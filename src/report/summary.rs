use std::fmt::Write;

use crate::report::writer::SUMMARY_HEADER;
use crate::transform::aggregate::ArtistSummary;
use crate::transform::kpi::CatalogKpis;

fn price(value: f64) -> String {
    format!("{:.2}", value)
}

/// Console report: the per-artist table followed by the catalog figures.
pub fn render_summary(summary: &[ArtistSummary], kpis: &CatalogKpis) -> String {
    let cells: Vec<[String; 5]> = summary
        .iter()
        .map(|s| {
            [
                s.artist_id.clone(),
                s.name.clone().unwrap_or_default(),
                s.artwork_count.to_string(),
                price(s.total_price),
                s.avg_price.map(price).unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    let mut widths = SUMMARY_HEADER.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::from("Summary by artist:\n");
    let mut line = |values: &[&str]| {
        let mut text = String::new();
        for (i, (value, width)) in values.iter().zip(widths).enumerate() {
            if i > 0 {
                text.push_str("  ");
            }
            // Numbers right-aligned, text left-aligned.
            if i >= 2 {
                let _ = write!(text, "{:>width$}", value, width = width);
            } else {
                let _ = write!(text, "{:<width$}", value, width = width);
            }
        }
        out.push_str(text.trim_end());
        out.push('\n');
    };

    line(&SUMMARY_HEADER);
    for row in &cells {
        line(&row.each_ref().map(String::as_str));
    }
    if cells.is_empty() {
        out.push_str("(no artists)\n");
    }

    let _ = write!(
        out,
        "\nArtworks: {}  Artists: {}  Artworks w/ images: {}  Sum of last valuations: {}\n",
        kpis.artworks,
        kpis.artists,
        kpis.artworks_with_images,
        price(kpis.sum_last_valuations)
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kpis() -> CatalogKpis {
        CatalogKpis {
            artworks: 3,
            artists: 2,
            artworks_with_images: 2,
            sum_last_valuations: 700.0,
        }
    }

    #[test]
    fn renders_aligned_table_and_kpis() {
        let summary = vec![
            ArtistSummary {
                artist_id: "1".into(),
                name: Some("Alice Arden".into()),
                artwork_count: 3,
                total_price: 1200.0,
                avg_price: Some(600.0),
            },
            ArtistSummary {
                artist_id: "2".into(),
                name: None,
                artwork_count: 1,
                total_price: 0.0,
                avg_price: None,
            },
        ];

        let text = render_summary(&summary, &kpis());
        let expected = "\
Summary by artist:
artist_id  name         artwork_count  total_price  avg_price
1          Alice Arden              3      1200.00     600.00
2                                   1         0.00          -

Artworks: 3  Artists: 2  Artworks w/ images: 2  Sum of last valuations: 700.00
";
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_summary_says_so() {
        let text = render_summary(&[], &kpis());
        assert!(text.contains("(no artists)"));
    }
}
