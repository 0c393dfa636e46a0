use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::chart::spec::TopLevel;
use crate::state::Session;

pub const PRICE_SCATTER_FILE: &str = "price_scatter.json";
pub const REVIEW_PAIR_FILE: &str = "review_pair.json";
pub const BREAKDOWN_FILE: &str = "review_breakdown.json";

fn write_spec<T: Serialize>(dir: &Path, file: &str, spec: &T) -> Result<PathBuf> {
    let path = dir.join(file);
    let json = serde_json::to_string_pretty(&TopLevel::new(spec)).context("serializing chart")?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Write the session's current charts as Vega-Lite JSON files into `dir`.
///
/// The breakdown file is skipped when no listing is selected or the selected
/// id does not exist; the reason is logged.
pub fn write_charts(session: &Session, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut written = vec![
        write_spec(dir, PRICE_SCATTER_FILE, &session.price_chart)?,
        write_spec(dir, REVIEW_PAIR_FILE, &session.review_charts.to_vconcat())?,
    ];
    match (&session.breakdown_chart, &session.breakdown) {
        (Some(chart), _) => written.push(write_spec(dir, BREAKDOWN_FILE, chart)?),
        (None, Err(e)) => log::warn!("Skipping {BREAKDOWN_FILE}: {e}"),
        (None, Ok(_)) => {}
    }

    log::info!("Exported {} chart(s) to {}", written.len(), dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{listing, with_review};
    use crate::data::model::ListingDataset;
    use crate::data::view::ViewConfig;

    #[test]
    fn writes_all_chart_files() {
        let ds = ListingDataset::from_listings(
            vec![
                with_review(listing("1", 60.0, "Mitte", "Private room"), "80%", 4.5, 4.4),
                with_review(listing("2", 95.0, "Pankow", "Private room"), "90%", 4.7, 4.6),
            ],
            0,
        );
        let session = Session::new(ds, ViewConfig::default());
        let dir = std::env::temp_dir().join(format!("listings-export-{}", std::process::id()));

        let written = write_charts(&session, &dir).unwrap();
        assert_eq!(written.len(), 3);

        let text = std::fs::read_to_string(dir.join(REVIEW_PAIR_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(json["$schema"].as_str().unwrap().contains("vega-lite"));
        assert_eq!(json["vconcat"].as_array().unwrap().len(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
