//! Derived views: pure functions from (dataset, filter state) to the rows a
//! chart needs.  Every call recomputes from scratch.

use clap::ValueEnum;
use thiserror::Error;

use super::filter::FilterState;
use super::loader::parse_percentage;
use super::model::{Listing, ListingDataset, ReviewCategory};
use super::stats::zscore_mask;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How the per-field z-score masks are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutlierMode {
    /// All masks are computed on the same rows and AND-ed.
    #[default]
    Independent,
    /// Fields are filtered one after another; each mask sees only the rows
    /// the previous one kept.
    Sequential,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewConfig {
    pub z_threshold: f64,
    pub outlier_mode: OutlierMode,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            z_threshold: 3.0,
            outlier_mode: OutlierMode::Independent,
        }
    }
}

// ---------------------------------------------------------------------------
// Acceptance / review view
// ---------------------------------------------------------------------------

/// One listing of the acceptance-rate vs review-score charts, with every
/// field already coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPoint {
    /// Index into [`ListingDataset::listings`].
    pub listing: usize,
    pub acceptance_rate: f64,
    pub rating: f64,
    pub value: f64,
    pub neighbourhood: String,
}

type FieldFn = fn(&ReviewPoint) -> f64;

fn acceptance_rate(p: &ReviewPoint) -> f64 {
    p.acceptance_rate
}

fn rating(p: &ReviewPoint) -> f64 {
    p.rating
}

fn value(p: &ReviewPoint) -> f64 {
    p.value
}

/// Fields checked for outliers, in the order the sequential mode applies them.
const OUTLIER_FIELDS: [FieldFn; 3] = [acceptance_rate, rating, value];

fn review_point(index: usize, listing: &Listing) -> Option<ReviewPoint> {
    Some(ReviewPoint {
        listing: index,
        acceptance_rate: parse_percentage(&listing.host_acceptance_rate)?,
        rating: listing.review_scores.get(ReviewCategory::Rating).as_f64()?,
        value: listing.review_scores.get(ReviewCategory::Value).as_f64()?,
        neighbourhood: listing.neighbourhood.clone()?,
    })
}

/// Filter by room type, coerce, drop incomplete rows and remove outliers.
pub fn review_view(
    dataset: &ListingDataset,
    filters: &FilterState,
    config: &ViewConfig,
) -> Vec<ReviewPoint> {
    let mut incomplete = 0usize;
    let points: Vec<ReviewPoint> = dataset
        .listings
        .iter()
        .enumerate()
        .filter(|(_, l)| filters.room_type.matches(l.room_type.as_deref()))
        .filter_map(|(i, l)| {
            let point = review_point(i, l);
            if point.is_none() {
                incomplete += 1;
            }
            point
        })
        .collect();

    let before = points.len();
    let kept = remove_outliers(points, config);
    log::debug!(
        "review view ({}): {} incomplete, {} outliers, {} kept",
        filters.room_type,
        incomplete,
        before - kept.len(),
        kept.len()
    );
    kept
}

/// Z-score outlier removal over acceptance rate, rating and value score.
pub fn remove_outliers(points: Vec<ReviewPoint>, config: &ViewConfig) -> Vec<ReviewPoint> {
    let mask_for = |points: &[ReviewPoint], field: FieldFn| {
        let values: Vec<f64> = points.iter().map(field).collect();
        zscore_mask(&values, config.z_threshold)
    };

    match config.outlier_mode {
        OutlierMode::Independent => {
            let masks: Vec<Vec<bool>> = OUTLIER_FIELDS
                .iter()
                .map(|field| mask_for(points.as_slice(), *field))
                .collect();
            points
                .into_iter()
                .enumerate()
                .filter(|(i, _)| masks.iter().all(|mask| mask[*i]))
                .map(|(_, p)| p)
                .collect()
        }
        OutlierMode::Sequential => OUTLIER_FIELDS.iter().fold(points, |points, field| {
            let mask = mask_for(points.as_slice(), *field);
            points
                .into_iter()
                .zip(mask)
                .filter_map(|(p, keep)| keep.then_some(p))
                .collect()
        }),
    }
}

// ---------------------------------------------------------------------------
// Per-listing breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreakdownError {
    #[error("no listing selected")]
    NoSelection,
    #[error("no listing with id {0}")]
    NotFound(String),
}

/// A listing's review sub-scores in long format.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    pub id: String,
    pub name: String,
    /// Always the six categories in [`ReviewCategory::ALL`] order.
    pub scores: Vec<(ReviewCategory, Option<f64>)>,
}

/// Reshape the selected listing's review columns into (category, score) pairs.
pub fn breakdown(
    dataset: &ListingDataset,
    filters: &FilterState,
) -> Result<Breakdown, BreakdownError> {
    let id = filters.listing_id.as_deref().ok_or(BreakdownError::NoSelection)?;
    let (_, listing) = dataset
        .find(id)
        .ok_or_else(|| BreakdownError::NotFound(id.to_string()))?;

    let scores = ReviewCategory::ALL
        .iter()
        .map(|c| (*c, listing.review_scores.get(*c).as_f64()))
        .collect();

    Ok(Breakdown {
        id: listing.id.clone(),
        name: listing.name.clone(),
        scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{init_filter_state, RoomTypeSelection};
    use crate::data::model::fixtures::{listing, with_review};
    use crate::data::model::FieldValue;

    fn point(listing: usize, acceptance_rate: f64, rating: f64, value: f64) -> ReviewPoint {
        ReviewPoint {
            listing,
            acceptance_rate,
            rating,
            value,
            neighbourhood: "Mitte".to_string(),
        }
    }

    fn typical_points(n: usize) -> Vec<ReviewPoint> {
        (0..n)
            .map(|i| point(i, 90.0 + (i % 5) as f64, 4.5 + (i % 3) as f64 * 0.1, 4.6))
            .collect()
    }

    fn review_dataset() -> ListingDataset {
        let mut listings: Vec<Listing> = (0..12)
            .map(|i| {
                let room = if i % 2 == 0 { "Private room" } else { "Entire home/apt" };
                with_review(listing(&i.to_string(), 100.0, "Mitte", room), "95%", 4.8, 4.7)
            })
            .collect();
        // Missing acceptance rate, missing neighbourhood, non-numeric rating.
        listings[0].host_acceptance_rate = FieldValue::Null;
        listings[1].neighbourhood = None;
        listings[2]
            .review_scores
            .set(ReviewCategory::Rating, FieldValue::String("n/a".into()));
        ListingDataset::from_listings(listings, 0)
    }

    #[test]
    fn drops_incomplete_rows_and_coerces_percentages() {
        let ds = review_dataset();
        let filters = init_filter_state(&ds);
        let points = review_view(&ds, &filters, &ViewConfig::default());
        assert_eq!(points.len(), 9);
        assert!(points.iter().all(|p| p.acceptance_rate == 95.0));
        assert!(points.iter().all(|p| ![0, 1, 2].contains(&p.listing)));
    }

    #[test]
    fn room_type_all_is_identity() {
        let ds = review_dataset();
        let mut filters = init_filter_state(&ds);
        let config = ViewConfig::default();
        let all = review_view(&ds, &filters, &config);

        filters.room_type = RoomTypeSelection::from_label("All");
        assert_eq!(review_view(&ds, &filters, &config), all);

        filters.room_type = RoomTypeSelection::Only("Private room".into());
        let private = review_view(&ds, &filters, &config);
        assert!(private
            .iter()
            .all(|p| ds.listings[p.listing].room_type.as_deref() == Some("Private room")));
        assert_eq!(private.len(), 4);
    }

    #[test]
    fn independent_mode_removes_extreme_rows() {
        let mut points = typical_points(30);
        points.push(point(30, 2.0, 4.6, 4.6));
        points.push(point(31, 92.0, 1.0, 4.6));
        let kept = remove_outliers(points, &ViewConfig::default());
        assert_eq!(kept.len(), 30);
        assert!(kept.iter().all(|p| p.listing < 30));
    }

    #[test]
    fn modes_can_disagree() {
        // Row 20 is extreme on both acceptance and rating, which inflates the
        // rating spread enough to hide row 21 until row 20 is gone.
        let mut points: Vec<ReviewPoint> = (0..20)
            .map(|i| point(i, 90.0 + (i % 2) as f64, 4.6 + (i % 2) as f64 * 0.2, 4.6))
            .collect();
        points.push(point(20, 0.0, -50.0, 4.6));
        points.push(point(21, 90.0, 3.0, 4.6));

        let independent = remove_outliers(points.clone(), &ViewConfig::default());
        let sequential = remove_outliers(
            points,
            &ViewConfig {
                outlier_mode: OutlierMode::Sequential,
                ..ViewConfig::default()
            },
        );
        assert_eq!(independent.len(), 21);
        assert!(independent.iter().any(|p| p.listing == 21));
        assert_eq!(sequential.len(), 20);
        assert!(sequential.iter().all(|p| p.listing < 20));
    }

    #[test]
    fn rerunning_on_clean_set_removes_nothing() {
        let clean = typical_points(25);
        for mode in [OutlierMode::Independent, OutlierMode::Sequential] {
            let config = ViewConfig {
                outlier_mode: mode,
                ..ViewConfig::default()
            };
            let once = remove_outliers(clean.clone(), &config);
            assert_eq!(once.len(), 25);
            assert_eq!(remove_outliers(once.clone(), &config), once);
        }
    }

    #[test]
    fn breakdown_uses_fixed_category_order() {
        let mut l = listing("77", 80.0, "Mitte", "Private room");
        for (i, category) in ReviewCategory::ALL.iter().rev().enumerate() {
            l.review_scores.set(*category, FieldValue::Float(4.0 + i as f64 / 10.0));
        }
        l.review_scores.set(ReviewCategory::Checkin, FieldValue::Null);
        let ds = ListingDataset::from_listings(vec![l], 0);
        let mut filters = init_filter_state(&ds);
        filters.set_listing_id(Some("77".into()));

        let result = breakdown(&ds, &filters).unwrap();
        assert_eq!(result.name, "Listing 77");
        let categories: Vec<ReviewCategory> = result.scores.iter().map(|(c, _)| *c).collect();
        assert_eq!(categories, ReviewCategory::ALL.to_vec());
        assert_eq!(result.scores[0].1, Some(4.5));
        assert_eq!(result.scores[3].1, None);
        assert_eq!(result.scores[5].1, Some(4.0));
    }

    #[test]
    fn breakdown_reports_missing_listing() {
        let ds = ListingDataset::from_listings(vec![listing("1", 80.0, "Mitte", "Private room")], 0);
        let mut filters = init_filter_state(&ds);
        filters.set_listing_id(Some("999".into()));
        assert_eq!(
            breakdown(&ds, &filters),
            Err(BreakdownError::NotFound("999".into()))
        );
        filters.set_listing_id(None);
        assert_eq!(breakdown(&ds, &filters), Err(BreakdownError::NoSelection));
    }
}
