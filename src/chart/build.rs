use crate::color::ColorMap;
use crate::data::model::{FieldValue, ListingDataset, ReviewCategory};
use crate::data::view::{Breakdown, ReviewPoint};

use super::spec::{
    Channel, ChartSpec, Datum, Encoding, EncodingChannel, Mark, MarkType, Param, Scale,
    Transform, VConcat,
};

pub const ID: &str = "id";
pub const NAME: &str = "name";
pub const PRICE: &str = "price";
pub const REVIEWS_PER_MONTH: &str = "reviews_per_month";
pub const NEIGHBOURHOOD: &str = "neighbourhood_cleansed";
pub const ACCEPTANCE_RATE: &str = "host_acceptance_rate";
pub const RATING: &str = "review_scores_rating";
pub const VALUE_SCORE: &str = "review_scores_value";
pub const REVIEW_CATEGORY: &str = "Review Category";
pub const SCORE: &str = "Score";

/// Name of the interval selection linking the review scatter to the boxplot.
pub const BRUSH: &str = "brush";

fn color_scale(map: &ColorMap) -> Scale {
    Scale {
        domain: map.domain().to_vec(),
        range: map.hex_range(),
    }
}

/// Neighbourhood colours are fixed per dataset so they survive filtering.
fn neighbourhood_channel(dataset: &ListingDataset) -> Channel {
    let map = ColorMap::new(NEIGHBOURHOOD, dataset.neighbourhoods.iter().cloned());
    Channel::nominal(NEIGHBOURHOOD).scale(color_scale(&map))
}

fn text(value: Option<&str>) -> FieldValue {
    value.map_or(FieldValue::Null, FieldValue::from)
}

// ---------------------------------------------------------------------------
// Price vs reviews per month
// ---------------------------------------------------------------------------

/// Scatter of the price view, coloured by neighbourhood, with pan/zoom.
pub fn price_scatter(dataset: &ListingDataset, indices: &[usize]) -> ChartSpec {
    let values: Vec<Datum> = indices
        .iter()
        .filter_map(|&i| dataset.listings.get(i))
        .map(|l| {
            Datum::from([
                (ID.to_string(), FieldValue::from(l.id.as_str())),
                (NAME.to_string(), FieldValue::from(l.name.as_str())),
                (PRICE.to_string(), FieldValue::Float(l.price)),
                (REVIEWS_PER_MONTH.to_string(), l.reviews_per_month.as_f64().into()),
                (NEIGHBOURHOOD.to_string(), text(l.neighbourhood.as_deref())),
            ])
        })
        .collect();

    let encoding = Encoding {
        x: Channel::quantitative(PRICE),
        y: Channel::quantitative(REVIEWS_PER_MONTH),
        color: Some(neighbourhood_channel(dataset)),
        tooltip: vec![
            Channel::nominal(NAME),
            Channel::quantitative(PRICE),
            Channel::quantitative(REVIEWS_PER_MONTH),
        ],
    };
    let mark = Mark {
        size: Some(60.0),
        ..Mark::new(MarkType::Point)
    };

    ChartSpec::new(mark, encoding, values)
        .title("Scatter Plot: Price vs Reviews per Month")
        .param(Param::pan_zoom("grid"))
}

// ---------------------------------------------------------------------------
// Acceptance rate scatter + value boxplot, linked by a brush
// ---------------------------------------------------------------------------

/// The brushed scatter and the boxplot it filters.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPair {
    pub scatter: ChartSpec,
    pub boxplot: ChartSpec,
}

impl ReviewPair {
    pub fn to_vconcat(&self) -> VConcat {
        VConcat {
            vconcat: vec![self.scatter.clone(), self.boxplot.clone()],
        }
    }
}

pub fn review_pair(dataset: &ListingDataset, points: &[ReviewPoint]) -> ReviewPair {
    let values: Vec<Datum> = points
        .iter()
        .map(|p| {
            Datum::from([
                (ACCEPTANCE_RATE.to_string(), FieldValue::Float(p.acceptance_rate)),
                (RATING.to_string(), FieldValue::Float(p.rating)),
                (VALUE_SCORE.to_string(), FieldValue::Float(p.value)),
                (NEIGHBOURHOOD.to_string(), FieldValue::from(p.neighbourhood.as_str())),
            ])
        })
        .collect();

    let scatter = ChartSpec::new(
        Mark {
            size: Some(60.0),
            opacity: Some(0.7),
            ..Mark::new(MarkType::Point)
        },
        Encoding {
            x: Channel::quantitative(ACCEPTANCE_RATE).title("Host Acceptance Rate (%)"),
            y: Channel::quantitative(RATING).title("Review Scores Rating"),
            color: None,
            tooltip: vec![
                Channel::quantitative(ACCEPTANCE_RATE),
                Channel::quantitative(RATING),
            ],
        },
        values.clone(),
    )
    .title("Host Acceptance Rate vs Review Scores")
    .size(600, 400)
    .param(Param::interval(BRUSH, vec![EncodingChannel::X]));

    let boxplot = ChartSpec::new(
        Mark::new(MarkType::Boxplot),
        Encoding {
            x: Channel::nominal(NEIGHBOURHOOD).title("Neighbourhood"),
            y: Channel::quantitative(VALUE_SCORE).title("Review Scores Value"),
            color: Some(neighbourhood_channel(dataset).hide_legend()),
            tooltip: Vec::new(),
        },
        values,
    )
    .title("Review Scores Value by Neighbourhood (Filtered by Acceptance Rate)")
    .size(600, 400)
    .transform(Transform::filter_by(BRUSH));

    ReviewPair { scatter, boxplot }
}

// ---------------------------------------------------------------------------
// Per-listing review breakdown
// ---------------------------------------------------------------------------

/// One bar per review category, in the fixed category order.
pub fn breakdown_bar(breakdown: &Breakdown) -> ChartSpec {
    let order: Vec<String> = ReviewCategory::ALL
        .iter()
        .map(|c| c.column().to_string())
        .collect();
    let values: Vec<Datum> = breakdown
        .scores
        .iter()
        .map(|(category, score)| {
            Datum::from([
                (REVIEW_CATEGORY.to_string(), FieldValue::from(category.column())),
                (SCORE.to_string(), FieldValue::from(*score)),
            ])
        })
        .collect();
    let colors = ColorMap::new(REVIEW_CATEGORY, order.iter().cloned());

    ChartSpec::new(
        Mark::new(MarkType::Bar),
        Encoding {
            x: Channel::nominal(REVIEW_CATEGORY).sort(order),
            y: Channel::quantitative(SCORE),
            color: Some(Channel::nominal(REVIEW_CATEGORY).scale(color_scale(&colors))),
            tooltip: Vec::new(),
        },
        values,
    )
    .title(&format!("Review Categories for {}", breakdown.id))
    .size(500, 300)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::brush::{resolve, Brush};
    use crate::chart::spec::{datum_f64, datum_text};
    use crate::data::filter::{init_filter_state, price_view, RoomTypeSelection};
    use crate::data::model::fixtures::{listing, with_review};
    use crate::data::view::{breakdown, review_view, ViewConfig};

    fn dataset() -> ListingDataset {
        let listings = vec![
            with_review(listing("1", 60.0, "Mitte", "Private room"), "40%", 4.2, 4.1),
            with_review(listing("2", 90.0, "Pankow", "Private room"), "75%", 4.6, 4.5),
            with_review(listing("3", 150.0, "Mitte", "Entire home/apt"), "95%", 4.9, 4.8),
            with_review(listing("4", 210.0, "Pankow", "Entire home/apt"), "100%", 4.8, 4.7),
        ];
        ListingDataset::from_listings(listings, 0)
    }

    #[test]
    fn price_scatter_encodes_view_rows() {
        let ds = dataset();
        let mut filters = init_filter_state(&ds);
        filters.set_neighbourhood(Some("Pankow".into()));
        let spec = price_scatter(&ds, &price_view(&ds, &filters));

        assert_eq!(spec.mark.kind, MarkType::Point);
        assert_eq!(spec.encoding.x.field, PRICE);
        assert_eq!(spec.encoding.y.field, REVIEWS_PER_MONTH);
        let tooltip: Vec<&str> = spec.encoding.tooltip.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(tooltip, vec![NAME, PRICE, REVIEWS_PER_MONTH]);
        assert!(spec.is_interactive());

        assert_eq!(spec.data.values.len(), 2);
        assert!(spec
            .data
            .values
            .iter()
            .all(|d| datum_text(d, NEIGHBOURHOOD).as_deref() == Some("Pankow")));

        let scale = spec.encoding.color.as_ref().and_then(|c| c.scale.as_ref()).unwrap();
        assert_eq!(scale.domain, vec!["Mitte", "Pankow"]);
        assert_eq!(scale.range.len(), 2);
    }

    #[test]
    fn review_pair_links_boxplot_to_brush() {
        let ds = dataset();
        let filters = init_filter_state(&ds);
        let pair = review_pair(&ds, &review_view(&ds, &filters, &ViewConfig::default()));

        assert_eq!(pair.scatter.encoding.x.field, ACCEPTANCE_RATE);
        assert_eq!(pair.boxplot.mark.kind, MarkType::Boxplot);
        assert_eq!(pair.boxplot.transform, vec![Transform::filter_by(BRUSH)]);
        assert!(pair.boxplot.encoding.color.as_ref().unwrap().legend_hidden());
        assert!(!pair.scatter.is_interactive());

        let mut brush = Brush::for_param(&pair.scatter, BRUSH).unwrap();
        brush.set(70.0, 96.0);
        let shown = resolve(&pair.boxplot, &brush);
        assert_eq!(shown.len(), 2);
        assert!(shown
            .iter()
            .all(|d| (70.0..=96.0).contains(&datum_f64(d, ACCEPTANCE_RATE).unwrap())));
        assert_eq!(resolve(&pair.scatter, &brush).len(), 4);
    }

    #[test]
    fn brushing_leaves_filter_state_alone() {
        let ds = dataset();
        let mut filters = init_filter_state(&ds);
        filters.room_type = RoomTypeSelection::Only("Entire home/apt".into());
        let before = filters.clone();
        let pair = review_pair(&ds, &review_view(&ds, &filters, &ViewConfig::default()));

        let mut brush = Brush::for_param(&pair.scatter, BRUSH).unwrap();
        brush.set(96.0, 100.0);
        assert_eq!(resolve(&pair.boxplot, &brush).len(), 1);
        brush.clear();
        assert_eq!(resolve(&pair.boxplot, &brush).len(), 2);
        assert_eq!(filters, before);
    }

    #[test]
    fn breakdown_bar_keeps_category_order() {
        let ds = dataset();
        let mut filters = init_filter_state(&ds);
        filters.set_listing_id(Some("3".into()));
        let spec = breakdown_bar(&breakdown(&ds, &filters).unwrap());

        let expected: Vec<String> = ReviewCategory::ALL
            .iter()
            .map(|c| c.column().to_string())
            .collect();
        assert_eq!(spec.encoding.x.sort.as_ref(), Some(&expected));
        let labels: Vec<String> = spec
            .data
            .values
            .iter()
            .filter_map(|d| datum_text(d, REVIEW_CATEGORY))
            .collect();
        assert_eq!(labels, expected);
        assert_eq!(datum_f64(&spec.data.values[0], SCORE), Some(4.9));
        assert_eq!(datum_f64(&spec.data.values[1], SCORE), None);
        assert_eq!(spec.mark.kind, MarkType::Bar);
    }

    #[test]
    fn review_pair_exports_as_vconcat() {
        let ds = dataset();
        let filters = init_filter_state(&ds);
        let pair = review_pair(&ds, &review_view(&ds, &filters, &ViewConfig::default()));
        let json = serde_json::to_value(pair.to_vconcat()).unwrap();
        let charts = json["vconcat"].as_array().unwrap();
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0]["params"][0]["name"], BRUSH);
        assert_eq!(charts[0]["params"][0]["select"]["encodings"][0], "x");
        assert_eq!(charts[1]["transform"][0]["filter"]["param"], BRUSH);
    }
}
