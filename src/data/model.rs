use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// FieldValue – a single raw cell of the listings table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value, guessed from the source text.
/// Fields that are not consumed as typed values pass through as-read.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Null => write!(f, "<null>"),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::String(s) => serializer.serialize_str(s),
            FieldValue::Integer(i) => serializer.serialize_i64(*i),
            FieldValue::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            FieldValue::Float(_) | FieldValue::Null => serializer.serialize_none(),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(FieldValue::Null, FieldValue::Float)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl FieldValue {
    /// Guess the type of a raw text cell. Empty text is `Null`.
    pub fn guess(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return FieldValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return FieldValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return FieldValue::Float(f);
        }
        if s == "true" || s == "false" {
            return FieldValue::Bool(s == "true");
        }
        FieldValue::String(s.to_string())
    }

    /// Numeric coercion: numbers pass through, numeric text is parsed,
    /// anything else is `None`. NaN counts as missing.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            FieldValue::Float(v) => *v,
            FieldValue::Integer(i) => *i as f64,
            FieldValue::String(s) => s.trim().parse::<f64>().ok()?,
            FieldValue::Bool(_) | FieldValue::Null => return None,
        };
        (!v.is_nan()).then_some(v)
    }

    /// Trimmed, non-empty text view of the value, if any.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// ReviewCategory – the six review sub-scores in display order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReviewCategory {
    Rating,
    Accuracy,
    Cleanliness,
    Checkin,
    Communication,
    Value,
}

impl ReviewCategory {
    /// Fixed display order of the breakdown chart.
    pub const ALL: [ReviewCategory; 6] = [
        ReviewCategory::Rating,
        ReviewCategory::Accuracy,
        ReviewCategory::Cleanliness,
        ReviewCategory::Checkin,
        ReviewCategory::Communication,
        ReviewCategory::Value,
    ];

    /// Source column holding this score.
    pub fn column(self) -> &'static str {
        match self {
            ReviewCategory::Rating => "review_scores_rating",
            ReviewCategory::Accuracy => "review_scores_accuracy",
            ReviewCategory::Cleanliness => "review_scores_cleanliness",
            ReviewCategory::Checkin => "review_scores_checkin",
            ReviewCategory::Communication => "review_scores_communication",
            ReviewCategory::Value => "review_scores_value",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Raw review sub-scores, indexed by [`ReviewCategory`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewScores([FieldValue; 6]);

impl Default for ReviewScores {
    fn default() -> Self {
        ReviewScores(std::array::from_fn(|_| FieldValue::Null))
    }
}

impl ReviewScores {
    pub fn get(&self, category: ReviewCategory) -> &FieldValue {
        &self.0[category.index()]
    }

    pub fn set(&mut self, category: ReviewCategory, value: FieldValue) {
        self.0[category.index()] = value;
    }
}

// ---------------------------------------------------------------------------
// Listing – one row of the dataset
// ---------------------------------------------------------------------------

/// A single listing. `price` is always finite and non-negative; everything
/// that is only read by one view stays as the raw cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub neighbourhood: Option<String>,
    pub room_type: Option<String>,
    pub reviews_per_month: FieldValue,
    /// Percentage text such as `"95%"`, converted by the review view.
    pub host_acceptance_rate: FieldValue,
    pub review_scores: ReviewScores,
}

// ---------------------------------------------------------------------------
// ListingDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed option lists.
#[derive(Debug, Clone)]
pub struct ListingDataset {
    /// All listings that survived price cleaning.
    pub listings: Vec<Listing>,
    /// Sorted unique neighbourhoods.
    pub neighbourhoods: BTreeSet<String>,
    /// Unique room types in order of first appearance.
    pub room_types: Vec<String>,
    /// Unique non-empty listing ids in order of first appearance.
    pub ids: Vec<String>,
    /// Observed (min, max) price.
    pub price_bounds: (f64, f64),
    /// Rows dropped at load time because the price did not parse.
    pub dropped_rows: usize,
}

impl ListingDataset {
    /// Build option indices from the loaded listings.
    pub fn from_listings(listings: Vec<Listing>, dropped_rows: usize) -> Self {
        let mut neighbourhoods = BTreeSet::new();
        let mut room_types = Vec::new();
        let mut seen_room_types = HashSet::new();
        let mut ids = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for listing in &listings {
            if let Some(n) = &listing.neighbourhood {
                neighbourhoods.insert(n.clone());
            }
            if let Some(rt) = &listing.room_type {
                if seen_room_types.insert(rt.as_str()) {
                    room_types.push(rt.clone());
                }
            }
            if !listing.id.is_empty() {
                if seen_ids.insert(listing.id.as_str()) {
                    ids.push(listing.id.clone());
                } else {
                    log::warn!("Duplicate listing id {}; lookups use the first row", listing.id);
                }
            }
            min = min.min(listing.price);
            max = max.max(listing.price);
        }

        let price_bounds = if listings.is_empty() { (0.0, 0.0) } else { (min, max) };

        ListingDataset {
            listings,
            neighbourhoods,
            room_types,
            ids,
            price_bounds,
            dropped_rows,
        }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// First listing with the given id.
    pub fn find(&self, id: &str) -> Option<(usize, &Listing)> {
        self.listings.iter().enumerate().find(|(_, l)| l.id == id)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn listing(id: &str, price: f64, neighbourhood: &str, room_type: &str) -> Listing {
        Listing {
            id: id.to_string(),
            name: format!("Listing {id}"),
            price,
            neighbourhood: Some(neighbourhood.to_string()),
            room_type: Some(room_type.to_string()),
            reviews_per_month: FieldValue::Float(1.0),
            host_acceptance_rate: FieldValue::String("90%".to_string()),
            review_scores: ReviewScores::default(),
        }
    }

    pub fn with_review(mut listing: Listing, acceptance: &str, rating: f64, value: f64) -> Listing {
        listing.host_acceptance_rate = FieldValue::guess(acceptance);
        listing.review_scores.set(ReviewCategory::Rating, FieldValue::Float(rating));
        listing.review_scores.set(ReviewCategory::Value, FieldValue::Float(value));
        listing
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::listing;
    use super::*;

    #[test]
    fn guess_detects_types() {
        assert_eq!(FieldValue::guess(""), FieldValue::Null);
        assert_eq!(FieldValue::guess("12"), FieldValue::Integer(12));
        assert_eq!(FieldValue::guess("4.5"), FieldValue::Float(4.5));
        assert_eq!(FieldValue::guess("95%"), FieldValue::String("95%".into()));
    }

    #[test]
    fn as_f64_coerces_numeric_text_only() {
        assert_eq!(FieldValue::String(" 4.25 ".into()).as_f64(), Some(4.25));
        assert_eq!(FieldValue::String("n/a".into()).as_f64(), None);
        assert_eq!(FieldValue::Float(f64::NAN).as_f64(), None);
        assert_eq!(FieldValue::Null.as_f64(), None);
    }

    #[test]
    fn as_text_trims_padding() {
        assert_eq!(FieldValue::from(" Mitte ").as_text().as_deref(), Some("Mitte"));
        assert_eq!(FieldValue::from("   ").as_text(), None);
        assert_eq!(FieldValue::Integer(42).as_text().as_deref(), Some("42"));
    }

    #[test]
    fn serializes_as_plain_json_values() {
        let values = vec![
            FieldValue::from("a"),
            FieldValue::Integer(3),
            FieldValue::Float(1.5),
            FieldValue::Float(f64::NAN),
            FieldValue::Null,
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"["a",3,1.5,null,null]"#);
    }

    #[test]
    fn dataset_indexes_options() {
        let ds = ListingDataset::from_listings(
            vec![
                listing("1", 50.0, "Kreuzberg", "Private room"),
                listing("2", 120.0, "Mitte", "Entire home/apt"),
                listing("3", 80.0, "Kreuzberg", "Private room"),
                listing("1", 10.0, "Alexanderplatz", "Shared room"),
            ],
            2,
        );
        assert_eq!(
            ds.neighbourhoods.iter().cloned().collect::<Vec<_>>(),
            vec!["Alexanderplatz", "Kreuzberg", "Mitte"]
        );
        assert_eq!(ds.room_types, vec!["Private room", "Entire home/apt", "Shared room"]);
        assert_eq!(ds.ids, vec!["1", "2", "3"]);
        assert_eq!(ds.price_bounds, (10.0, 120.0));
        assert_eq!(ds.dropped_rows, 2);
        assert_eq!(ds.find("1").map(|(i, _)| i), Some(0));
        assert!(ds.find("9").is_none());
    }
}
