use std::fmt;

use super::model::ListingDataset;

// ---------------------------------------------------------------------------
// Filter state: the user's current selections
// ---------------------------------------------------------------------------

/// Inclusive price range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub lo: f64,
    pub hi: f64,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        self.lo <= price && price <= self.hi
    }
}

/// Room-type selection; `All` passes every listing through.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RoomTypeSelection {
    #[default]
    All,
    Only(String),
}

impl RoomTypeSelection {
    pub const ALL_LABEL: &'static str = "All";

    /// Map a select-list label back to a selection.
    pub fn from_label(label: &str) -> Self {
        if label == Self::ALL_LABEL {
            RoomTypeSelection::All
        } else {
            RoomTypeSelection::Only(label.to_string())
        }
    }

    pub fn matches(&self, room_type: Option<&str>) -> bool {
        match self {
            RoomTypeSelection::All => true,
            RoomTypeSelection::Only(wanted) => room_type == Some(wanted.as_str()),
        }
    }
}

impl fmt::Display for RoomTypeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomTypeSelection::All => f.write_str(Self::ALL_LABEL),
            RoomTypeSelection::Only(rt) => f.write_str(rt),
        }
    }
}

/// Everything the user has selected in the filter panel.  Each view reads
/// only the slice of it that concerns it.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub price_range: PriceRange,
    /// `None` means every neighbourhood.  Free text is accepted, so the
    /// value may not exist in the dataset.
    pub neighbourhood: Option<String>,
    pub room_type: RoomTypeSelection,
    pub listing_id: Option<String>,
}

/// Slider bounds for a dataset: observed min/max widened to whole numbers.
pub fn price_slider_bounds(dataset: &ListingDataset) -> (f64, f64) {
    let (min, max) = dataset.price_bounds;
    (min.floor(), max.ceil())
}

/// Initialise a [`FilterState`] that shows everything.
pub fn init_filter_state(dataset: &ListingDataset) -> FilterState {
    let (lo, hi) = price_slider_bounds(dataset);
    FilterState {
        price_range: PriceRange { lo, hi },
        neighbourhood: None,
        room_type: RoomTypeSelection::All,
        listing_id: dataset.ids.first().cloned(),
    }
}

impl FilterState {
    /// Set the price range, ordered and clamped to the slider bounds.
    pub fn set_price_range(&mut self, dataset: &ListingDataset, lo: f64, hi: f64) {
        let (min, max) = price_slider_bounds(dataset);
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        self.price_range = PriceRange {
            lo: lo.clamp(min, max),
            hi: hi.clamp(min, max),
        };
    }

    /// Select a neighbourhood; blank text clears the selection.
    pub fn set_neighbourhood(&mut self, neighbourhood: Option<String>) {
        self.neighbourhood = neighbourhood
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
    }

    pub fn set_listing_id(&mut self, id: Option<String>) {
        self.listing_id = id.map(|i| i.trim().to_string()).filter(|i| !i.is_empty());
    }
}

/// Return indices of listings inside the price range and, when one is
/// selected, in exactly the chosen neighbourhood.
pub fn price_view(dataset: &ListingDataset, filters: &FilterState) -> Vec<usize> {
    let neighbourhood = filters.neighbourhood.as_deref();
    dataset
        .listings
        .iter()
        .enumerate()
        .filter(|(_, l)| filters.price_range.contains(l.price))
        .filter(|(_, l)| match neighbourhood {
            None => true,
            Some(wanted) => l.neighbourhood.as_deref() == Some(wanted),
        })
        .map(|(i, _)| i)
        .collect()
}
