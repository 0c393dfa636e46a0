//! Filter widget definitions handed to the render surface.

use crate::data::filter::{price_slider_bounds, FilterState, RoomTypeSelection};
use crate::data::model::ListingDataset;

/// Two-handle numeric slider.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSlider {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub value: (f64, f64),
}

/// Single-choice select list.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectList {
    pub label: &'static str,
    pub options: Vec<String>,
    pub selected: Option<String>,
    pub placeholder: Option<&'static str>,
    /// Typed values outside `options` are accepted.
    pub accept_new_options: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub price: RangeSlider,
    pub neighbourhood: SelectList,
    pub room_type: SelectList,
    pub listing_id: SelectList,
}

/// Describe the sidebar widgets for the current dataset and selections.
pub fn controls(dataset: &ListingDataset, filters: &FilterState) -> Controls {
    let (min, max) = price_slider_bounds(dataset);
    let room_types = std::iter::once(RoomTypeSelection::ALL_LABEL.to_string())
        .chain(dataset.room_types.iter().cloned())
        .collect();

    Controls {
        price: RangeSlider {
            label: "Select a price range",
            min,
            max,
            value: (filters.price_range.lo, filters.price_range.hi),
        },
        neighbourhood: SelectList {
            label: "Neighbourhood",
            options: dataset.neighbourhoods.iter().cloned().collect(),
            selected: filters.neighbourhood.clone(),
            placeholder: Some("Choose a neighbourhood to explore"),
            accept_new_options: true,
        },
        room_type: SelectList {
            label: "Room Type",
            options: room_types,
            selected: Some(filters.room_type.to_string()),
            placeholder: None,
            accept_new_options: false,
        },
        listing_id: SelectList {
            label: "Id",
            options: dataset.ids.clone(),
            selected: filters.listing_id.clone(),
            placeholder: None,
            accept_new_options: true,
        },
    }
}
