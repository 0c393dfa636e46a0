use crate::chart::brush::Brush;
use crate::chart::build::{self, ReviewPair, BRUSH};
use crate::chart::spec::ChartSpec;
use crate::data::filter::{init_filter_state, price_view, FilterState, RoomTypeSelection};
use crate::data::model::ListingDataset;
use crate::data::view::{
    breakdown, review_view, Breakdown, BreakdownError, ReviewPoint, ViewConfig,
};

// ---------------------------------------------------------------------------
// Session: one dataset, its filters and everything derived from them
// ---------------------------------------------------------------------------

/// A loaded dataset together with the viewer's selections and the views and
/// charts currently derived from them.  Views are recomputed from scratch
/// whenever the slice of [`FilterState`] they read changes.
pub struct Session {
    pub dataset: ListingDataset,
    filters: FilterState,
    config: ViewConfig,

    /// Indices of listings passing the price/neighbourhood filter.
    pub price_indices: Vec<usize>,
    pub review_points: Vec<ReviewPoint>,
    pub breakdown: Result<Breakdown, BreakdownError>,

    pub price_chart: ChartSpec,
    pub review_charts: ReviewPair,
    pub breakdown_chart: Option<ChartSpec>,

    /// Interval selection on the review scatter.  Not part of the filters.
    pub brush: Brush,
}

impl Session {
    pub fn new(dataset: ListingDataset, config: ViewConfig) -> Self {
        let filters = init_filter_state(&dataset);

        let price_indices = price_view(&dataset, &filters);
        let price_chart = build::price_scatter(&dataset, &price_indices);
        let review_points = review_view(&dataset, &filters, &config);
        let review_charts = build::review_pair(&dataset, &review_points);
        let brush = Brush::for_param(&review_charts.scatter, BRUSH).unwrap_or_default();
        let breakdown = breakdown(&dataset, &filters);
        let breakdown_chart = breakdown.as_ref().ok().map(build::breakdown_bar);

        Self {
            dataset,
            filters,
            config,
            price_indices,
            review_points,
            breakdown,
            price_chart,
            review_charts,
            breakdown_chart,
            brush,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    // -- recomputation, one per derivation path --

    fn refresh_price(&mut self) {
        self.price_indices = price_view(&self.dataset, &self.filters);
        self.price_chart = build::price_scatter(&self.dataset, &self.price_indices);
        log::debug!(
            "price view: {} of {} listings",
            self.price_indices.len(),
            self.dataset.len()
        );
    }

    fn refresh_reviews(&mut self) {
        self.review_points = review_view(&self.dataset, &self.filters, &self.config);
        self.review_charts = build::review_pair(&self.dataset, &self.review_points);
        self.brush = Brush::for_param(&self.review_charts.scatter, BRUSH).unwrap_or_default();
    }

    fn refresh_breakdown(&mut self) {
        self.breakdown = breakdown(&self.dataset, &self.filters);
        self.breakdown_chart = self.breakdown.as_ref().ok().map(build::breakdown_bar);
        if let Err(e) = &self.breakdown {
            log::debug!("breakdown unavailable: {e}");
        }
    }

    // -- user input --

    pub fn set_price_range(&mut self, lo: f64, hi: f64) {
        let before = self.filters.price_range;
        self.filters.set_price_range(&self.dataset, lo, hi);
        if self.filters.price_range != before {
            self.refresh_price();
        }
    }

    pub fn set_neighbourhood(&mut self, neighbourhood: Option<String>) {
        let before = self.filters.neighbourhood.clone();
        self.filters.set_neighbourhood(neighbourhood);
        if self.filters.neighbourhood != before {
            self.refresh_price();
        }
    }

    pub fn set_room_type(&mut self, room_type: RoomTypeSelection) {
        if self.filters.room_type != room_type {
            self.filters.room_type = room_type;
            self.refresh_reviews();
        }
    }

    pub fn set_listing_id(&mut self, id: Option<String>) {
        let before = self.filters.listing_id.clone();
        self.filters.set_listing_id(id);
        if self.filters.listing_id != before {
            self.refresh_breakdown();
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset and derived views (None until a file is loaded).
    pub session: Option<Session>,

    /// Outlier settings applied to every session.
    pub config: ViewConfig,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Free-text fields of the filter panel.
    pub neighbourhood_input: String,
    pub listing_id_input: String,
}

impl AppState {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Ingest a newly loaded dataset and start a fresh session.
    pub fn set_dataset(&mut self, dataset: ListingDataset) {
        self.session = Some(Session::new(dataset, self.config));
        self.status_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{listing, with_review};
    use crate::data::view::OutlierMode;

    fn session() -> Session {
        let listings = vec![
            with_review(listing("1", 60.0, "Mitte", "Private room"), "40%", 4.2, 4.1),
            with_review(listing("2", 90.0, "Pankow", "Private room"), "75%", 4.6, 4.5),
            with_review(listing("3", 150.0, "Mitte", "Entire home/apt"), "95%", 4.9, 4.8),
        ];
        Session::new(ListingDataset::from_listings(listings, 0), ViewConfig::default())
    }

    #[test]
    fn new_session_derives_every_view() {
        let s = session();
        assert_eq!(s.price_indices, vec![0, 1, 2]);
        assert_eq!(s.review_points.len(), 3);
        assert_eq!(s.breakdown.as_ref().map(|b| b.id.as_str()), Ok("1"));
        assert!(s.breakdown_chart.is_some());
        assert_eq!(s.brush.param, BRUSH);
        assert!(s.brush.is_empty());
    }

    #[test]
    fn price_and_neighbourhood_recompute_price_view() {
        let mut s = session();
        s.set_price_range(80.0, 200.0);
        assert_eq!(s.price_indices, vec![1, 2]);
        s.set_neighbourhood(Some("Mitte".into()));
        assert_eq!(s.price_indices, vec![2]);
        assert_eq!(s.price_chart.data.values.len(), 1);
        s.set_neighbourhood(None);
        assert_eq!(s.price_indices, vec![1, 2]);
    }

    #[test]
    fn room_type_change_resets_brush() {
        let mut s = session();
        s.brush.set(30.0, 80.0);
        s.set_price_range(0.0, 100.0);
        assert!(!s.brush.is_empty());

        s.set_room_type(RoomTypeSelection::Only("Private room".into()));
        assert!(s.brush.is_empty());
        assert_eq!(s.review_points.len(), 2);
    }

    #[test]
    fn brush_does_not_touch_filters() {
        let mut s = session();
        let before = s.filters().clone();
        s.brush.begin(50.0);
        s.brush.drag_to(100.0);
        s.brush.end();
        assert_eq!(s.filters(), &before);
    }

    #[test]
    fn unknown_listing_id_is_reported() {
        let mut s = session();
        s.set_listing_id(Some("404".into()));
        assert_eq!(s.breakdown, Err(BreakdownError::NotFound("404".into())));
        assert!(s.breakdown_chart.is_none());
    }

    #[test]
    fn set_dataset_starts_a_session_with_the_app_config() {
        let config = ViewConfig {
            z_threshold: 2.0,
            outlier_mode: OutlierMode::Sequential,
        };
        let mut state = AppState::new(config);
        state.status_message = Some("Error: previous file".into());

        state.set_dataset(session().dataset);
        assert!(state.status_message.is_none());
        let s = state.session.as_ref().unwrap();
        assert_eq!(s.config(), &config);
        assert_eq!(s.dataset.len(), 3);
    }
}
