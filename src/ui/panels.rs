use eframe::egui::{self, Color32, Key, RichText, ScrollArea, Slider, Ui};

use crate::controls::{controls, RangeSlider, SelectList};
use crate::data::filter::RoomTypeSelection;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// What the user did with a select list this frame.
enum SelectEvent {
    Chose(Option<String>),
    Unchanged,
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    let Some(session) = state.session.as_mut() else {
        ui.label("No dataset loaded.");
        return;
    };
    let widgets = controls(&session.dataset, session.filters());

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- 1. Price range & neighbourhood ----
            ui.strong("1. Select Price Range & Neighbourhood");
            let (lo, hi) = range_slider(ui, &widgets.price);
            session.set_price_range(lo, hi);
            let range = session.filters().price_range;
            ui.label(format!("Selected Price Range: ({:.0}, {:.0})", range.lo, range.hi));

            if let SelectEvent::Chose(n) =
                select_list(ui, &widgets.neighbourhood, &mut state.neighbourhood_input)
            {
                session.set_neighbourhood(n);
            }
            ui.label(format!(
                "You selected: {}",
                session.filters().neighbourhood.as_deref().unwrap_or("None")
            ));
            ui.separator();

            // ---- 2. Room type ----
            ui.strong("2. Choose Room Type");
            if let SelectEvent::Chose(Some(label)) =
                select_list(ui, &widgets.room_type, &mut String::new())
            {
                session.set_room_type(RoomTypeSelection::from_label(&label));
            }
            ui.separator();

            // ---- 3. Listing id ----
            ui.strong("3. Explore Each Id");
            if let SelectEvent::Chose(id) =
                select_list(ui, &widgets.listing_id, &mut state.listing_id_input)
            {
                session.set_listing_id(id);
            }
        });
}

/// Two sliders sharing one range; returns the (possibly unordered) bounds.
fn range_slider(ui: &mut Ui, slider: &RangeSlider) -> (f64, f64) {
    let (mut lo, mut hi) = slider.value;
    ui.label(slider.label);
    ui.add(Slider::new(&mut lo, slider.min..=slider.max).step_by(1.0).text("min"));
    ui.add(Slider::new(&mut hi, slider.min..=slider.max).step_by(1.0).text("max"));
    (lo, hi)
}

/// A combo box over `select.options`, plus a text field when free text is
/// accepted.  `input` holds the text field contents between frames.
fn select_list(ui: &mut Ui, select: &SelectList, input: &mut String) -> SelectEvent {
    let mut event = SelectEvent::Unchanged;
    let selected_text = select
        .selected
        .clone()
        .or_else(|| select.placeholder.map(str::to_string))
        .unwrap_or_default();

    ui.label(RichText::new(select.label).small());
    egui::ComboBox::from_id_salt(select.label)
        .selected_text(selected_text)
        .width(ui.available_width() - 8.0)
        .height(300.0)
        .show_ui(ui, |ui: &mut Ui| {
            if select.placeholder.is_some()
                && ui.selectable_label(select.selected.is_none(), "(none)").clicked()
            {
                event = SelectEvent::Chose(None);
            }
            for option in &select.options {
                let is_selected = select.selected.as_deref() == Some(option.as_str());
                if ui.selectable_label(is_selected, option).clicked() {
                    event = SelectEvent::Chose(Some(option.clone()));
                }
            }
        });

    if select.accept_new_options {
        let hint = format!("Type a {} and press Enter", select.label);
        let response = ui.add(egui::TextEdit::singleline(input).hint_text(hint));
        if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
            event = SelectEvent::Chose(Some(input.trim().to_string()).filter(|s| !s.is_empty()));
            input.clear();
        }
    }
    event
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(session) = &state.session {
            ui.label(format!(
                "{} listings loaded ({} dropped), {} in price view",
                session.dataset.len(),
                session.dataset.dropped_rows,
                session.price_indices.len()
            ));
            ui.separator();
            let config = session.config();
            ui.label(format!(
                "Outliers: |z| > {} ({:?})",
                config.z_threshold, config.outlier_mode
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings data")
        .add_filter("Supported files", &["csv", "tsv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("TSV", &["tsv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => state.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
