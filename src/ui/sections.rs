use eframe::egui::{Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{AppState, Session};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Central panel – the three chart sections
// ---------------------------------------------------------------------------

/// Render the chart sections in the central panel.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(session) = state.session.as_mut() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a listings file to explore  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Listings Data Visualization");
            ui.separator();
            price_section(ui, session);
            ui.separator();
            review_section(ui, session);
            ui.separator();
            breakdown_section(ui, session);
        });
}

fn price_section(ui: &mut Ui, session: &Session) {
    ui.label(format!(
        "{} of {} listings in range",
        session.price_indices.len(),
        session.dataset.len()
    ));
    plot::chart(ui, &session.price_chart, None);
}

fn review_section(ui: &mut Ui, session: &mut Session) {
    ui.heading("Host Acceptance Rate vs Review Scores Rating & Brushing by Neighbourhood");
    ui.label(format!(
        "{} listings with complete review data after outlier removal",
        session.review_points.len()
    ));
    plot::chart(ui, &session.review_charts.scatter, Some(&mut session.brush));
    if let Some((lo, hi)) = session.brush.interval() {
        ui.label(format!("Brushed acceptance rate: {lo:.1}% – {hi:.1}%"));
    }
    plot::chart(ui, &session.review_charts.boxplot, Some(&mut session.brush));
}

fn breakdown_section(ui: &mut Ui, session: &Session) {
    ui.heading("Review Categories Based on Id");
    let breakdown = match &session.breakdown {
        Ok(b) => b,
        Err(e) => {
            ui.label(RichText::new(format!("No breakdown: {e}")).color(Color32::RED));
            return;
        }
    };
    ui.label(format!("Name: {}", breakdown.name));
    ui.label(format!("Id: {}", breakdown.id));

    if let Some(chart) = &session.breakdown_chart {
        plot::chart(ui, chart, None);
    }

    ui.push_id("score_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(220.0))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Review Category");
                });
                header.col(|ui| {
                    ui.strong("Score");
                });
            })
            .body(|mut body| {
                for (category, score) in &breakdown.scores {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(category.column());
                        });
                        row.col(|ui| {
                            ui.label(score.map_or("–".to_string(), |s| format!("{s:.2}")));
                        });
                    });
                }
            });
    });
}
