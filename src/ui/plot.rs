use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Plot, PlotPoint, PlotPoints,
    Points, Polygon,
};

use crate::chart::brush::{resolve, Brush};
use crate::chart::spec::{datum_f64, datum_text, Channel, ChartSpec, Datum, MarkType};
use crate::color::ColorMap;
use crate::data::stats::BoxSummary;

const DEFAULT_HEIGHT: f32 = 360.0;
const DEFAULT_COLOR: Color32 = Color32::LIGHT_BLUE;
const BRUSH_FILL: Color32 = Color32::from_rgba_premultiplied(60, 60, 60, 40);

// ---------------------------------------------------------------------------
// Chart rendering
// ---------------------------------------------------------------------------

/// Draw a chart spec.  `brush` is the interval selection shared by linked
/// charts: the chart declaring it lets the user drag it, charts filtering
/// on it only draw the rows it selects.
pub fn chart(ui: &mut Ui, spec: &ChartSpec, brush: Option<&mut Brush>) {
    if let Some(title) = &spec.title {
        ui.strong(title);
    }
    let height = spec.height.map_or(DEFAULT_HEIGHT, |h| h as f32);

    match spec.mark.kind {
        MarkType::Point => {
            let brush = brush.filter(|b| spec.find_param(&b.param).is_some());
            scatter(ui, spec, height, brush);
        }
        MarkType::Boxplot => {
            let rows = match brush {
                Some(b) => resolve(spec, b),
                None => spec.data.values.iter().collect(),
            };
            boxplot(ui, spec, height, &rows);
        }
        MarkType::Bar => bar_chart(ui, spec, height),
    }
}

fn color_map(channel: Option<&Channel>) -> Option<ColorMap> {
    let channel = channel?;
    let scale = channel.scale.as_ref()?;
    Some(ColorMap::from_scale(&channel.field, &scale.domain, &scale.range))
}

/// Category axis: integer positions labelled with `labels`.
fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let pos = mark.value.round();
        if (mark.value - pos).abs() > f64::EPSILON || pos < 0.0 {
            return String::new();
        }
        labels.get(pos as usize).cloned().unwrap_or_default()
    }
}

fn tooltip_text(spec: &ChartSpec, datum: &Datum) -> String {
    spec.encoding
        .tooltip
        .iter()
        .map(|c| {
            let value = datum.get(&c.field).map(ToString::to_string).unwrap_or_default();
            format!("{}: {value}", c.label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

fn scatter(ui: &mut Ui, spec: &ChartSpec, height: f32, brush: Option<&mut Brush>) {
    let x = &spec.encoding.x;
    let y = &spec.encoding.y;
    let colors = color_map(spec.encoding.color.as_ref());
    let color_field = spec.encoding.color.as_ref().map(|c| c.field.as_str());

    let mut groups: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();
    let mut tooltips: Vec<([f64; 2], String)> = Vec::new();
    let mut y_range = (f64::INFINITY, f64::NEG_INFINITY);
    for datum in &spec.data.values {
        let (Some(px), Some(py)) = (datum_f64(datum, &x.field), datum_f64(datum, &y.field)) else {
            continue;
        };
        let label = color_field
            .and_then(|f| datum_text(datum, f))
            .unwrap_or_else(|| y.label().to_string());
        groups.entry(label).or_default().push([px, py]);
        tooltips.push(([px, py], tooltip_text(spec, datum)));
        y_range = (y_range.0.min(py), y_range.1.max(py));
    }

    let interactive = spec.is_interactive();
    let brushing = brush.is_some();
    let interval = brush.as_ref().and_then(|b| b.interval());
    let opacity = spec.mark.opacity.unwrap_or(1.0) as f32;
    // Vega-Lite point size is an area in px².
    let radius = spec
        .mark
        .size
        .map_or(3.0, |area| (area / std::f64::consts::PI).sqrt() as f32);

    let x_label = x.label().to_string();
    let y_label = y.label().to_string();
    let response = Plot::new(("scatter", x.field.as_str(), y.field.as_str()))
        .height(height)
        .legend(Legend::default())
        .x_axis_label(x.label())
        .y_axis_label(y.label())
        .allow_drag(interactive && !brushing)
        .allow_zoom(interactive)
        .allow_scroll(interactive)
        .allow_boxed_zoom(interactive)
        .allow_double_click_reset(!brushing)
        .label_formatter(move |_name: &str, value: &PlotPoint| {
            tooltips
                .iter()
                .find(|(p, _)| p[0] == value.x && p[1] == value.y)
                .map(|(_, text)| text.clone())
                .unwrap_or_else(|| {
                    format!("{x_label}: {:.2}\n{y_label}: {:.2}", value.x, value.y)
                })
        })
        .show(ui, |plot_ui| {
            for (label, points) in groups {
                let color = colors
                    .as_ref()
                    .map_or(DEFAULT_COLOR, |c| c.color_for(&label))
                    .gamma_multiply(opacity);
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(label)
                        .color(color)
                        .radius(radius),
                );
            }

            if let Some((lo, hi)) = interval {
                if y_range.0 <= y_range.1 {
                    let (bottom, top) = y_range;
                    let rect = vec![[lo, bottom], [hi, bottom], [hi, top], [lo, top]];
                    plot_ui.polygon(Polygon::new(PlotPoints::from(rect)).fill_color(BRUSH_FILL));
                }
            }
        });

    let Some(brush) = brush else {
        return;
    };
    let r = &response.response;
    let pointer_x = || {
        r.interact_pointer_pos()
            .map(|pos| response.transform.value_from_position(pos).x)
    };
    if r.double_clicked() {
        brush.clear();
    } else if r.drag_started() {
        if let Some(x) = pointer_x() {
            brush.begin(x);
        }
    } else if r.dragged() {
        if let Some(x) = pointer_x() {
            brush.drag_to(x);
        }
    }
    if r.drag_stopped() {
        brush.end();
    }
    ui.small("Drag horizontally to brush, double-click to clear.");
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

fn boxplot(ui: &mut Ui, spec: &ChartSpec, height: f32, rows: &[&Datum]) {
    let x = &spec.encoding.x;
    let y = &spec.encoding.y;
    let colors = color_map(spec.encoding.color.as_ref());
    let show_legend = spec
        .encoding
        .color
        .as_ref()
        .is_some_and(|c| !c.legend_hidden());

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for datum in rows {
        let category = datum_text(datum, &x.field);
        if let (Some(category), Some(value)) = (category, datum_f64(datum, &y.field)) {
            groups.entry(category).or_default().push(value);
        }
    }
    let labels: Vec<String> = groups.keys().cloned().collect();

    let mut plot = Plot::new(("boxplot", x.field.as_str(), y.field.as_str()))
        .height(height)
        .x_axis_label(x.label())
        .y_axis_label(y.label())
        .x_axis_formatter(category_formatter(labels));
    if show_legend {
        plot = plot.legend(Legend::default());
    }
    plot.show(ui, |plot_ui| {
        for (i, (label, values)) in groups.iter().enumerate() {
            let Some(s) = BoxSummary::from_values(values) else {
                continue;
            };
            let color = colors.as_ref().map_or(DEFAULT_COLOR, |c| c.color_for(label));
            let spread = BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker);
            let elem = BoxElem::new(i as f64, spread)
                .name(format!("{label} (n={})", s.count))
                .box_width(0.6)
                .fill(color.gamma_multiply(0.5))
                .stroke(Stroke::new(1.5, color));
            plot_ui.box_plot(BoxPlot::new(vec![elem]).name(label));
        }
    });

    ui.small(format!(
        "{} of {} listings selected",
        rows.len(),
        spec.data.values.len()
    ));
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

fn bar_chart(ui: &mut Ui, spec: &ChartSpec, height: f32) {
    let x = &spec.encoding.x;
    let y = &spec.encoding.y;
    let colors = color_map(spec.encoding.color.as_ref());

    let order: Vec<String> = x.sort.clone().unwrap_or_else(|| {
        spec.data
            .values
            .iter()
            .filter_map(|d| datum_text(d, &x.field))
            .collect()
    });
    let bars: Vec<Bar> = spec
        .data
        .values
        .iter()
        .filter_map(|datum| {
            let label = datum_text(datum, &x.field)?;
            let value = datum_f64(datum, &y.field)?;
            let pos = order.iter().position(|o| *o == label)?;
            let color = colors.as_ref().map_or(DEFAULT_COLOR, |c| c.color_for(&label));
            Some(Bar::new(pos as f64, value).name(label).fill(color).width(0.7))
        })
        .collect();

    Plot::new(("bar", x.field.as_str(), y.field.as_str()))
        .height(height)
        .x_axis_label(x.label())
        .y_axis_label(y.label())
        .x_axis_formatter(category_formatter(order))
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(y.label()));
        });
}
