//! Ephemeral brush state and its application to linked charts.
//!
//! A brush belongs to the render pass, not to the filter state: changing it
//! only changes which rows a linked chart draws.

use super::spec::{datum_f64, ChartSpec, Datum, EncodingChannel};

/// Current interval of a named x-interval selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Brush {
    pub param: String,
    /// Field the interval applies to (the x field of the owning chart).
    pub field: String,
    interval: Option<(f64, f64)>,
    anchor: Option<f64>,
}

impl Brush {
    /// Empty brush for `param` as declared on `spec`.  Returns `None` when the
    /// chart declares no such x-interval parameter.
    pub fn for_param(spec: &ChartSpec, param: &str) -> Option<Self> {
        let declared = spec.find_param(param)?;
        if !declared.select.encodings.contains(&EncodingChannel::X) {
            return None;
        }
        Some(Self {
            param: param.to_string(),
            field: spec.encoding.x.field.clone(),
            interval: None,
            anchor: None,
        })
    }

    pub fn interval(&self) -> Option<(f64, f64)> {
        self.interval
    }

    pub fn is_empty(&self) -> bool {
        self.interval.is_none()
    }

    /// Set the interval; bounds are ordered.
    pub fn set(&mut self, a: f64, b: f64) {
        self.interval = Some(if a <= b { (a, b) } else { (b, a) });
    }

    pub fn clear(&mut self) {
        self.interval = None;
        self.anchor = None;
    }

    /// Start a drag at `x`.
    pub fn begin(&mut self, x: f64) {
        self.anchor = Some(x);
        self.interval = None;
    }

    /// Extend the drag started with [`Brush::begin`] to `x`.
    pub fn drag_to(&mut self, x: f64) {
        if let Some(anchor) = self.anchor {
            self.set(anchor, x);
        }
    }

    pub fn end(&mut self) {
        self.anchor = None;
    }

    /// Whether a row falls inside the interval.  An empty brush selects
    /// everything; a row without a numeric value is outside any interval.
    pub fn selects(&self, datum: &Datum) -> bool {
        match self.interval {
            None => true,
            Some((lo, hi)) => datum_f64(datum, &self.field).is_some_and(|x| lo <= x && x <= hi),
        }
    }
}

/// Rows `spec` displays under the current brush.  Filters on parameters other
/// than the brush's own are treated as empty selections.
pub fn resolve<'a>(spec: &'a ChartSpec, brush: &Brush) -> Vec<&'a Datum> {
    let filtered = spec
        .transform
        .iter()
        .any(|t| t.filter.param == brush.param);
    spec.data
        .values
        .iter()
        .filter(|datum| !filtered || brush.selects(datum))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::spec::{Channel, Encoding, Mark, MarkType, Param, Transform};
    use crate::data::model::FieldValue;

    fn row(x: f64) -> Datum {
        Datum::from([("x".to_string(), FieldValue::Float(x))])
    }

    fn charts() -> (ChartSpec, ChartSpec) {
        let encoding = Encoding {
            x: Channel::quantitative("x"),
            y: Channel::quantitative("y"),
            color: None,
            tooltip: Vec::new(),
        };
        let values: Vec<Datum> = [10.0, 20.0, 30.0, 40.0].into_iter().map(row).collect();
        let source = ChartSpec::new(Mark::new(MarkType::Point), encoding.clone(), values.clone())
            .param(Param::interval("brush", vec![EncodingChannel::X]));
        let linked = ChartSpec::new(Mark::new(MarkType::Boxplot), encoding, values)
            .transform(Transform::filter_by("brush"));
        (source, linked)
    }

    #[test]
    fn brush_binds_to_source_x_field() {
        let (source, linked) = charts();
        let brush = Brush::for_param(&source, "brush").unwrap();
        assert_eq!(brush.field, "x");
        assert!(brush.is_empty());
        assert!(Brush::for_param(&linked, "brush").is_none());
        assert!(Brush::for_param(&source, "zoom").is_none());
    }

    #[test]
    fn interval_filters_linked_chart_only() {
        let (source, linked) = charts();
        let mut brush = Brush::for_param(&source, "brush").unwrap();
        brush.begin(35.0);
        brush.drag_to(15.0);
        brush.end();
        assert_eq!(brush.interval(), Some((15.0, 35.0)));

        assert_eq!(resolve(&linked, &brush).len(), 2);
        assert_eq!(resolve(&source, &brush).len(), 4);
    }

    #[test]
    fn cleared_brush_selects_everything() {
        let (source, linked) = charts();
        let mut brush = Brush::for_param(&source, "brush").unwrap();
        brush.set(100.0, 200.0);
        assert!(resolve(&linked, &brush).is_empty());
        brush.clear();
        assert_eq!(resolve(&linked, &brush).len(), linked.data.values.len());
    }

    #[test]
    fn rows_without_value_are_outside_interval() {
        let mut brush = Brush {
            param: "brush".into(),
            field: "x".into(),
            ..Brush::default()
        };
        assert!(brush.selects(&Datum::new()));
        brush.set(0.0, 1.0);
        assert!(!brush.selects(&Datum::new()));
    }
}
