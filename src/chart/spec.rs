use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::data::model::FieldValue;

/// Schema URL written on top-level exported specs.
pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// One inline data row: field name → value.
pub type Datum = BTreeMap<String, FieldValue>;

/// Read a numeric field from a row.
pub fn datum_f64(datum: &Datum, field: &str) -> Option<f64> {
    datum.get(field).and_then(FieldValue::as_f64)
}

/// Read a text field from a row.
pub fn datum_text(datum: &Datum, field: &str) -> Option<String> {
    datum.get(field).and_then(FieldValue::as_text)
}

// ---------------------------------------------------------------------------
// Marks & encodings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkType {
    Point,
    Bar,
    Boxplot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: MarkType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Mark {
    pub fn new(kind: MarkType) -> Self {
        Self {
            kind,
            size: None,
            opacity: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Quantitative,
    Nominal,
}

/// Explicit categorical colour scale so every surface agrees on colours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scale {
    pub domain: Vec<String>,
    pub range: Vec<String>,
}

/// A field bound to a visual channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    pub field: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
    /// `Some(null)` hides the legend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<JsonValue>,
}

impl Channel {
    pub fn quantitative(field: &str) -> Self {
        Self::new(field, FieldType::Quantitative)
    }

    pub fn nominal(field: &str) -> Self {
        Self::new(field, FieldType::Nominal)
    }

    fn new(field: &str, kind: FieldType) -> Self {
        Self {
            field: field.to_string(),
            kind,
            title: None,
            sort: None,
            scale: None,
            legend: None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn sort(mut self, order: Vec<String>) -> Self {
        self.sort = Some(order);
        self
    }

    pub fn scale(mut self, scale: Scale) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn hide_legend(mut self) -> Self {
        self.legend = Some(JsonValue::Null);
        self
    }

    pub fn legend_hidden(&self) -> bool {
        matches!(self.legend, Some(JsonValue::Null))
    }

    /// Axis label: the title if set, otherwise the field name.
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.field)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Encoding {
    pub x: Channel,
    pub y: Channel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Channel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tooltip: Vec<Channel>,
}

// ---------------------------------------------------------------------------
// Selections & transforms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionType {
    Interval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingChannel {
    X,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    #[serde(rename = "type")]
    pub kind: SelectionType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub encodings: Vec<EncodingChannel>,
}

/// `scales` binds an interval selection to the axes: pan and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bind {
    Scales,
}

/// A named interactive parameter declared by a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    pub select: Selection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<Bind>,
}

impl Param {
    /// Interval selection over the given channels.
    pub fn interval(name: &str, encodings: Vec<EncodingChannel>) -> Self {
        Self {
            name: name.to_string(),
            select: Selection {
                kind: SelectionType::Interval,
                encodings,
            },
            bind: None,
        }
    }

    /// Pan/zoom on both axes; affects the view-port only.
    pub fn pan_zoom(name: &str) -> Self {
        Self {
            bind: Some(Bind::Scales),
            ..Self::interval(name, Vec::new())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamPredicate {
    pub param: String,
}

/// Keep only rows selected by the named parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transform {
    pub filter: ParamPredicate,
}

impl Transform {
    pub fn filter_by(param: &str) -> Self {
        Self {
            filter: ParamPredicate {
                param: param.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Chart specs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InlineData {
    pub values: Vec<Datum>,
}

/// Declarative description of a single chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub data: InlineData,
    pub mark: Mark,
    pub encoding: Encoding,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transform: Vec<Transform>,
}

impl ChartSpec {
    pub fn new(mark: Mark, encoding: Encoding, values: Vec<Datum>) -> Self {
        Self {
            title: None,
            width: None,
            height: None,
            data: InlineData { values },
            mark,
            encoding,
            params: Vec::new(),
            transform: Vec::new(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform.push(transform);
        self
    }

    pub fn find_param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Whether pan/zoom is enabled.
    pub fn is_interactive(&self) -> bool {
        self.params.iter().any(|p| p.bind == Some(Bind::Scales))
    }
}

/// Two charts stacked vertically that share selection parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VConcat {
    pub vconcat: Vec<ChartSpec>,
}

/// Wraps a spec with the `$schema` key for export.
#[derive(Debug, Serialize)]
pub struct TopLevel<'a, T: Serialize> {
    #[serde(rename = "$schema")]
    pub schema: &'static str,
    #[serde(flatten)]
    pub spec: &'a T,
}

impl<'a, T: Serialize> TopLevel<'a, T> {
    pub fn new(spec: &'a T) -> Self {
        Self {
            schema: VEGA_LITE_SCHEMA,
            spec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_vega_lite_shape() {
        let spec = ChartSpec::new(
            Mark {
                size: Some(60.0),
                ..Mark::new(MarkType::Point)
            },
            Encoding {
                x: Channel::quantitative("price"),
                y: Channel::quantitative("reviews_per_month"),
                color: Some(Channel::nominal("neighbourhood_cleansed").hide_legend()),
                tooltip: vec![Channel::nominal("name")],
            },
            Vec::new(),
        )
        .param(Param::pan_zoom("grid"))
        .transform(Transform::filter_by("brush"));

        let json = serde_json::to_value(TopLevel::new(&spec)).unwrap();
        assert_eq!(json["$schema"], VEGA_LITE_SCHEMA);
        assert_eq!(json["mark"]["type"], "point");
        assert_eq!(json["mark"]["size"], 60.0);
        assert_eq!(json["encoding"]["x"]["type"], "quantitative");
        assert!(json["encoding"]["color"]["legend"].is_null());
        assert!(json["encoding"]["color"].as_object().unwrap().contains_key("legend"));
        assert!(!json["encoding"]["x"].as_object().unwrap().contains_key("legend"));
        assert_eq!(json["params"][0]["bind"], "scales");
        assert_eq!(json["params"][0]["select"]["type"], "interval");
        assert_eq!(json["transform"][0]["filter"]["param"], "brush");
        assert!(json["data"]["values"].as_array().unwrap().is_empty());
        assert!(spec.is_interactive());
    }
}
