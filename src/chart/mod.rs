/// Chart layer: declarative chart specs built from derived views.
///
/// ```text
///   price view ──► build::price_scatter ─┐
///   review view ─► build::review_pair ───┼──► ChartSpec ──► ui::plot / export
///   breakdown ───► build::breakdown_bar ─┘        ▲
///                                                 │
///                              brush::Brush ──────┘  (ephemeral, per render)
/// ```

pub mod brush;
pub mod build;
pub mod spec;
