use fl_core::model::Color;

/// Colors and base stroke widths of the canvas.
///
/// Widths are in screen pixels; the render pipeline divides them by the
/// zoom factor before handing them to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub grid: Color,
    pub connection: Color,
    pub demand: Color,
    pub facility: Color,
    /// Facility that shares its spot with at least one demand.
    pub colocated: Color,
    /// Ring drawn around the hovered marker.
    pub highlight: Color,
    pub grid_width: f64,
    pub connection_width: f64,
    pub marker_width: f64,
}

impl Theme {
    /// Dark theme, the default look of the canvas.
    pub fn dark() -> Self {
        Self {
            background: Color::rgb8(0x1a, 0x1a, 0x1a),
            grid: Color::rgb8(0xb0, 0xb0, 0xb0).with_alpha(0.1),
            connection: Color::rgb8(0xb0, 0xb0, 0xb0).with_alpha(0.4),
            demand: Color::rgb8(0xff, 0x6b, 0x6b),
            facility: Color::rgb8(0x00, 0xdd, 0xff),
            colocated: Color::rgb8(0x00, 0xff, 0x84),
            highlight: Color::rgb8(0xff, 0xd6, 0x0a),
            grid_width: 1.0,
            connection_width: 2.0,
            marker_width: 2.0,
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::rgb8(0xf5, 0xf5, 0xf7),
            grid: Color::rgb8(0x00, 0x00, 0x00).with_alpha(0.08),
            connection: Color::rgb8(0x6b, 0x70, 0x80).with_alpha(0.4),
            demand: Color::rgb8(0xd9, 0x3f, 0x3f),
            facility: Color::rgb8(0x00, 0x7a, 0xcc),
            colocated: Color::rgb8(0x0f, 0x9d, 0x58),
            highlight: Color::rgb8(0xf5, 0x9e, 0x0b),
            ..Self::dark()
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
