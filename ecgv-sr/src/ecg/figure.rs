//! Drawing surface for one chart
//!
//! A [`Figure`] accumulates an SVG scene in page points. It is created per
//! render, passed explicitly to every drawing routine and consumed by
//! [`Figure::into_svg`]; nothing is shared between requests.

use std::borrow::Cow;

use super::scale::AxisRange;

const FONT_FAMILY: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";

/// Axis-aligned rectangle in page points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Line color and width (points)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: &'static str,
    pub width: f64,
}

pub const MAJOR_GRID: Stroke = Stroke { color: "#ff0000", width: 0.8 };
pub const MINOR_GRID: Stroke = Stroke { color: "#ffc0cb", width: 0.5 };
pub const TRACE: Stroke = Stroke { color: "#000000", width: 0.7 };
pub const CALIBRATION: Stroke = Stroke { color: "#0000ff", width: 1.5 };

/// Horizontal text alignment relative to the anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_svg(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// Data-to-page mapping for one panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axes {
    pub rect: Rect,
    pub t_min: f64,
    pub t_max: f64,
    pub range: AxisRange,
}

impl Axes {
    pub fn new(rect: Rect, t_min: f64, t_max: f64, range: AxisRange) -> Self {
        Self { rect, t_min, t_max, range }
    }

    /// Seconds to page x
    pub fn x(&self, t: f64) -> f64 {
        self.rect.x + (t - self.t_min) / (self.t_max - self.t_min) * self.rect.width
    }

    /// Millivolts to page y (up is positive)
    pub fn y(&self, mv: f64) -> f64 {
        self.rect.bottom() - (mv - self.range.min_mv) / self.range.span() * self.rect.height
    }
}

/// SVG scene under construction
pub struct Figure {
    width: f64,
    height: f64,
    defs: String,
    body: String,
    clip_count: usize,
}

impl Figure {
    /// Blank white page of `width` x `height` points
    pub fn new(width: f64, height: f64) -> Self {
        let body = format!(
            r##"<rect x="0" y="0" width="{:.2}" height="{:.2}" fill="#ffffff"/>"##,
            width, height
        );
        Self {
            width,
            height,
            defs: String::new(),
            body,
            clip_count: 0,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Run `draw` with everything it emits clipped to `rect`
    pub fn clipped(&mut self, rect: Rect, draw: impl FnOnce(&mut Figure)) {
        let id = format!("panel-{}", self.clip_count);
        self.clip_count += 1;
        self.defs.push_str(&format!(
            r##"<clipPath id="{}"><rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}"/></clipPath>"##,
            id, rect.x, rect.y, rect.width, rect.height
        ));
        self.body.push_str(&format!(r##"<g clip-path="url(#{})">"##, id));
        draw(self);
        self.body.push_str("</g>");
    }

    /// Raw SVG path data, stroked
    pub fn path(&mut self, d: &str, stroke: Stroke) {
        if d.is_empty() {
            return;
        }
        self.body.push_str(&format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
            d, stroke.color, stroke.width
        ));
    }

    /// Connected line through `points`
    pub fn polyline(&mut self, points: impl IntoIterator<Item = (f64, f64)>, stroke: Stroke) {
        let coords: Vec<String> = points
            .into_iter()
            .map(|(x, y)| format!("{:.2},{:.2}", x, y))
            .collect();
        if coords.is_empty() {
            return;
        }
        self.body.push_str(&format!(
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linejoin="round"/>"#,
            coords.join(" "),
            stroke.color,
            stroke.width
        ));
    }

    /// Single line of text with its baseline at `y`
    pub fn text(&mut self, x: f64, y: f64, text: &str, size: f64, anchor: Anchor) {
        self.body.push_str(&format!(
            r##"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{}" text-anchor="{}" fill="#000000">{}</text>"##,
            x,
            y,
            FONT_FAMILY,
            size,
            anchor.as_svg(),
            escape_xml(text)
        ));
    }

    /// Text rotated 90° counter-clockwise, centered on (`x`, `y`)
    pub fn vertical_text(&mut self, x: f64, y: f64, text: &str, size: f64) {
        self.body.push_str(&format!(
            r##"<text x="{x:.2}" y="{y:.2}" transform="rotate(-90 {x:.2} {y:.2})" font-family="{}" font-size="{}" text-anchor="middle" fill="#000000">{}</text>"##,
            FONT_FAMILY,
            size,
            escape_xml(text),
            x = x,
            y = y
        ));
    }

    /// Finish the scene as an SVG document
    pub fn into_svg(self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.2}" height="{h:.2}" viewBox="0 0 {w:.2} {h:.2}"><defs>{}</defs>{}</svg>"#,
            self.defs,
            self.body,
            w = self.width,
            h = self.height
        )
    }
}

/// Escape text for use as SVG character data
pub fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_mapping() {
        let axes = Axes::new(
            Rect::new(10.0, 20.0, 100.0, 50.0),
            0.0,
            2.0,
            AxisRange::new(-1.0, 1.5),
        );
        assert_eq!(axes.x(0.0), 10.0);
        assert_eq!(axes.x(2.0), 110.0);
        assert_eq!(axes.x(1.0), 60.0);
        assert_eq!(axes.y(-1.0), 70.0);
        assert_eq!(axes.y(1.5), 20.0);
        assert_eq!(axes.y(0.25), 45.0);
    }

    #[test]
    fn test_escape_xml() {
        assert!(matches!(escape_xml("plain"), Cow::Borrowed("plain")));
        assert_eq!(escape_xml("A & B <C>"), "A &amp; B &lt;C&gt;");
        assert_eq!(escape_xml("O'Neil \"Jr\""), "O&apos;Neil &quot;Jr&quot;");
    }

    #[test]
    fn test_clip_groups_are_balanced() {
        let mut fig = Figure::new(200.0, 100.0);
        fig.clipped(Rect::new(0.0, 0.0, 100.0, 100.0), |f| {
            f.path("M0 0H10", MAJOR_GRID);
        });
        fig.clipped(Rect::new(100.0, 0.0, 100.0, 100.0), |f| {
            f.polyline(vec![(0.0, 0.0), (1.0, 1.0)], TRACE);
        });
        let svg = fig.into_svg();
        assert_eq!(svg.matches("<clipPath").count(), 2);
        assert_eq!(svg.matches("<g clip-path").count(), 2);
        assert_eq!(svg.matches("</g>").count(), 2);
        assert!(svg.contains(r#"url(#panel-1)"#));
        assert!(svg.contains(r#"points="0.00,0.00 1.00,1.00""#));
    }

    #[test]
    fn test_empty_drawables_emit_nothing() {
        let mut fig = Figure::new(10.0, 10.0);
        let before = fig.body.len();
        fig.path("", TRACE);
        fig.polyline(Vec::new(), TRACE);
        assert_eq!(fig.body.len(), before);
    }

    #[test]
    fn test_text_is_escaped() {
        let mut fig = Figure::new(10.0, 10.0);
        fig.text(1.0, 2.0, "Smith & Sons", 10.0, Anchor::Start);
        let svg = fig.into_svg();
        assert!(svg.contains(">Smith &amp; Sons</text>"));
        assert!(svg.contains(r#"text-anchor="start""#));
    }

    #[test]
    fn test_page_and_text_colors() {
        let mut fig = Figure::new(20.0, 10.0);
        fig.text(1.0, 2.0, "I", 10.0, Anchor::End);
        fig.vertical_text(5.0, 5.0, "II (mV)", 10.0);
        let svg = fig.into_svg();
        assert!(svg.contains(r##"width="20.00" height="10.00" fill="#ffffff"/>"##));
        assert_eq!(svg.matches(r##"fill="#000000">"##).count(), 2);
        assert!(svg.contains("rotate(-90 5.00 5.00)"));
    }
}
