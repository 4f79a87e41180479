//! Drawing surface abstraction.
//!
//! The pipeline draws through [`Canvas`], never a concrete backend. Text
//! metrics are deterministic: a fixed per-character width factor over the
//! display width of the text, so sizing does not depend on platform font
//! rasterization.

use unicode_width::UnicodeWidthStr;

use crate::geom::{Point, Rect, Size, size};

/// Fraction of the font size one display column occupies.
pub const CHAR_WIDTH_FACTOR: f64 = 0.6;
/// Line height as a fraction of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn code(self) -> u8 {
        match self {
            FontStyle::Normal => 0,
            FontStyle::Bold => 1,
            FontStyle::Italic => 2,
            FontStyle::BoldItalic => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FontStyle::Normal),
            1 => Some(FontStyle::Bold),
            2 => Some(FontStyle::Italic),
            3 => Some(FontStyle::BoldItalic),
            _ => None,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }
}

/// Typeface selection. The document form is `"face;size;style"` with the
/// style encoded as in [`FontStyle::code`].
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub face: String,
    pub size: f64,
    pub style: FontStyle,
}

impl Font {
    pub fn new(face: impl Into<String>, size: f64, style: FontStyle) -> Self {
        Self {
            face: face.into(),
            size,
            style,
        }
    }

    pub fn to_text(&self) -> String {
        format!("{};{};{}", self.face, self.size, self.style.code())
    }

    pub fn from_text(text: &str) -> Option<Self> {
        let mut parts = text.split(';');
        let face = parts.next()?;
        let size: f64 = parts.next()?.trim().parse().ok()?;
        let style = FontStyle::from_code(parts.next()?.trim().parse().ok()?)?;
        if parts.next().is_some() || face.is_empty() || !size.is_finite() || size <= 0.0 {
            return None;
        }
        Some(Self::new(face, size, style))
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("Arial", 13.0, FontStyle::Normal)
    }
}

/// Current pen, brush, and text settings of a canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasState {
    pub line_color: String,
    pub fill_color: String,
    pub font_color: String,
    pub font: Font,
    pub line_width: f64,
    pub alpha: f64,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            line_color: "#000000".to_string(),
            fill_color: "#ffffff".to_string(),
            font_color: "#000000".to_string(),
            font: Font::default(),
            line_width: 1.0,
            alpha: 1.0,
        }
    }
}

/// Deterministic text metrics for `font`, independent of any backend.
/// Lines split on `'\n'`; width comes from the widest line.
pub fn measure_text(font: &Font, text: &str) -> Size {
    let mut widest = 0usize;
    let mut lines = 0usize;
    for line in text.split('\n') {
        lines += 1;
        widest = widest.max(line.width());
    }
    size(
        widest as f64 * font.size * CHAR_WIDTH_FACTOR,
        lines.max(1) as f64 * font.size * LINE_HEIGHT_FACTOR,
    )
}

/// Resolution-independent drawing surface.
///
/// Outline operations stroke with the current line color and width; `fill_*`
/// operations paint with the current fill color. `dash` is an on/off pattern
/// in diagram units, `None` for solid strokes.
pub trait Canvas {
    fn state(&self) -> &CanvasState;

    fn state_mut(&mut self) -> &mut CanvasState;

    /// Pushes a copy of the current state.
    fn store_state(&mut self);

    /// Pops the most recently stored state. Without a stored state the
    /// current one is kept.
    fn restore_state(&mut self);

    fn line(&mut self, from: Point, to: Point, dash: Option<&[f64]>);

    fn rect(&mut self, r: Rect, dash: Option<&[f64]>);

    fn fill_rect(&mut self, r: Rect);

    fn round_rect(&mut self, r: Rect, radius: f64, dash: Option<&[f64]>);

    fn fill_round_rect(&mut self, r: Rect, radius: f64);

    fn ellipse(&mut self, r: Rect, dash: Option<&[f64]>);

    fn fill_ellipse(&mut self, r: Rect);

    fn polyline(&mut self, points: &[Point], dash: Option<&[f64]>);

    fn polygon(&mut self, points: &[Point], dash: Option<&[f64]>);

    fn fill_polygon(&mut self, points: &[Point]);

    /// Draws `text` with its top-left corner at `at`, in the current font
    /// and font color.
    fn text_out(&mut self, at: Point, text: &str);

    fn text_extent(&self, text: &str) -> Size {
        measure_text(&self.state().font, text)
    }
}

/// Runs `body` between a store/restore pair, so state changes inside the
/// scope never leak out, whatever path the body returns through.
pub fn state_scope<C, R>(canvas: &mut C, body: impl FnOnce(&mut C) -> R) -> R
where
    C: Canvas + ?Sized,
{
    canvas.store_state();
    let out = body(canvas);
    canvas.restore_state();
    out
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Line {
        from: Point,
        to: Point,
        dash: Option<Vec<f64>>,
    },
    Rect {
        rect: Rect,
        dash: Option<Vec<f64>>,
    },
    FillRect {
        rect: Rect,
    },
    RoundRect {
        rect: Rect,
        radius: f64,
        dash: Option<Vec<f64>>,
    },
    FillRoundRect {
        rect: Rect,
        radius: f64,
    },
    Ellipse {
        rect: Rect,
        dash: Option<Vec<f64>>,
    },
    FillEllipse {
        rect: Rect,
    },
    Polyline {
        points: Vec<Point>,
        dash: Option<Vec<f64>>,
    },
    Polygon {
        points: Vec<Point>,
        dash: Option<Vec<f64>>,
    },
    FillPolygon {
        points: Vec<Point>,
    },
    Text {
        at: Point,
        text: String,
    },
}

/// Canvas that records operations instead of rasterizing them. The backbone
/// of pipeline tests and of headless size calculations.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    state: CanvasState,
    saved: Vec<CanvasState>,
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }
}

fn owned_dash(dash: Option<&[f64]>) -> Option<Vec<f64>> {
    dash.map(<[f64]>::to_vec)
}

impl Canvas for RecordingCanvas {
    fn state(&self) -> &CanvasState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CanvasState {
        &mut self.state
    }

    fn store_state(&mut self) {
        self.saved.push(self.state.clone());
    }

    fn restore_state(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    fn line(&mut self, from: Point, to: Point, dash: Option<&[f64]>) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            dash: owned_dash(dash),
        });
    }

    fn rect(&mut self, r: Rect, dash: Option<&[f64]>) {
        self.ops.push(DrawOp::Rect {
            rect: r,
            dash: owned_dash(dash),
        });
    }

    fn fill_rect(&mut self, r: Rect) {
        self.ops.push(DrawOp::FillRect { rect: r });
    }

    fn round_rect(&mut self, r: Rect, radius: f64, dash: Option<&[f64]>) {
        self.ops.push(DrawOp::RoundRect {
            rect: r,
            radius,
            dash: owned_dash(dash),
        });
    }

    fn fill_round_rect(&mut self, r: Rect, radius: f64) {
        self.ops.push(DrawOp::FillRoundRect { rect: r, radius });
    }

    fn ellipse(&mut self, r: Rect, dash: Option<&[f64]>) {
        self.ops.push(DrawOp::Ellipse {
            rect: r,
            dash: owned_dash(dash),
        });
    }

    fn fill_ellipse(&mut self, r: Rect) {
        self.ops.push(DrawOp::FillEllipse { rect: r });
    }

    fn polyline(&mut self, points: &[Point], dash: Option<&[f64]>) {
        self.ops.push(DrawOp::Polyline {
            points: points.to_vec(),
            dash: owned_dash(dash),
        });
    }

    fn polygon(&mut self, points: &[Point], dash: Option<&[f64]>) {
        self.ops.push(DrawOp::Polygon {
            points: points.to_vec(),
            dash: owned_dash(dash),
        });
    }

    fn fill_polygon(&mut self, points: &[Point]) {
        self.ops.push(DrawOp::FillPolygon {
            points: points.to_vec(),
        });
    }

    fn text_out(&mut self, at: Point, text: &str) {
        self.ops.push(DrawOp::Text {
            at,
            text: text.to_string(),
        });
    }
}
