//! SVG backend.
//!
//! Emits one SVG element per canvas operation into a growing string body;
//! [`SvgCanvas::finish`] wraps it in the document envelope. Output is fully
//! deterministic for a given op sequence.

use std::fmt::Write as _;

use crate::canvas::{Canvas, CanvasState};
use crate::geom::{Point, Rect};

#[derive(Debug, Default)]
pub struct SvgCanvas {
    state: CanvasState,
    saved: Vec<CanvasState>,
    body: String,
}

/// Normalizes `-0` so it never reaches the output.
fn num(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

fn escape_xml_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_xml_into(&mut out, text);
    out
}

fn points_attr(points: &[Point]) -> String {
    let mut out = String::new();
    for (at, p) in points.iter().enumerate() {
        if at > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{},{}", num(p.x), num(p.y));
    }
    out
}

impl SvgCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements emitted so far, without the `<svg>` envelope.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn finish(self, width: f64, height: f64) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = num(width),
            h = num(height),
            body = self.body,
        )
    }

    fn stroke_attrs(&self, dash: Option<&[f64]>) -> String {
        let mut out = format!(
            " stroke=\"{}\" stroke-width=\"{}\"",
            escape_xml(&self.state.line_color),
            num(self.state.line_width),
        );
        if let Some(dash) = dash {
            out.push_str(" stroke-dasharray=\"");
            for (at, step) in dash.iter().enumerate() {
                if at > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{}", num(*step));
            }
            out.push('"');
        }
        out.push_str(&self.opacity_attr());
        out
    }

    fn fill_attrs(&self) -> String {
        format!(
            " fill=\"{}\" stroke=\"none\"{}",
            escape_xml(&self.state.fill_color),
            self.opacity_attr(),
        )
    }

    fn opacity_attr(&self) -> String {
        if self.state.alpha < 1.0 {
            format!(" opacity=\"{}\"", num(self.state.alpha))
        } else {
            String::new()
        }
    }
}

impl Canvas for SvgCanvas {
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
        let attrs = self.stroke_attrs(dash);
        let _ = writeln!(
            self.body,
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" fill=\"none\"{attrs}/>",
            num(from.x),
            num(from.y),
            num(to.x),
            num(to.y),
        );
    }

    fn rect(&mut self, r: Rect, dash: Option<&[f64]>) {
        let attrs = self.stroke_attrs(dash);
        let _ = writeln!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\"{attrs}/>",
            num(r.min_x()),
            num(r.min_y()),
            num(r.size.width),
            num(r.size.height),
        );
    }

    fn fill_rect(&mut self, r: Rect) {
        let attrs = self.fill_attrs();
        let _ = writeln!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{attrs}/>",
            num(r.min_x()),
            num(r.min_y()),
            num(r.size.width),
            num(r.size.height),
        );
    }

    fn round_rect(&mut self, r: Rect, radius: f64, dash: Option<&[f64]>) {
        let attrs = self.stroke_attrs(dash);
        let _ = writeln!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" fill=\"none\"{attrs}/>",
            num(r.min_x()),
            num(r.min_y()),
            num(r.size.width),
            num(r.size.height),
            num(radius),
        );
    }

    fn fill_round_rect(&mut self, r: Rect, radius: f64) {
        let attrs = self.fill_attrs();
        let _ = writeln!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\"{attrs}/>",
            num(r.min_x()),
            num(r.min_y()),
            num(r.size.width),
            num(r.size.height),
            num(radius),
        );
    }

    fn ellipse(&mut self, r: Rect, dash: Option<&[f64]>) {
        let attrs = self.stroke_attrs(dash);
        let c = r.center();
        let _ = writeln!(
            self.body,
            "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" fill=\"none\"{attrs}/>",
            num(c.x),
            num(c.y),
            num(r.size.width / 2.0),
            num(r.size.height / 2.0),
        );
    }

    fn fill_ellipse(&mut self, r: Rect) {
        let attrs = self.fill_attrs();
        let c = r.center();
        let _ = writeln!(
            self.body,
            "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\"{attrs}/>",
            num(c.x),
            num(c.y),
            num(r.size.width / 2.0),
            num(r.size.height / 2.0),
        );
    }

    fn polyline(&mut self, points: &[Point], dash: Option<&[f64]>) {
        let attrs = self.stroke_attrs(dash);
        let _ = writeln!(
            self.body,
            "<polyline points=\"{}\" fill=\"none\"{attrs}/>",
            points_attr(points),
        );
    }

    fn polygon(&mut self, points: &[Point], dash: Option<&[f64]>) {
        let attrs = self.stroke_attrs(dash);
        let _ = writeln!(
            self.body,
            "<polygon points=\"{}\" fill=\"none\"{attrs}/>",
            points_attr(points),
        );
    }

    fn fill_polygon(&mut self, points: &[Point]) {
        let attrs = self.fill_attrs();
        let _ = writeln!(
            self.body,
            "<polygon points=\"{}\"{attrs}/>",
            points_attr(points),
        );
    }

    fn text_out(&mut self, at: Point, text: &str) {
        let font = self.state.font.clone();
        let mut attrs = format!(
            " font-family=\"{}\" font-size=\"{}\"",
            escape_xml(&font.face),
            num(font.size),
        );
        if font.style.is_bold() {
            attrs.push_str(" font-weight=\"bold\"");
        }
        if font.style.is_italic() {
            attrs.push_str(" font-style=\"italic\"");
        }
        let _ = write!(
            self.body,
            "<text x=\"{}\" y=\"{}\" dominant-baseline=\"text-before-edge\"{attrs} fill=\"{}\"{}>",
            num(at.x),
            num(at.y),
            escape_xml(&self.state.font_color),
            self.opacity_attr(),
        );
        escape_xml_into(&mut self.body, text);
        self.body.push_str("</text>\n");
    }
}
