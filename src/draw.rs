//! Accumulator of drawing primitives in the MVG text form
use crate::{
    utils::ScalarFmt, AffineMatrix, FillRule, Gravity, LineCap, LineJoin, Point, Result, Scalar,
};
use std::fmt::Write;

/// Text reported by `DrawBuffer::inspect` when nothing was appended
pub const NO_PRIMITIVES: &str = "(no primitives defined)";

/// Consumer of the accumulated primitives (the image library drawing call)
pub trait Renderer {
    fn render(&mut self, primitives: &str) -> Result<()>;
}

impl<F> Renderer for F
where
    F: FnMut(&str) -> Result<()>,
{
    fn render(&mut self, primitives: &str) -> Result<()> {
        self(primitives)
    }
}

/// Append-only list of newline separated primitives
///
/// Primitives are handed to the renderer in append order. Rendering only drains
/// the pending primitives, the full log stays available to `inspect`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawBuffer {
    log: String,
    pending: String,
}

fn join(buffer: &mut String, text: &str) {
    if !buffer.is_empty() {
        buffer.push('\n');
    }
    buffer.push_str(text);
}

impl DrawBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw primitive text
    pub fn append(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        join(&mut self.log, text);
        join(&mut self.pending, text);
        self
    }

    /// Everything appended so far or `NO_PRIMITIVES` if nothing was appended
    pub fn inspect(&self) -> &str {
        if self.log.is_empty() {
            NO_PRIMITIVES
        } else {
            &self.log
        }
    }

    /// Take primitives appended since the last render
    pub fn render_and_clear(&mut self) -> String {
        std::mem::take(&mut self.pending)
    }

    /// Check if there are primitives waiting to be rendered
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Hand pending primitives to the renderer
    ///
    /// Pending primitives are consumed even if renderer fails.
    pub fn draw(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        let primitives = self.render_and_clear();
        if primitives.is_empty() {
            return Ok(());
        }
        let _span = tracing::debug_span!("[draw]", lines = primitives.lines().count()).entered();
        renderer.render(&primitives)
    }

    fn primitive(&mut self, args: std::fmt::Arguments<'_>) -> &mut Self {
        let mut text = String::new();
        // writing into a string can not fail
        let _ = text.write_fmt(args);
        self.append(text)
    }

    fn points(&mut self, name: &str, points: &[Point]) -> &mut Self {
        let mut text = name.to_owned();
        for point in points {
            let _ = write!(text, " {},{}", ScalarFmt(point.x()), ScalarFmt(point.y()));
        }
        self.append(text)
    }

    pub fn affine(&mut self, matrix: AffineMatrix) -> &mut Self {
        let AffineMatrix {
            sx,
            rx,
            ry,
            sy,
            tx,
            ty,
        } = matrix;
        self.primitive(format_args!(
            "affine {},{},{},{},{},{}",
            ScalarFmt(sx),
            ScalarFmt(rx),
            ScalarFmt(ry),
            ScalarFmt(sy),
            ScalarFmt(tx),
            ScalarFmt(ty)
        ))
    }

    pub fn circle(&mut self, center: Point, perimeter: Point) -> &mut Self {
        self.points("circle", &[center, perimeter])
    }

    pub fn ellipse(
        &mut self,
        center: Point,
        width: Scalar,
        height: Scalar,
        arc_start: Scalar,
        arc_end: Scalar,
    ) -> &mut Self {
        self.primitive(format_args!(
            "ellipse {},{} {},{} {},{}",
            ScalarFmt(center.x()),
            ScalarFmt(center.y()),
            ScalarFmt(width),
            ScalarFmt(height),
            ScalarFmt(arc_start),
            ScalarFmt(arc_end)
        ))
    }

    /// Fill color, any color name or hex notation
    pub fn fill(&mut self, color: &str) -> &mut Self {
        self.primitive(format_args!("fill \"{}\"", escape(color)))
    }

    pub fn fill_opacity(&mut self, opacity: Scalar) -> &mut Self {
        self.primitive(format_args!("fill-opacity {}", ScalarFmt(opacity)))
    }

    pub fn fill_rule(&mut self, rule: FillRule) -> &mut Self {
        self.primitive(format_args!("fill-rule {}", rule))
    }

    pub fn gravity(&mut self, gravity: Gravity) -> &mut Self {
        self.primitive(format_args!("gravity {}", gravity))
    }

    pub fn line(&mut self, start: Point, end: Point) -> &mut Self {
        self.points("line", &[start, end])
    }

    pub fn point(&mut self, point: Point) -> &mut Self {
        self.points("point", &[point])
    }

    pub fn polygon(&mut self, points: &[Point]) -> &mut Self {
        self.points("polygon", points)
    }

    pub fn polyline(&mut self, points: &[Point]) -> &mut Self {
        self.points("polyline", points)
    }

    /// Save graphic context
    pub fn push(&mut self) -> &mut Self {
        self.append("push graphic-context")
    }

    /// Restore graphic context
    pub fn pop(&mut self) -> &mut Self {
        self.append("pop graphic-context")
    }

    pub fn rectangle(&mut self, top_left: Point, bottom_right: Point) -> &mut Self {
        self.points("rectangle", &[top_left, bottom_right])
    }

    pub fn roundrectangle(
        &mut self,
        top_left: Point,
        bottom_right: Point,
        corner_width: Scalar,
        corner_height: Scalar,
    ) -> &mut Self {
        self.primitive(format_args!(
            "roundrectangle {},{} {},{} {},{}",
            ScalarFmt(top_left.x()),
            ScalarFmt(top_left.y()),
            ScalarFmt(bottom_right.x()),
            ScalarFmt(bottom_right.y()),
            ScalarFmt(corner_width),
            ScalarFmt(corner_height)
        ))
    }

    pub fn stroke(&mut self, color: &str) -> &mut Self {
        self.primitive(format_args!("stroke \"{}\"", escape(color)))
    }

    pub fn stroke_width(&mut self, width: Scalar) -> &mut Self {
        self.primitive(format_args!("stroke-width {}", ScalarFmt(width)))
    }

    pub fn stroke_linecap(&mut self, cap: LineCap) -> &mut Self {
        self.primitive(format_args!("stroke-linecap {}", cap))
    }

    pub fn stroke_linejoin(&mut self, join: LineJoin) -> &mut Self {
        self.primitive(format_args!("stroke-linejoin {}", join))
    }

    /// Text at a given position, quotes, backslashes and line breaks are escaped
    pub fn text(&mut self, position: Point, text: &str) -> &mut Self {
        self.primitive(format_args!(
            "text {},{} \"{}\"",
            ScalarFmt(position.x()),
            ScalarFmt(position.y()),
            escape(text)
        ))
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}
