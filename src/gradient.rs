use crate::{
    round_to_quantum, Error, Pixel, PixelBuffer, PixelGrid, PixelGridMut, Point, Result, Scalar,
    OPAQUE_OPACITY,
};
use std::{fmt, rc::Rc};

/// Anything that can paint the whole pixel grid
pub trait Fill {
    /// Fill the grid, `progress` is invoked with `(row, rows)` after each committed row
    fn fill_with(
        &self,
        grid: &mut dyn PixelGridMut,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<()>;

    fn fill(&self, grid: &mut dyn PixelGridMut) -> Result<()> {
        self.fill_with(grid, &mut |_, _| {})
    }
}

/// Rasterization strategy picked by the gradient geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradientKind {
    /// Both anchors coincide, color radiates from the first anchor
    Point,
    /// Vertical line, color changes along the columns
    Vertical,
    /// Horizontal line, color changes along the rows
    Horizontal,
    /// Shallow diagonal, distance is measured vertically to the line
    VerticalDiagonal,
    /// Steep diagonal, distance is measured horizontally to the line
    HorizontalDiagonal,
}

/// Linear color ramp from `start` along the distance axis
///
/// Opacity is never interpolated, every produced pixel is opaque.
#[derive(Debug, Clone, Copy)]
struct Ramp {
    start: [Scalar; 3],
    step: [Scalar; 3],
}

impl Ramp {
    fn new(start: Pixel, stop: Pixel, steps: Scalar) -> Self {
        let start = [start.red(), start.green(), start.blue()].map(|c| c as Scalar);
        let stop = [stop.red(), stop.green(), stop.blue()].map(|c| c as Scalar);
        let step = if steps == 0.0 || !steps.is_finite() {
            [0.0; 3]
        } else {
            [
                (stop[0] - start[0]) / steps,
                (stop[1] - start[1]) / steps,
                (stop[2] - start[2]) / steps,
            ]
        };
        Self { start, step }
    }

    #[inline]
    fn at(&self, distance: Scalar) -> Pixel {
        let [r, g, b] = self.start;
        let [dr, dg, db] = self.step;
        Pixel::new(
            round_to_quantum(r + distance * dr),
            round_to_quantum(g + distance * dg),
            round_to_quantum(b + distance * db),
            OPAQUE_OPACITY,
        )
    }
}

/// Gradient between two anchor points
///
/// Color changes with the distance from the line through `(x1, y1)` and `(x2, y2)`,
/// or from the point `(x1, y1)` if both anchors coincide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientFill {
    start: Point,
    end: Point,
    start_color: Pixel,
    stop_color: Pixel,
}

impl GradientFill {
    pub fn new(
        x1: Scalar,
        y1: Scalar,
        x2: Scalar,
        y2: Scalar,
        start_color: Pixel,
        stop_color: Pixel,
    ) -> Self {
        Self {
            start: Point::new(x1, y1),
            end: Point::new(x2, y2),
            start_color,
            stop_color,
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn start_color(&self) -> Pixel {
        self.start_color
    }

    pub fn stop_color(&self) -> Pixel {
        self.stop_color
    }

    /// Strategy used for a grid of a given size
    pub fn kind(&self, width: usize, height: usize) -> GradientKind {
        let Point([x1, y1]) = self.start;
        let Point([x2, y2]) = self.end;
        if (x2 - x1).abs() < 0.5 {
            if (y2 - y1).abs() < 0.5 {
                GradientKind::Point
            } else {
                GradientKind::Vertical
            }
        } else if (y2 - y1).abs() < 0.5 {
            GradientKind::Horizontal
        } else {
            let slope = (y2 - y1) / (x2 - x1);
            let diagonal = height as Scalar / width as Scalar;
            if slope.abs() <= diagonal {
                GradientKind::VerticalDiagonal
            } else {
                GradientKind::HorizontalDiagonal
            }
        }
    }

    fn point_fill(
        &self,
        grid: &mut dyn PixelGridMut,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<()> {
        let (cols, rows) = (grid.width(), grid.height());
        let Point([x0, y0]) = self.start;
        let steps = ((cols as Scalar - x0).powi(2) + (rows as Scalar - y0).powi(2)).sqrt();
        tracing::debug!(steps, "[gradient_fill:steps]");
        let ramp = Ramp::new(self.start_color, self.stop_color, steps);

        let mut row_pixels = vec![Pixel::default(); cols];
        for y in 0..rows {
            for (x, pixel) in row_pixels.iter_mut().enumerate() {
                let distance = ((x as Scalar - x0).powi(2) + (y as Scalar - y0).powi(2)).sqrt();
                *pixel = ramp.at(distance);
            }
            grid.write_row(y, &row_pixels)?;
            progress(y, rows);
        }
        Ok(())
    }

    fn vertical_fill(
        &self,
        grid: &mut dyn PixelGridMut,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<()> {
        let (cols, rows) = (grid.width(), grid.height());
        let x1 = self.start.x();
        // x1 may lie outside of the grid, make the far edge that many steps further
        let mut steps = x1.max(cols as Scalar - x1);
        if x1 < 0.0 {
            steps -= x1;
        }
        tracing::debug!(steps, "[gradient_fill:steps]");
        let ramp = Ramp::new(self.start_color, self.stop_color, steps);

        // all rows are the same
        let master: Vec<Pixel> = (0..cols)
            .map(|x| ramp.at((x1 - x as Scalar).abs()))
            .collect();
        for y in 0..rows {
            grid.write_row(y, &master)?;
            progress(y, rows);
        }
        Ok(())
    }

    fn horizontal_fill(
        &self,
        grid: &mut dyn PixelGridMut,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<()> {
        let (cols, rows) = (grid.width(), grid.height());
        let y1 = self.start.y();
        let mut steps = y1.max(rows as Scalar - y1);
        if y1 < 0.0 {
            steps -= y1;
        }
        tracing::debug!(steps, "[gradient_fill:steps]");
        let ramp = Ramp::new(self.start_color, self.stop_color, steps);

        // one color per row
        let mut row_pixels = vec![Pixel::default(); cols];
        for y in 0..rows {
            row_pixels.fill(ramp.at((y1 - y as Scalar).abs()));
            grid.write_row(y, &row_pixels)?;
            progress(y, rows);
        }
        Ok(())
    }

    /// Line `y = m * x + b` through both anchors
    fn line(&self) -> (Scalar, Scalar) {
        let Point([x1, y1]) = self.start;
        let Point([x2, y2]) = self.end;
        let m = (y2 - y1) / (x2 - x1);
        (m, y1 - m * x1)
    }

    /// Ramp for the diagonal strategies
    ///
    /// Negative steps means the line is outside of the grid, in which case colors are
    /// swapped and steps are negated.
    fn diagonal_ramp(&self, steps: Scalar) -> Ramp {
        tracing::debug!(steps, "[gradient_fill:steps]");
        if steps < 0.0 {
            Ramp::new(self.stop_color, self.start_color, -steps)
        } else {
            Ramp::new(self.start_color, self.stop_color, steps)
        }
    }

    fn vertical_diagonal_fill(
        &self,
        grid: &mut dyn PixelGridMut,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<()> {
        let (cols, rows) = (grid.width(), grid.height());
        let (m, b) = self.line();
        let (cols_f, rows_f) = (cols as Scalar, rows as Scalar);

        // largest vertical distance between the line and the top or bottom edge
        // over the grid columns
        let d1 = b;
        let d2 = m * cols_f + b;
        let steps = if d1 < 0.0 && d2 < 0.0 {
            d1.abs().max(d2.abs())
        } else if d1 > rows_f && d2 > rows_f {
            (d1 - rows_f).max(d2 - rows_f)
        } else {
            let d1 = b.max(rows_f - b);
            let d2 = d2.max(rows_f - d2);
            d1.max(d2)
        };
        let ramp = self.diagonal_ramp(steps);

        let mut row_pixels = vec![Pixel::default(); cols];
        for y in 0..rows {
            for (x, pixel) in row_pixels.iter_mut().enumerate() {
                let distance = (y as Scalar - (m * x as Scalar + b)).abs();
                *pixel = ramp.at(distance);
            }
            grid.write_row(y, &row_pixels)?;
            progress(y, rows);
        }
        Ok(())
    }

    fn horizontal_diagonal_fill(
        &self,
        grid: &mut dyn PixelGridMut,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<()> {
        let (cols, rows) = (grid.width(), grid.height());
        let (m, b) = self.line();
        let (cols_f, rows_f) = (cols as Scalar, rows as Scalar);

        // largest horizontal distance between the line and the left or right edge
        // over the grid rows
        let x1 = -b / m;
        let x2 = (rows_f - b) / m;
        let steps = if x1 < 0.0 && x2 < 0.0 {
            x1.abs().max(x2.abs())
        } else if x1 > cols_f && x2 > cols_f {
            (x1 - cols_f).max(x2 - cols_f)
        } else {
            let d1 = x1.max(cols_f - x1);
            let d2 = x2.max(cols_f - x2);
            d1.max(d2)
        };
        let ramp = self.diagonal_ramp(steps);

        let mut row_pixels = vec![Pixel::default(); cols];
        for y in 0..rows {
            let line_x = (y as Scalar - b) / m;
            for (x, pixel) in row_pixels.iter_mut().enumerate() {
                *pixel = ramp.at((x as Scalar - line_x).abs());
            }
            grid.write_row(y, &row_pixels)?;
            progress(y, rows);
        }
        Ok(())
    }
}

impl Fill for GradientFill {
    fn fill_with(
        &self,
        grid: &mut dyn PixelGridMut,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<()> {
        let shape = grid.shape();
        if shape.is_empty() {
            return Ok(());
        }
        let kind = self.kind(shape.width, shape.height);
        let _span = tracing::debug_span!(
            "[gradient_fill]",
            ?kind,
            width = shape.width,
            height = shape.height
        )
        .entered();
        match kind {
            GradientKind::Point => self.point_fill(grid, progress),
            GradientKind::Vertical => self.vertical_fill(grid, progress),
            GradientKind::Horizontal => self.horizontal_fill(grid, progress),
            GradientKind::VerticalDiagonal => self.vertical_diagonal_fill(grid, progress),
            GradientKind::HorizontalDiagonal => self.horizontal_diagonal_fill(grid, progress),
        }
    }
}

impl fmt::Display for GradientFill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GradientFill({}, {}) start_color=({}) stop_color=({})",
            self.start, self.end, self.start_color, self.stop_color
        )
    }
}

/// Tiles a texture over the whole grid
///
/// Texture is shared, it stays alive for as long as the fill does.
#[derive(Debug, Clone)]
pub struct TextureFill {
    texture: Rc<PixelBuffer>,
}

impl TextureFill {
    pub fn new(texture: Rc<PixelBuffer>) -> Result<Self> {
        if texture.shape().is_empty() {
            return Err(Error::invalid_format("texture must not be empty"));
        }
        Ok(Self { texture })
    }

    pub fn texture(&self) -> &Rc<PixelBuffer> {
        &self.texture
    }
}

impl Fill for TextureFill {
    fn fill_with(
        &self,
        grid: &mut dyn PixelGridMut,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<()> {
        let (cols, rows) = (grid.width(), grid.height());
        let (tex_width, tex_height) = (self.texture.width(), self.texture.height());
        tracing::debug!(cols, rows, tex_width, tex_height, "[texture_fill]");

        let mut row_pixels: Vec<Pixel> = Vec::with_capacity(cols);
        for y in 0..rows {
            row_pixels.clear();
            if let Some(tex_row) = self.texture.row(y % tex_height) {
                row_pixels.extend(tex_row.iter().cycle().take(cols));
            }
            grid.write_row(y, &row_pixels)?;
            progress(y, rows);
        }
        Ok(())
    }
}
