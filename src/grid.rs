use crate::{Error, Pixel, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    /// Width of the grid
    pub width: usize,
    /// Height of the grid
    pub height: usize,
    /// How many elements we need to skip to get to the next row.
    pub row_stride: usize,
    /// How many elements we need to skip to get to the next column.
    pub col_stride: usize,
}

impl Shape {
    /// Densely packed row-major shape
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            row_stride: width,
            col_stride: 1,
        }
    }

    #[inline]
    pub fn offset(&self, row: usize, col: usize) -> usize {
        row * self.row_stride + col * self.col_stride
    }

    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Read access to a 2D plane of pixels
///
/// Pixels are addressed as `(row, col)`, that is `(y, x)`: the row index comes
/// first and `get(y, x)` is the pixel at horizontal position `x` of row `y`.
pub trait PixelGrid {
    fn shape(&self) -> Shape;

    fn width(&self) -> usize {
        self.shape().width
    }

    fn height(&self) -> usize {
        self.shape().height
    }

    /// Pixel at row `row` (y) and column `col` (x), `None` outside of the grid
    fn get(&self, row: usize, col: usize) -> Option<Pixel>;
}

/// Write access to a 2D plane of pixels
pub trait PixelGridMut: PixelGrid {
    /// Store a single pixel at row `row` (y) and column `col` (x)
    ///
    /// Fails with `BufferWriteError` if sink rejects location.
    fn set(&mut self, row: usize, col: usize, pixel: Pixel) -> Result<()>;

    /// Commit whole row of pixels starting at column zero
    ///
    /// Writing stops at the first rejected pixel, already written pixels stay.
    fn write_row(&mut self, row: usize, pixels: &[Pixel]) -> Result<()> {
        for (col, pixel) in pixels.iter().enumerate() {
            self.set(row, col, *pixel)?;
        }
        Ok(())
    }
}

/// Owned pixel plane
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    shape: Shape,
    data: Vec<Pixel>,
}

impl PixelBuffer {
    /// Create buffer filled with default (opaque black) pixels
    pub fn new(width: usize, height: usize) -> Self {
        Self::new_with(width, height, |_, _| Pixel::default())
    }

    pub fn new_with<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> Pixel,
    {
        let mut data = Vec::with_capacity(height * width);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col))
            }
        }
        Self {
            shape: Shape::new(width, height),
            data,
        }
    }

    pub fn data(&self) -> &[Pixel] {
        &self.data
    }

    /// Pixels of a single row
    pub fn row(&self, row: usize) -> Option<&[Pixel]> {
        let start = self.shape.offset(row, 0);
        (row < self.shape.height).then(|| &self.data[start..start + self.shape.width])
    }

    /// Raw `[red, green, blue, opacity]` 16-bit native endian plane
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn to_vec(self) -> Vec<Pixel> {
        self.data
    }

    /// Write buffer as 16-bit RGBA PNG image (opacity is converted to alpha)
    #[cfg(feature = "png")]
    pub fn write_png(&self, w: impl std::io::Write) -> std::io::Result<()> {
        let mut encoder = png::Encoder::new(w, self.shape.width as u32, self.shape.height as u32);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Sixteen);
        let mut writer = encoder.write_header().map_err(std::io::Error::other)?;
        let mut bytes = Vec::with_capacity(self.data.len() * 8);
        for pixel in self.data.iter() {
            let [r, g, b, o] = pixel.to_array();
            for channel in [r, g, b, crate::QUANTUM_RANGE - o] {
                bytes.extend_from_slice(&channel.to_be_bytes());
            }
        }
        writer
            .write_image_data(&bytes)
            .map_err(std::io::Error::other)?;
        Ok(())
    }
}

impl PixelGrid for PixelBuffer {
    fn shape(&self) -> Shape {
        self.shape
    }

    fn get(&self, row: usize, col: usize) -> Option<Pixel> {
        if !self.shape.contains(row, col) {
            return None;
        }
        self.data.get(self.shape.offset(row, col)).copied()
    }
}

impl PixelGridMut for PixelBuffer {
    fn set(&mut self, row: usize, col: usize, pixel: Pixel) -> Result<()> {
        write_pixel(self.shape, &mut self.data, row, col, pixel)
    }

    fn write_row(&mut self, row: usize, pixels: &[Pixel]) -> Result<()> {
        if row >= self.shape.height || pixels.len() > self.shape.width {
            return Err(Error::BufferWriteError {
                row,
                col: pixels.len().min(self.shape.width),
            });
        }
        let start = self.shape.offset(row, 0);
        self.data[start..start + pixels.len()].copy_from_slice(pixels);
        Ok(())
    }
}

/// Pixel grid over a caller owned slice
///
/// Shape may describe a strided sub-region, writes outside of the slice are rejected.
#[derive(Debug)]
pub struct PixelView<'a> {
    shape: Shape,
    data: &'a mut [Pixel],
}

impl<'a> PixelView<'a> {
    pub fn new(shape: Shape, data: &'a mut [Pixel]) -> Self {
        Self { shape, data }
    }
}

impl PixelGrid for PixelView<'_> {
    fn shape(&self) -> Shape {
        self.shape
    }

    fn get(&self, row: usize, col: usize) -> Option<Pixel> {
        if !self.shape.contains(row, col) {
            return None;
        }
        self.data.get(self.shape.offset(row, col)).copied()
    }
}

impl PixelGridMut for PixelView<'_> {
    fn set(&mut self, row: usize, col: usize, pixel: Pixel) -> Result<()> {
        write_pixel(self.shape, self.data, row, col, pixel)
    }
}

fn write_pixel(shape: Shape, data: &mut [Pixel], row: usize, col: usize, pixel: Pixel) -> Result<()> {
    if !shape.contains(row, col) {
        return Err(Error::BufferWriteError { row, col });
    }
    match data.get_mut(shape.offset(row, col)) {
        Some(slot) => {
            *slot = pixel;
            Ok(())
        }
        None => Err(Error::BufferWriteError { row, col }),
    }
}

impl<G> PixelGrid for &mut G
where
    G: PixelGrid + ?Sized,
{
    fn shape(&self) -> Shape {
        (**self).shape()
    }

    fn get(&self, row: usize, col: usize) -> Option<Pixel> {
        (**self).get(row, col)
    }
}

impl<G> PixelGridMut for &mut G
where
    G: PixelGridMut + ?Sized,
{
    fn set(&mut self, row: usize, col: usize, pixel: Pixel) -> Result<()> {
        (**self).set(row, col, pixel)
    }

    fn write_row(&mut self, row: usize, pixels: &[Pixel]) -> Result<()> {
        (**self).write_row(row, pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_access() -> Result<()> {
        let mut buffer = PixelBuffer::new_with(3, 2, |row, col| Pixel::rgb(row as u16, col as u16, 0));
        assert_eq!(buffer.width(), 3);
        assert_eq!(buffer.height(), 2);
        assert_eq!(buffer.get(1, 2), Some(Pixel::rgb(1, 2, 0)));
        assert_eq!(buffer.get(2, 0), None);
        assert_eq!(buffer.get(0, 3), None);

        buffer.set(0, 0, Pixel::rgb(9, 9, 9))?;
        assert_eq!(buffer.row(0).map(|row| row[0]), Some(Pixel::rgb(9, 9, 9)));
        assert_eq!(
            buffer.set(0, 3, Pixel::default()),
            Err(Error::BufferWriteError { row: 0, col: 3 })
        );
        assert_eq!(buffer.as_bytes().len(), 3 * 2 * 8);
        Ok(())
    }

    #[test]
    fn test_write_row() -> Result<()> {
        let mut buffer = PixelBuffer::new(2, 2);
        let row = [Pixel::rgb(1, 1, 1), Pixel::rgb(2, 2, 2)];
        buffer.write_row(1, &row)?;
        assert_eq!(buffer.row(1), Some(&row[..]));
        assert!(buffer.write_row(2, &row).is_err());
        assert!(buffer.write_row(0, &[Pixel::default(); 3]).is_err());
        Ok(())
    }

    #[test]
    fn test_view_rejects_short_slice() {
        // shape claims 2x2 but only three pixels are backing it
        let mut data = vec![Pixel::default(); 3];
        let mut view = PixelView::new(Shape::new(2, 2), &mut data);
        let row = [Pixel::rgb(5, 5, 5); 2];
        assert_eq!(view.write_row(0, &row), Ok(()));
        assert_eq!(
            view.write_row(1, &row),
            Err(Error::BufferWriteError { row: 1, col: 1 })
        );
        assert_eq!(data, vec![Pixel::rgb(5, 5, 5); 3]);
    }

    #[test]
    fn test_row_col_order() -> Result<()> {
        // 3 columns (x) by 2 rows (y)
        let mut buffer = PixelBuffer::new(3, 2);
        let (x, y) = (2, 1);
        buffer.set(y, x, Pixel::rgb(4, 4, 4))?;
        assert_eq!(buffer.data()[y * 3 + x], Pixel::rgb(4, 4, 4));
        assert_eq!(buffer.get(y, x), Some(Pixel::rgb(4, 4, 4)));
        assert_eq!(buffer.get(x, y), None);
        Ok(())
    }

    #[cfg(feature = "png")]
    #[test]
    fn test_write_png() -> std::io::Result<()> {
        let buffer = PixelBuffer::new_with(2, 1, |_, col| {
            if col == 0 {
                Pixel::rgb(0x0102, 0x0304, 0x0506)
            } else {
                Pixel::new(0, 0, crate::QUANTUM_RANGE, 0x1000)
            }
        });
        let mut bytes = Vec::new();
        buffer.write_png(&mut bytes)?;

        let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
        let mut reader = decoder.read_info().map_err(std::io::Error::other)?;
        let mut image = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut image).map_err(std::io::Error::other)?;
        assert_eq!((info.width, info.height), (2, 1));
        assert_eq!(info.color_type, png::ColorType::Rgba);
        assert_eq!(info.bit_depth, png::BitDepth::Sixteen);
        assert_eq!(
            &image[..info.buffer_size()],
            &[
                0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xff, 0xff, // opaque
                0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xef, 0xff, // alpha = range - opacity
            ]
        );
        Ok(())
    }

    #[test]
    fn test_strided_view() -> Result<()> {
        // column-major 2x3 view
        let mut data = vec![Pixel::default(); 6];
        let shape = Shape {
            width: 2,
            height: 3,
            row_stride: 1,
            col_stride: 3,
        };
        let mut view = PixelView::new(shape, &mut data);
        view.set(2, 1, Pixel::rgb(7, 7, 7))?;
        assert_eq!(view.get(2, 1), Some(Pixel::rgb(7, 7, 7)));
        assert_eq!(data[5], Pixel::rgb(7, 7, 7));
        Ok(())
    }
}
