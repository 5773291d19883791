use crate::{utils::ScalarFmt, Error};
use std::{
    fmt,
    ops::{Add, Sub},
    str::FromStr,
};

pub type Scalar = f64;
pub const EPSILON: f64 = f64::EPSILON;
pub const PI: f64 = std::f64::consts::PI;

/// Value representing a 2D point or vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point(pub [Scalar; 2]);

impl Point {
    #[inline]
    pub const fn new(x: Scalar, y: Scalar) -> Self {
        Self([x, y])
    }

    /// Get `x` component of the point
    #[inline]
    pub const fn x(self) -> Scalar {
        self.0[0]
    }

    /// Get `y` compenent of the point
    #[inline]
    pub const fn y(self) -> Scalar {
        self.0[1]
    }

    /// Get length of the vector (distance from the origin)
    pub fn length(self) -> Scalar {
        let Self([x, y]) = self;
        x.hypot(y)
    }

    /// Distance between two points
    pub fn dist(self, other: Self) -> Scalar {
        (self - other).length()
    }
}

impl From<(Scalar, Scalar)> for Point {
    #[inline]
    fn from(xy: (Scalar, Scalar)) -> Self {
        Self([xy.0, xy.1])
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 + x1, y0 + y1])
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 - x1, y0 - y1])
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x={}, y={}", ScalarFmt(self.x()), ScalarFmt(self.y()))
    }
}

/// Chromaticity primary (`z` is usually zero)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PrimaryInfo {
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
}

impl PrimaryInfo {
    pub const fn new(x: Scalar, y: Scalar, z: Scalar) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for PrimaryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={}, y={}, z={}",
            ScalarFmt(self.x),
            ScalarFmt(self.y),
            ScalarFmt(self.z)
        )
    }
}

/// Chromaticity of an image: red, green and blue primaries plus the white point
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Chromaticity {
    pub red_primary: PrimaryInfo,
    pub green_primary: PrimaryInfo,
    pub blue_primary: PrimaryInfo,
    pub white_point: PrimaryInfo,
}

impl fmt::Display for Chromaticity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = [
            ("red_primary", self.red_primary),
            ("green_primary", self.green_primary),
            ("blue_primary", self.blue_primary),
            ("white_point", self.white_point),
        ];
        for (index, (name, primary)) in entries.iter().enumerate() {
            if index != 0 {
                write!(f, " ")?;
            }
            write!(
                f,
                "{}=(x={},y={})",
                name,
                ScalarFmt(primary.x),
                ScalarFmt(primary.y)
            )?;
        }
        Ok(())
    }
}

/// Integer rectangle, size is unsigned and offset is signed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rectangle {
    pub width: u64,
    pub height: u64,
    pub x: i64,
    pub y: i64,
}

impl Rectangle {
    pub const fn new(width: u64, height: u64, x: i64, y: i64) -> Self {
        Self {
            width,
            height,
            x,
            y,
        }
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "width={}, height={}, x={}, y={}",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Line segment between `(x1, y1)` and `(x2, y2)`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Segment {
    pub x1: Scalar,
    pub y1: Scalar,
    pub x2: Scalar,
    pub y2: Scalar,
}

impl Segment {
    pub const fn new(x1: Scalar, y1: Scalar, x2: Scalar, y2: Scalar) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    pub fn length(&self) -> Scalar {
        self.start().dist(self.end())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x1={}, y1={}, x2={}, y2={}",
            ScalarFmt(self.x1),
            ScalarFmt(self.y1),
            ScalarFmt(self.x2),
            ScalarFmt(self.y2)
        )
    }
}

/// 2D affine transformation
///
/// Fields semantically correspond to a matrix:
/// ┌            ┐
/// │ sx  ry  tx │
/// │ rx  sy  ty │
/// │  0   0   1 │
/// └            ┘
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMatrix {
    pub sx: Scalar,
    pub rx: Scalar,
    pub ry: Scalar,
    pub sy: Scalar,
    pub tx: Scalar,
    pub ty: Scalar,
}

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineMatrix {
    pub const fn new(sx: Scalar, rx: Scalar, ry: Scalar, sy: Scalar, tx: Scalar, ty: Scalar) -> Self {
        Self {
            sx,
            rx,
            ry,
            sy,
            tx,
            ty,
        }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Apply this transformation to a point
    pub fn apply(&self, point: Point) -> Point {
        let Point([x, y]) = point;
        Point([
            x * self.sx + y * self.ry + self.tx,
            x * self.rx + y * self.sy + self.ty,
        ])
    }

    /// Find the inverse transformation
    pub fn invert(&self) -> Option<Self> {
        // inv([[M, v], [0, 1]]) = [[inv(M), - inv(M) * v], [0, 1]]
        let det = self.sx * self.sy - self.rx * self.ry;
        if det.abs() <= EPSILON {
            return None;
        }
        let sx = self.sy / det;
        let ry = -self.ry / det;
        let rx = -self.rx / det;
        let sy = self.sx / det;
        let tx = -sx * self.tx - ry * self.ty;
        let ty = -rx * self.tx - sy * self.ty;
        Some(Self::new(sx, rx, ry, sy, tx, ty))
    }

    /// Apply translation by `[tx, ty]` before self
    pub fn translate(&self, tx: Scalar, ty: Scalar) -> Self {
        self.matmul(Self::new(1.0, 0.0, 0.0, 1.0, tx, ty))
    }

    /// Apply scale transformatoin by `[sx, sy]` before self
    pub fn scale(&self, sx: Scalar, sy: Scalar) -> Self {
        self.matmul(Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0))
    }

    /// Apply rotation by `degrees` around the origin before self
    pub fn rotate(&self, degrees: Scalar) -> Self {
        let (sin, cos) = (degrees * PI / 180.0).sin_cos();
        self.matmul(Self::new(cos, sin, -sin, cos, 0.0, 0.0))
    }

    /// Multiply transformations in matrix form, `other` is applied first
    pub fn matmul(&self, other: AffineMatrix) -> Self {
        let s = self;
        let o = other;
        Self {
            sx: s.sx * o.sx + s.ry * o.rx,
            ry: s.sx * o.ry + s.ry * o.sy,
            tx: s.sx * o.tx + s.ry * o.ty + s.tx,
            rx: s.rx * o.sx + s.sy * o.rx,
            sy: s.rx * o.ry + s.sy * o.sy,
            ty: s.rx * o.tx + s.sy * o.ty + s.ty,
        }
    }
}

impl fmt::Display for AffineMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sx={}, rx={}, ry={}, sy={}, tx={}, ty={}",
            ScalarFmt(self.sx),
            ScalarFmt(self.rx),
            ScalarFmt(self.ry),
            ScalarFmt(self.sy),
            ScalarFmt(self.tx),
            ScalarFmt(self.ty)
        )
    }
}

/// Modifier that follows size in a geometry string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryFlag {
    /// `%` sizes are percentages
    Percent,
    /// `!` ignore aspect ratio
    Aspect,
    /// `<` only enlarge smaller images
    Less,
    /// `>` only shrink larger images
    Greater,
    /// `^` minimum size to fill the area
    Minimum,
    /// `@` area in pixels
    Area,
}

impl GeometryFlag {
    pub fn symbol(self) -> char {
        match self {
            GeometryFlag::Percent => '%',
            GeometryFlag::Aspect => '!',
            GeometryFlag::Less => '<',
            GeometryFlag::Greater => '>',
            GeometryFlag::Minimum => '^',
            GeometryFlag::Area => '@',
        }
    }

    fn from_symbol(symbol: u8) -> Option<Self> {
        let flag = match symbol {
            b'%' => GeometryFlag::Percent,
            b'!' => GeometryFlag::Aspect,
            b'<' => GeometryFlag::Less,
            b'>' => GeometryFlag::Greater,
            b'^' => GeometryFlag::Minimum,
            b'@' => GeometryFlag::Area,
            _ => return None,
        };
        Some(flag)
    }
}

/// Geometry string `W[xH][{+-}X[{+-}Y]][flag]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub width: Option<Scalar>,
    pub height: Option<Scalar>,
    /// `[x, y]` offset, `None` if geometry has no offset (`+0+0` is kept)
    pub offset: Option<[i64; 2]>,
    pub flag: Option<GeometryFlag>,
}

impl Geometry {
    pub fn new(width: Scalar, height: Scalar) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    pub fn with_offset(self, x: i64, y: i64) -> Self {
        Self {
            offset: Some([x, y]),
            ..self
        }
    }

    pub fn with_flag(self, flag: GeometryFlag) -> Self {
        Self {
            flag: Some(flag),
            ..self
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(width) = self.width {
            write!(f, "{}", ScalarFmt(width))?;
        }
        if let Some(height) = self.height {
            write!(f, "x{}", ScalarFmt(height))?;
        }
        if let Some([x, y]) = self.offset {
            write!(f, "{:+}{:+}", x, y)?;
        }
        if let Some(flag) = self.flag {
            write!(f, "{}", flag.symbol())?;
        }
        Ok(())
    }
}

impl FromStr for Geometry {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        GeometryParser::new(text).parse()
    }
}

struct GeometryParser<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> GeometryParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text: text.trim(),
            offset: 0,
        }
    }

    fn error(&self, reason: &str) -> Error {
        Error::invalid_format(format!(
            "geometry {:?}: {} at offset {}",
            self.text, reason, self.offset
        ))
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.offset).copied()
    }

    /// Consume `[0-9]*(.[0-9]*)?` returning matched text
    fn take_number(&mut self, allow_fraction: bool) -> Option<&'a str> {
        let text = self.text;
        let start = self.offset;
        let mut seen_dot = false;
        while let Some(byte) = self.peek() {
            match byte {
                b'0'..=b'9' => {}
                b'.' if allow_fraction && !seen_dot => seen_dot = true,
                _ => break,
            }
            self.offset += 1;
        }
        let number = &text[start..self.offset];
        (!number.is_empty() && number != ".").then_some(number)
    }

    fn parse_size(&mut self) -> Result<Option<Scalar>, Error> {
        match self.take_number(true) {
            None => Ok(None),
            Some(number) => number
                .parse()
                .map(Some)
                .map_err(|_| self.error("invalid size")),
        }
    }

    fn parse_offset(&mut self) -> Result<Option<i64>, Error> {
        let sign = match self.peek() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Ok(None),
        };
        self.offset += 1;
        let number = self
            .take_number(false)
            .ok_or_else(|| self.error("offset expected"))?;
        let value: i64 = number.parse().map_err(|_| self.error("invalid offset"))?;
        Ok(Some(sign * value))
    }

    fn parse(mut self) -> Result<Geometry, Error> {
        if self.text.is_empty() {
            return Err(self.error("empty geometry"));
        }
        let mut geometry = Geometry {
            width: self.parse_size()?,
            ..Default::default()
        };
        if matches!(self.peek(), Some(b'x' | b'X')) {
            self.offset += 1;
            geometry.height = Some(
                self.parse_size()?
                    .ok_or_else(|| self.error("height expected"))?,
            );
        }
        if let Some(x) = self.parse_offset()? {
            let y = self.parse_offset()?.unwrap_or(0);
            geometry.offset = Some([x, y]);
        } else if geometry.width.is_none() && geometry.height.is_none() {
            return Err(self.error("size or offset expected"));
        }
        if let Some(symbol) = self.peek() {
            let flag = GeometryFlag::from_symbol(symbol)
                .ok_or_else(|| self.error("unexpected character"))?;
            self.offset += 1;
            geometry.flag = Some(flag);
        }
        if self.peek().is_some() {
            return Err(self.error("trailing characters"));
        }
        Ok(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_display() {
        assert_eq!(Point::new(1.5, -2.0).to_string(), "x=1.5, y=-2");
        assert_eq!(
            PrimaryInfo::new(0.64, 0.33, 0.0).to_string(),
            "x=0.64, y=0.33, z=0"
        );
        assert_eq!(
            Rectangle::new(10, 20, -3, 4).to_string(),
            "width=10, height=20, x=-3, y=4"
        );
        assert_eq!(
            Segment::new(0.0, 1.0, 2.5, 1e7).to_string(),
            "x1=0, y1=1, x2=2.5, y2=1e+07"
        );
        assert_eq!(
            AffineMatrix::identity().to_string(),
            "sx=1, rx=0, ry=0, sy=1, tx=0, ty=0"
        );
        let chroma = Chromaticity {
            red_primary: PrimaryInfo::new(0.64, 0.33, 0.0),
            green_primary: PrimaryInfo::new(0.3, 0.6, 0.0),
            blue_primary: PrimaryInfo::new(0.15, 0.06, 0.0),
            white_point: PrimaryInfo::new(0.3127, 0.329, 0.0),
        };
        assert_eq!(
            chroma.to_string(),
            "red_primary=(x=0.64,y=0.33) green_primary=(x=0.3,y=0.6) \
             blue_primary=(x=0.15,y=0.06) white_point=(x=0.3127,y=0.329)"
        );
    }

    #[test]
    fn test_affine() {
        let tr = AffineMatrix::identity()
            .translate(1.0, 2.0)
            .rotate(60.0)
            .scale(3.0, 2.0);
        let inv = tr.invert().unwrap();
        let p0 = Point::new(1.0, 1.0);

        let p1 = tr.apply(p0);
        let p2 = inv.apply(p1);
        assert_approx_eq!(p2.x(), 1.0, 1e-9);
        assert_approx_eq!(p2.y(), 1.0, 1e-9);

        let p = AffineMatrix::identity().rotate(90.0).apply(Point::new(1.0, 0.0));
        assert_approx_eq!(p.x(), 0.0, 1e-9);
        assert_approx_eq!(p.y(), 1.0, 1e-9);

        let p = AffineMatrix::identity()
            .translate(10.0, 0.0)
            .scale(2.0, 2.0)
            .apply(Point::new(1.0, 1.0));
        assert_eq!(p, Point::new(12.0, 2.0));

        assert!(AffineMatrix::new(0.0, 0.0, 0.0, 0.0, 1.0, 1.0)
            .invert()
            .is_none());
    }

    #[test]
    fn test_segment() {
        let segment = Segment::new(0.0, 0.0, 3.0, 4.0);
        assert_approx_eq!(segment.length(), 5.0);
        assert_eq!(segment.end() - segment.start(), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_geometry_parse() -> Result<(), Error> {
        assert_eq!("640x480".parse::<Geometry>()?, Geometry::new(640.0, 480.0));
        assert_eq!(
            "72".parse::<Geometry>()?,
            Geometry {
                width: Some(72.0),
                ..Default::default()
            }
        );
        assert_eq!(
            "100x50+10-5!".parse::<Geometry>()?,
            Geometry::new(100.0, 50.0)
                .with_offset(10, -5)
                .with_flag(GeometryFlag::Aspect)
        );
        assert_eq!(
            "x50".parse::<Geometry>()?,
            Geometry {
                height: Some(50.0),
                ..Default::default()
            }
        );
        assert_eq!("+5+6".parse::<Geometry>()?, Geometry::default().with_offset(5, 6));
        assert_eq!(
            "50%".parse::<Geometry>()?.flag,
            Some(GeometryFlag::Percent)
        );
        assert_eq!("72.5x72.5".parse::<Geometry>()?.width, Some(72.5));
        assert_eq!("100x100+0+0".parse::<Geometry>()?.offset, Some([0, 0]));
        assert_eq!("100x100".parse::<Geometry>()?.offset, None);
        assert_eq!("+7".parse::<Geometry>()?.offset, Some([7, 0]));

        for invalid in ["", "10x", "axb", "-10x10", "10x10+", "10x10%%", "10x10 junk", "."] {
            let err = invalid.parse::<Geometry>().unwrap_err();
            assert!(matches!(err, Error::InvalidFormat(_)), "{:?}", invalid);
        }
        Ok(())
    }

    #[test]
    fn test_geometry_display() -> Result<(), Error> {
        for text in [
            "640x480",
            "72",
            "x50",
            "100x50+10-5!",
            "+5+6",
            "50%",
            "2.5x3.5>",
            "100x100+0+0",
        ] {
            assert_eq!(text.parse::<Geometry>()?.to_string(), text);
        }
        Ok(())
    }
}
