//! Pixel value model and gradient rasterization for an external image library.
//!
//! Main features:
//!  - Gradient and texture fills written row by row into any pixel grid
//!  - Structured records (tag + ordered fields) for color and geometry values
//!  - Draw-primitive accumulator producing MVG style text
//!  - Namespaced option table with validated writers
//!

mod color;
mod draw;
mod enums;
mod error;
mod geometry;
mod gradient;
mod grid;
mod options;
mod quantum;
mod session;
pub mod structured;
mod utils;

pub use color::{ColorLookup, NamedColors, Pixel};
pub use draw::{DrawBuffer, NO_PRIMITIVES, Renderer};
pub use enums::{FillRule, Gravity, LineCap, LineJoin};
pub use error::{Error, ErrorKind, Result};
pub use geometry::{
    AffineMatrix, Chromaticity, EPSILON, Geometry, GeometryFlag, PI, Point, PrimaryInfo,
    Rectangle, Scalar, Segment,
};
pub use gradient::{Fill, GradientFill, GradientKind, TextureFill};
pub use grid::{PixelBuffer, PixelGrid, PixelGridMut, PixelView, Shape};
pub use options::{DEPTHS, MAX_FORMAT_LEN, MAX_KEY_LEN, OptionTable};
pub use quantum::{
    OPAQUE_OPACITY, QUANTUM_RANGE, Quantum, TRANSPARENT_OPACITY, quantum_to_unit,
    round_to_quantum, scale_to_quantum,
};
pub use session::{Monitor, Session, TEMP_NAME_PREFIX};
pub use structured::{Field, Record, Structured};
pub use utils::{ScalarFmt, scalar_fmt};
