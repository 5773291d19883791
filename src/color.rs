use crate::{
    quantum::{quantum_to_unit, round_to_quantum, scale_to_quantum},
    Error, Quantum, Result, Scalar, OPAQUE_OPACITY, QUANTUM_RANGE,
};
use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Four channel color with quantum sized channels
///
/// Opacity has inverted polarity compared to alpha: `0` is fully opaque and
/// `QUANTUM_RANGE` is fully transparent. Ordering is lexicographic over
/// `(red, green, blue, opacity)`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Pod, Zeroable)]
pub struct Pixel {
    red: Quantum,
    green: Quantum,
    blue: Quantum,
    opacity: Quantum,
}

impl Pixel {
    pub const fn new(red: Quantum, green: Quantum, blue: Quantum, opacity: Quantum) -> Self {
        Self {
            red,
            green,
            blue,
            opacity,
        }
    }

    /// Fully opaque pixel
    pub const fn rgb(red: Quantum, green: Quantum, blue: Quantum) -> Self {
        Self::new(red, green, blue, OPAQUE_OPACITY)
    }

    /// Resolve color name, hex notations are handled directly everything else
    /// is resolved with the color database.
    pub fn from_name(name: &str, lookup: &dyn ColorLookup) -> Result<Self> {
        let name = name.trim();
        let pixel = if name.starts_with('#') {
            parse_hex(name)
        } else {
            lookup.lookup(name)
        };
        pixel.ok_or_else(|| Error::InvalidColorName(name.to_owned()))
    }

    #[inline]
    pub const fn red(self) -> Quantum {
        self.red
    }

    #[inline]
    pub const fn green(self) -> Quantum {
        self.green
    }

    #[inline]
    pub const fn blue(self) -> Quantum {
        self.blue
    }

    #[inline]
    pub const fn opacity(self) -> Quantum {
        self.opacity
    }

    /// Same color with a different opacity
    pub const fn with_opacity(self, opacity: Quantum) -> Self {
        Self::new(self.red, self.green, self.blue, opacity)
    }

    pub const fn is_opaque(self) -> bool {
        self.opacity == OPAQUE_OPACITY
    }

    /// Channels as `[red, green, blue, opacity]`
    pub const fn to_array(self) -> [Quantum; 4] {
        [self.red, self.green, self.blue, self.opacity]
    }

    /// Luminance weighted intensity of the color
    pub fn intensity(self) -> Quantum {
        round_to_quantum(
            0.299 * self.red as Scalar + 0.587 * self.green as Scalar + 0.114 * self.blue as Scalar,
        )
    }

    /// Check if two colors are within `fuzz` distance of each other
    pub fn fcmp(self, other: Self, fuzz: Scalar) -> bool {
        let distance = self
            .to_array()
            .iter()
            .zip(other.to_array())
            .map(|(c0, c1)| {
                let diff = *c0 as Scalar - c1 as Scalar;
                diff * diff
            })
            .sum::<Scalar>()
            .sqrt();
        distance <= fuzz
    }

    /// Canonical 16-bit hex representation `#RRRRGGGGBBBB[AAAA]`
    ///
    /// Alpha is only emitted for non opaque colors.
    pub fn to_hex(self) -> String {
        let mut hex = format!("#{:04X}{:04X}{:04X}", self.red, self.green, self.blue);
        if !self.is_opaque() {
            hex.push_str(&format!("{:04X}", QUANTUM_RANGE - self.opacity));
        }
        hex
    }

    /// Convert to `(hue, saturation, lightness, alpha)`
    ///
    /// Hue is in degrees `[0, 360)`, everything else is in `[0, 1]`.
    pub fn to_hsla(self) -> (Scalar, Scalar, Scalar, Scalar) {
        let r = quantum_to_unit(self.red);
        let g = quantum_to_unit(self.green);
        let b = quantum_to_unit(self.blue);
        let alpha = 1.0 - quantum_to_unit(self.opacity);

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let lightness = (max + min) / 2.0;
        let delta = max - min;
        if delta <= 0.0 {
            return (0.0, 0.0, lightness, alpha);
        }
        let saturation = if lightness > 0.5 {
            delta / (2.0 - max - min)
        } else {
            delta / (max + min)
        };
        let hue = if max == r {
            (g - b) / delta + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        (hue * 60.0, saturation, lightness, alpha)
    }

    /// Construct pixel from `(hue, saturation, lightness, alpha)`
    pub fn from_hsla(
        hue: Scalar,
        saturation: Scalar,
        lightness: Scalar,
        alpha: Scalar,
    ) -> Result<Self> {
        if !(0.0..=360.0).contains(&hue) {
            return Err(Error::invalid_format(format!(
                "hue {} out of range [0, 360]",
                hue
            )));
        }
        for (name, value) in [
            ("saturation", saturation),
            ("lightness", lightness),
            ("alpha", alpha),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::invalid_format(format!(
                    "{} {} out of range [0, 1]",
                    name, value
                )));
            }
        }

        let (r, g, b) = if saturation <= 0.0 {
            (lightness, lightness, lightness)
        } else {
            let q = if lightness < 0.5 {
                lightness * (1.0 + saturation)
            } else {
                lightness + saturation - lightness * saturation
            };
            let p = 2.0 * lightness - q;
            let h = hue / 360.0;
            (
                hue_to_rgb(p, q, h + 1.0 / 3.0),
                hue_to_rgb(p, q, h),
                hue_to_rgb(p, q, h - 1.0 / 3.0),
            )
        };
        Ok(Self::new(
            scale_to_quantum(r),
            scale_to_quantum(g),
            scale_to_quantum(b),
            scale_to_quantum(1.0 - alpha),
        ))
    }
}

fn hue_to_rgb(p: Scalar, q: Scalar, t: Scalar) -> Scalar {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

impl fmt::Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "red={}, green={}, blue={}, opacity={}",
            self.red, self.green, self.blue, self.opacity
        )
    }
}

impl From<[Quantum; 4]> for Pixel {
    fn from([red, green, blue, opacity]: [Quantum; 4]) -> Self {
        Self::new(red, green, blue, opacity)
    }
}

/// Parse `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`, `#RRRRGGGGBBBB` or `#RRRRGGGGBBBBAAAA`
fn parse_hex(color: &str) -> Option<Pixel> {
    let digits = color.strip_prefix('#')?;
    if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    let (width, has_alpha) = match digits.len() {
        3 => (1, false),
        4 => (1, true),
        6 => (2, false),
        8 => (2, true),
        12 => (4, false),
        16 => (4, true),
        _ => return None,
    };
    // scale factor from `width` hex digits to quantum range
    let scale = match width {
        1 => 0x1111,
        2 => 0x101,
        _ => 1,
    };
    let mut channels = digits
        .as_bytes()
        .chunks(width)
        .map(|chunk| std::str::from_utf8(chunk).ok())
        .map(|chunk| Some(Quantum::from_str_radix(chunk?, 16).ok()? * scale));
    let red = channels.next()??;
    let green = channels.next()??;
    let blue = channels.next()??;
    let opacity = if has_alpha {
        QUANTUM_RANGE - channels.next()??
    } else {
        OPAQUE_OPACITY
    };
    Some(Pixel::new(red, green, blue, opacity))
}

/// Color name database
pub trait ColorLookup {
    fn lookup(&self, name: &str) -> Option<Pixel>;
}

impl<F> ColorLookup for F
where
    F: Fn(&str) -> Option<Pixel>,
{
    fn lookup(&self, name: &str) -> Option<Pixel> {
        self(name)
    }
}

/// Built-in table of the common color names
///
/// Lookup is case-insensitive and ignores spaces, so `Light Gray` and `lightgray`
/// are the same color.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamedColors;

// name, [red, green, blue, alpha] in 8-bit precision
const NAMED_COLORS: &[(&str, [u8; 4])] = &[
    ("aqua", [0, 255, 255, 255]),
    ("black", [0, 0, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("brown", [165, 42, 42, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("darkgray", [169, 169, 169, 255]),
    ("fuchsia", [255, 0, 255, 255]),
    ("gold", [255, 215, 0, 255]),
    ("gray", [190, 190, 190, 255]),
    ("green", [0, 128, 0, 255]),
    ("grey", [190, 190, 190, 255]),
    ("lightgray", [211, 211, 211, 255]),
    ("lime", [0, 255, 0, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("maroon", [128, 0, 0, 255]),
    ("navy", [0, 0, 128, 255]),
    ("none", [0, 0, 0, 0]),
    ("olive", [128, 128, 0, 255]),
    ("orange", [255, 165, 0, 255]),
    ("pink", [255, 192, 203, 255]),
    ("purple", [128, 0, 128, 255]),
    ("red", [255, 0, 0, 255]),
    ("silver", [192, 192, 192, 255]),
    ("teal", [0, 128, 128, 255]),
    ("transparent", [0, 0, 0, 0]),
    ("white", [255, 255, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
];

impl ColorLookup for NamedColors {
    fn lookup(&self, name: &str) -> Option<Pixel> {
        let name: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let index = NAMED_COLORS
            .binary_search_by(|(entry, _)| (*entry).cmp(name.as_str()))
            .ok()?;
        let [r, g, b, a] = NAMED_COLORS[index].1;
        let scale = |c: u8| c as Quantum * 0x101;
        Some(Pixel::new(scale(r), scale(g), scale(b), QUANTUM_RANGE - scale(a)))
    }
}
