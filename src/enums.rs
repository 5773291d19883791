//! Enumerations shared with the image library, each backed by a fixed
//! `(value, canonical name)` table.
use crate::Error;
use std::{fmt, str::FromStr};

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = ($value:expr, $text:expr)
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $name {
            /// All variants with their numeric value and canonical name
            pub const TABLE: &'static [($name, i32, &'static str)] = &[
                $(($name::$variant, $value, $text),)+
            ];

            fn entry(self) -> &'static ($name, i32, &'static str) {
                // table rows are in declaration order
                &Self::TABLE[self as usize]
            }

            /// Canonical name
            pub fn name(self) -> &'static str {
                self.entry().2
            }

            /// Numeric value used by the image library
            pub fn value(self) -> i32 {
                self.entry().1
            }

            pub fn from_value(value: i32) -> Option<Self> {
                Self::TABLE
                    .iter()
                    .find(|(_, entry, _)| *entry == value)
                    .map(|(variant, _, _)| *variant)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(text: &str) -> Result<Self, Self::Err> {
                let text = text.trim();
                Self::TABLE
                    .iter()
                    .find(|(_, _, name)| name.eq_ignore_ascii_case(text))
                    .map(|(variant, _, _)| *variant)
                    .ok_or_else(|| {
                        Error::invalid_format(format!(
                            "unknown {} {:?}",
                            stringify!($name),
                            text
                        ))
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

named_enum! {
    /// Placement of text and composite images relative to the region
    Gravity {
        Undefined = (0, "Undefined"),
        NorthWest = (1, "NorthWest"),
        North = (2, "North"),
        NorthEast = (3, "NorthEast"),
        West = (4, "West"),
        Center = (5, "Center"),
        East = (6, "East"),
        SouthWest = (7, "SouthWest"),
        South = (8, "South"),
        SouthEast = (9, "SouthEast"),
        Static = (10, "Static"),
    }
}

named_enum! {
    /// Rule used to determine interior of a shape
    FillRule {
        Undefined = (0, "undefined"),
        EvenOdd = (1, "evenodd"),
        NonZero = (2, "nonzero"),
    }
}

named_enum! {
    /// Shape at the open ends of stroked lines
    LineCap {
        Undefined = (0, "undefined"),
        Butt = (1, "butt"),
        Round = (2, "round"),
        Square = (3, "square"),
    }
}

named_enum! {
    /// Shape at the corners of stroked lines
    LineJoin {
        Undefined = (0, "undefined"),
        Miter = (1, "miter"),
        Round = (2, "round"),
        Bevel = (3, "bevel"),
    }
}

impl Default for FillRule {
    fn default() -> Self {
        Self::EvenOdd
    }
}

impl Default for LineCap {
    fn default() -> Self {
        Self::Butt
    }
}

impl Default for LineJoin {
    fn default() -> Self {
        Self::Miter
    }
}
