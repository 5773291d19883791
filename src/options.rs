//! Option table keyed by `"format:key"` or bare `"key"`
use crate::{Error, Geometry, Gravity, Result, Scalar, utils::ScalarFmt};
use std::collections::BTreeMap;

/// Longest accepted format namespace
pub const MAX_FORMAT_LEN: usize = 60;
/// Longest accepted composite key
pub const MAX_KEY_LEN: usize = 1024;

/// Bit depths accepted by `OptionTable::set_depth`
pub const DEPTHS: [u32; 3] = [8, 16, 32];

/// String options staged before a render call
///
/// Writes overwrite, writing `None` removes the key. Oversized keys are rejected
/// with `KeyTooLong` and leave the table untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct OptionTable {
    entries: BTreeMap<String, String>,
}

/// Build composite key, validating length bounds
fn composite_key(format: Option<&str>, key: &str) -> Result<String> {
    let composite = match format {
        Some(format) => {
            if format.len() > MAX_FORMAT_LEN {
                return Err(Error::KeyTooLong {
                    key: format.to_owned(),
                    len: format.len(),
                    max: MAX_FORMAT_LEN,
                });
            }
            format!("{}:{}", format, key)
        }
        None => key.to_owned(),
    };
    if composite.len() > MAX_KEY_LEN {
        return Err(Error::KeyTooLong {
            len: composite.len(),
            key: composite,
            max: MAX_KEY_LEN,
        });
    }
    Ok(composite)
}

impl OptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under the key, `None` for absent keys and invalid ones
    pub fn get(&self, format: Option<&str>, key: &str) -> Option<&str> {
        let key = composite_key(format, key).ok()?;
        self.entries.get(&key).map(String::as_str)
    }

    /// Store or (with `None`) remove the value
    pub fn set(&mut self, format: Option<&str>, key: &str, value: Option<&str>) -> Result<()> {
        let key = composite_key(format, key)?;
        match value {
            Some(value) => {
                tracing::trace!(%key, value, "[options] set");
                self.entries.insert(key, value.to_owned());
            }
            None => {
                self.entries.remove(&key);
            }
        }
        Ok(())
    }

    /// Remove the key returning its previous value
    pub fn delete(&mut self, format: Option<&str>, key: &str) -> Result<Option<String>> {
        let key = composite_key(format, key)?;
        Ok(self.entries.remove(&key))
    }

    /// Composite keys and values in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store a finite non-negative number
    ///
    /// Stored text is the shortest representation which parses back to the same value.
    pub fn set_double(&mut self, format: Option<&str>, key: &str, value: Scalar) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::invalid_format(format!(
                "{} must be a non-negative number (got {})",
                key,
                ScalarFmt(value)
            )));
        }
        self.set(format, key, Some(&value.to_string()))
    }

    /// Store animation delay, a non-negative integer string
    pub fn set_delay(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let delay: u64 = value
            .parse()
            .map_err(|_| Error::invalid_format(format!("invalid delay {:?}", value)))?;
        self.set(None, key, Some(&delay.to_string()))
    }

    /// Store bit depth, one of `DEPTHS`
    pub fn set_depth(&mut self, key: &str, depth: u32) -> Result<()> {
        if !DEPTHS.contains(&depth) {
            return Err(Error::invalid_format(format!(
                "invalid depth {} (expected one of 8, 16, 32)",
                depth
            )));
        }
        self.set(None, key, Some(&depth.to_string()))
    }

    /// Store geometry string as given (trimmed) once it is validated
    pub fn set_geometry(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        value.parse::<Geometry>()?;
        self.set(None, key, Some(value))
    }

    pub fn set_gravity(&mut self, key: &str, value: &str) -> Result<()> {
        let gravity: Gravity = value.parse()?;
        self.set(None, key, Some(gravity.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_key() -> Result<()> {
        let mut options = OptionTable::new();
        options.set(Some("jpeg"), "quality", Some("90"))?;
        assert_eq!(options.get(Some("jpeg"), "quality"), Some("90"));
        assert_eq!(options.get(None, "jpeg:quality"), Some("90"));
        assert_eq!(options.get(None, "quality"), None);

        options.set(Some("jpeg"), "quality", Some("75"))?;
        assert_eq!(options.get(Some("jpeg"), "quality"), Some("75"));
        assert_eq!(options.len(), 1);

        options.set(Some("jpeg"), "quality", None)?;
        assert_eq!(options.get(Some("jpeg"), "quality"), None);
        assert!(options.is_empty());
        Ok(())
    }

    #[test]
    fn test_key_too_long() -> Result<()> {
        let mut options = OptionTable::new();
        options.set(None, "dither", Some("true"))?;
        let format = "f".repeat(61);
        assert!(matches!(
            options.set(Some(&format), "quality", Some("90")),
            Err(Error::KeyTooLong { len: 61, max: MAX_FORMAT_LEN, .. })
        ));
        assert_eq!(options.get(Some(&format), "quality"), None);

        let key = "k".repeat(MAX_KEY_LEN);
        assert!(options.set(None, &key, Some("1")).is_ok());
        assert!(matches!(
            options.set(Some("png"), &key, Some("1")),
            Err(Error::KeyTooLong { max: MAX_KEY_LEN, .. })
        ));
        assert_eq!(options.len(), 2);
        Ok(())
    }

    #[test]
    fn test_delete_and_iter() -> Result<()> {
        let mut options = OptionTable::new();
        options.set(Some("png"), "bit-depth", Some("16"))?;
        options.set(None, "antialias", Some("false"))?;
        let entries: Vec<_> = options.iter().collect();
        assert_eq!(
            entries,
            vec![("antialias", "false"), ("png:bit-depth", "16")]
        );
        assert_eq!(options.delete(Some("png"), "bit-depth")?, Some("16".to_owned()));
        assert_eq!(options.delete(Some("png"), "bit-depth")?, None);
        assert_eq!(options.len(), 1);
        Ok(())
    }

    #[test]
    fn test_validated_writers() -> Result<()> {
        let mut options = OptionTable::new();
        options.set_double(None, "pointsize", 12.5)?;
        assert_eq!(options.get(None, "pointsize"), Some("12.5"));
        assert!(options.set_double(None, "pointsize", -1.0).is_err());
        assert!(options.set_double(None, "pointsize", f64::NAN).is_err());
        assert_eq!(options.get(None, "pointsize"), Some("12.5"));

        options.set_delay("delay", " 20 ")?;
        assert_eq!(options.get(None, "delay"), Some("20"));
        assert!(matches!(
            options.set_delay("delay", "-3"),
            Err(Error::InvalidFormat(_))
        ));

        options.set_depth("depth", 16)?;
        assert!(options.set_depth("depth", 12).is_err());
        assert_eq!(options.get(None, "depth"), Some("16"));

        options.set_geometry("size", " 100x50+5-3 ")?;
        assert_eq!(options.get(None, "size"), Some("100x50+5-3"));
        assert!(options.set_geometry("size", "100xfoo").is_err());

        options.set_gravity("gravity", "southeast")?;
        assert_eq!(options.get(None, "gravity"), Some("SouthEast"));
        assert!(options.set_gravity("gravity", "up").is_err());
        Ok(())
    }

    #[test]
    fn test_validated_writers_keep_precision() -> Result<()> {
        let mut options = OptionTable::new();
        options.set_geometry("size", "1234567x10")?;
        let size = options.get(None, "size");
        assert_eq!(size, Some("1234567x10"));
        assert_eq!(
            size.map(str::parse::<Geometry>).transpose()?,
            Some(Geometry::new(1234567.0, 10.0))
        );

        options.set_geometry("density", "72.1234567")?;
        assert_eq!(options.get(None, "density"), Some("72.1234567"));

        options.set_geometry("crop", "100x100+0+0")?;
        assert_eq!(options.get(None, "crop"), Some("100x100+0+0"));

        options.set_double(None, "pointsize", 72.1234567)?;
        assert_eq!(options.get(None, "pointsize"), Some("72.1234567"));
        options.set_double(Some("pdf"), "dpi", 1234567.0)?;
        let dpi = options.get(Some("pdf"), "dpi").map(str::parse::<Scalar>);
        assert_eq!(dpi, Some(Ok(1234567.0)));
        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() -> Result<()> {
        let mut options = OptionTable::new();
        options.set(Some("jpeg"), "quality", Some("90"))?;
        let text = serde_json::to_string(&options)?;
        assert_eq!(text, r#"{"jpeg:quality":"90"}"#);
        let decoded: OptionTable = serde_json::from_str(&text)?;
        assert_eq!(decoded, options);
        Ok(())
    }
}
