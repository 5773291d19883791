//! Structured values: fixed order field lists used for snapshots
//!
//! Every value type has a tag and a canonical field order. Decoding tolerates missing
//! trailing (or explicitly absent) fields by substituting the type's documented
//! defaults. Extra trailing fields are ignored.
use crate::{
    AffineMatrix, Chromaticity, Error, GradientFill, Pixel, Point, PrimaryInfo, Quantum,
    Rectangle, Result, Scalar, Segment,
};

/// Single field of a structured record
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Int(i64),
    /// Unsigned integer which does not fit into `Int`
    UInt(u64),
    Float(Scalar),
    Record(Record),
}

impl Field {
    fn kind(&self) -> &str {
        match self {
            Field::Int(_) => "int",
            Field::UInt(_) => "uint",
            Field::Float(_) => "float",
            Field::Record(record) => record.tag(),
        }
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        Field::Int(value)
    }
}

impl From<u64> for Field {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Field::UInt(value), Field::Int)
    }
}

impl From<Scalar> for Field {
    fn from(value: Scalar) -> Self {
        Field::Float(value)
    }
}

impl From<Record> for Field {
    fn from(record: Record) -> Self {
        Field::Record(record)
    }
}

/// Tagged ordered list of fields, `None` marks an absent field
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    tag: String,
    fields: Vec<Option<Field>>,
}

impl Record {
    pub fn new(tag: impl Into<String>, fields: Vec<Option<Field>>) -> Self {
        Self {
            tag: tag.into(),
            fields,
        }
    }

    fn from_fields(tag: &str, fields: impl IntoIterator<Item = Field>) -> Self {
        Self::new(tag, fields.into_iter().map(Some).collect())
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn fields(&self) -> &[Option<Field>] {
        &self.fields
    }

    /// Convert record to JSON `{"type": TAG, "fields": [...]}`, absent fields are `null`
    ///
    /// Non-finite floats are stored as strings `"inf"`, `"-inf"` and `"nan"`.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Value {
        use crate::utils::ScalarFmt;
        use serde_json::Value;

        let fields = self
            .fields
            .iter()
            .map(|field| match field {
                None => Value::Null,
                Some(Field::Int(value)) => Value::from(*value),
                Some(Field::UInt(value)) => Value::from(*value),
                Some(Field::Float(value)) => match serde_json::Number::from_f64(*value) {
                    Some(number) => Value::Number(number),
                    None => Value::String(ScalarFmt(*value).to_string()),
                },
                Some(Field::Record(record)) => record.to_json(),
            })
            .collect();
        let mut object = serde_json::Map::new();
        object.insert("type".to_owned(), Value::String(self.tag.clone()));
        object.insert("fields".to_owned(), Value::Array(fields));
        Value::Object(object)
    }

    /// Parse record from JSON produced by `to_json`
    #[cfg(feature = "serde")]
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        let invalid = |reason: &str| Error::invalid_format(format!("record: {}", reason));
        let object = value.as_object().ok_or_else(|| invalid("object expected"))?;
        let tag = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("`type` string expected"))?;
        let items = match object.get("fields") {
            None => return Ok(Self::new(tag, Vec::new())),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(invalid("`fields` array expected")),
        };
        let mut fields = Vec::with_capacity(items.len());
        for item in items {
            let field = match item {
                Value::Null => None,
                Value::Number(number) => {
                    if let Some(value) = number.as_i64() {
                        Some(Field::Int(value))
                    } else if let Some(value) = number.as_u64() {
                        Some(Field::UInt(value))
                    } else {
                        let value = number.as_f64();
                        Some(Field::Float(value.ok_or_else(|| invalid("number out of range"))?))
                    }
                }
                Value::String(text) => match text.as_str() {
                    "inf" => Some(Field::Float(Scalar::INFINITY)),
                    "-inf" => Some(Field::Float(Scalar::NEG_INFINITY)),
                    "nan" => Some(Field::Float(Scalar::NAN)),
                    _ => return Err(invalid("only non-finite floats may be strings")),
                },
                Value::Object(_) => Some(Field::Record(Self::from_json(item)?)),
                _ => return Err(invalid("number, record or null expected")),
            };
            fields.push(field);
        }
        Ok(Self::new(tag, fields))
    }

    #[cfg(feature = "serde")]
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    #[cfg(feature = "serde")]
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }
}

/// Value with a canonical structured encoding
pub trait Structured: Sized {
    /// Tag identifying the record type
    const TAG: &'static str;

    /// Field names in canonical order
    const FIELDS: &'static [&'static str];

    fn encode(&self) -> Record;

    fn decode(record: &Record) -> Result<Self>;
}

pub fn encode<T: Structured>(value: &T) -> Record {
    value.encode()
}

pub fn decode<T: Structured>(record: &Record) -> Result<T> {
    T::decode(record)
}

/// Sequential reader over the record fields with per-field defaults
struct FieldReader<'a> {
    tag: &'static str,
    names: &'static [&'static str],
    fields: &'a [Option<Field>],
    index: usize,
}

impl<'a> FieldReader<'a> {
    fn new<T: Structured>(record: &'a Record) -> Result<Self> {
        if record.tag != T::TAG {
            return Err(Error::type_mismatch(T::TAG, record.tag.as_str()));
        }
        Ok(Self {
            tag: T::TAG,
            names: T::FIELDS,
            fields: &record.fields,
            index: 0,
        })
    }

    fn name(&self) -> String {
        let name = self.names.get(self.index).copied().unwrap_or("?");
        format!("{}.{}", self.tag, name)
    }

    /// Next field, `None` if it is absent or past the end of the record
    fn next(&mut self) -> Option<(String, &'a Field)> {
        let name = self.name();
        let field = self.fields.get(self.index).and_then(Option::as_ref);
        self.index += 1;
        field.map(|field| (name, field))
    }

    fn float(&mut self, default: Scalar) -> Result<Scalar> {
        match self.next() {
            None => Ok(default),
            Some((_, Field::Float(value))) => Ok(*value),
            Some((_, Field::Int(value))) => Ok(*value as Scalar),
            Some((_, Field::UInt(value))) => Ok(*value as Scalar),
            Some((name, field)) => Err(Error::type_mismatch(
                format!("float {}", name),
                field.kind(),
            )),
        }
    }

    fn int(&mut self, default: i64) -> Result<i64> {
        match self.next() {
            None => Ok(default),
            Some((_, Field::Int(value))) => Ok(*value),
            Some((name, field)) => Err(Error::type_mismatch(
                format!("int {}", name),
                field.kind(),
            )),
        }
    }

    fn unsigned(&mut self, default: u64) -> Result<u64> {
        match self.next() {
            None => Ok(default),
            Some((_, Field::UInt(value))) => Ok(*value),
            Some((name, Field::Int(value))) => u64::try_from(*value).map_err(|_| {
                Error::invalid_format(format!("{} must not be negative: {}", name, value))
            }),
            Some((name, field)) => Err(Error::type_mismatch(
                format!("uint {}", name),
                field.kind(),
            )),
        }
    }

    fn quantum(&mut self) -> Result<Quantum> {
        let name = self.name();
        let value = self.int(0)?;
        Quantum::try_from(value)
            .map_err(|_| Error::invalid_format(format!("{} is out of quantum range: {}", name, value)))
    }

    fn record<T: Structured + Default>(&mut self) -> Result<T> {
        match self.next() {
            None => Ok(T::default()),
            Some((_, Field::Record(record))) => T::decode(record),
            Some((name, field)) => Err(Error::type_mismatch(
                format!("{} {}", T::TAG, name),
                field.kind(),
            )),
        }
    }

    fn finish(self) {
        if self.fields.len() > self.names.len() {
            tracing::debug!(
                tag = self.tag,
                extra = self.fields.len() - self.names.len(),
                "[decode] ignoring trailing fields"
            );
        }
    }
}

impl Structured for Pixel {
    const TAG: &'static str = "Pixel";
    const FIELDS: &'static [&'static str] = &["red", "green", "blue", "opacity"];

    fn encode(&self) -> Record {
        Record::from_fields(
            Self::TAG,
            self.to_array().map(|channel| Field::Int(channel as i64)),
        )
    }

    fn decode(record: &Record) -> Result<Self> {
        let mut reader = FieldReader::new::<Self>(record)?;
        let pixel = Pixel::new(
            reader.quantum()?,
            reader.quantum()?,
            reader.quantum()?,
            reader.quantum()?,
        );
        reader.finish();
        Ok(pixel)
    }
}

impl Structured for Point {
    const TAG: &'static str = "Point";
    const FIELDS: &'static [&'static str] = &["x", "y"];

    fn encode(&self) -> Record {
        Record::from_fields(Self::TAG, self.0.map(Field::Float))
    }

    fn decode(record: &Record) -> Result<Self> {
        let mut reader = FieldReader::new::<Self>(record)?;
        let point = Point::new(reader.float(0.0)?, reader.float(0.0)?);
        reader.finish();
        Ok(point)
    }
}

impl Structured for PrimaryInfo {
    const TAG: &'static str = "PrimaryInfo";
    const FIELDS: &'static [&'static str] = &["x", "y", "z"];

    fn encode(&self) -> Record {
        Record::from_fields(Self::TAG, [self.x, self.y, self.z].map(Field::Float))
    }

    fn decode(record: &Record) -> Result<Self> {
        let mut reader = FieldReader::new::<Self>(record)?;
        let primary = PrimaryInfo::new(reader.float(0.0)?, reader.float(0.0)?, reader.float(0.0)?);
        reader.finish();
        Ok(primary)
    }
}

impl Structured for Rectangle {
    const TAG: &'static str = "Rectangle";
    const FIELDS: &'static [&'static str] = &["width", "height", "x", "y"];

    fn encode(&self) -> Record {
        Record::from_fields(
            Self::TAG,
            [
                Field::from(self.width),
                Field::from(self.height),
                Field::Int(self.x),
                Field::Int(self.y),
            ],
        )
    }

    fn decode(record: &Record) -> Result<Self> {
        let mut reader = FieldReader::new::<Self>(record)?;
        let rect = Rectangle::new(
            reader.unsigned(0)?,
            reader.unsigned(0)?,
            reader.int(0)?,
            reader.int(0)?,
        );
        reader.finish();
        Ok(rect)
    }
}

impl Structured for Segment {
    const TAG: &'static str = "Segment";
    const FIELDS: &'static [&'static str] = &["x1", "y1", "x2", "y2"];

    fn encode(&self) -> Record {
        Record::from_fields(
            Self::TAG,
            [self.x1, self.y1, self.x2, self.y2].map(Field::Float),
        )
    }

    fn decode(record: &Record) -> Result<Self> {
        let mut reader = FieldReader::new::<Self>(record)?;
        let segment = Segment::new(
            reader.float(0.0)?,
            reader.float(0.0)?,
            reader.float(0.0)?,
            reader.float(0.0)?,
        );
        reader.finish();
        Ok(segment)
    }
}

impl Structured for AffineMatrix {
    const TAG: &'static str = "AffineMatrix";
    const FIELDS: &'static [&'static str] = &["sx", "rx", "ry", "sy", "tx", "ty"];

    fn encode(&self) -> Record {
        Record::from_fields(
            Self::TAG,
            [self.sx, self.rx, self.ry, self.sy, self.tx, self.ty].map(Field::Float),
        )
    }

    fn decode(record: &Record) -> Result<Self> {
        let mut reader = FieldReader::new::<Self>(record)?;
        let matrix = AffineMatrix::new(
            reader.float(1.0)?,
            reader.float(0.0)?,
            reader.float(0.0)?,
            reader.float(1.0)?,
            reader.float(0.0)?,
            reader.float(0.0)?,
        );
        reader.finish();
        Ok(matrix)
    }
}

impl Structured for Chromaticity {
    const TAG: &'static str = "Chromaticity";
    const FIELDS: &'static [&'static str] =
        &["red_primary", "green_primary", "blue_primary", "white_point"];

    fn encode(&self) -> Record {
        Record::from_fields(
            Self::TAG,
            [
                self.red_primary,
                self.green_primary,
                self.blue_primary,
                self.white_point,
            ]
            .map(|primary| Field::Record(primary.encode())),
        )
    }

    fn decode(record: &Record) -> Result<Self> {
        let mut reader = FieldReader::new::<Self>(record)?;
        let chroma = Chromaticity {
            red_primary: reader.record()?,
            green_primary: reader.record()?,
            blue_primary: reader.record()?,
            white_point: reader.record()?,
        };
        reader.finish();
        Ok(chroma)
    }
}

impl Structured for GradientFill {
    const TAG: &'static str = "GradientFill";
    const FIELDS: &'static [&'static str] =
        &["x1", "y1", "x2", "y2", "start_color", "stop_color"];

    fn encode(&self) -> Record {
        let Point([x1, y1]) = self.start();
        let Point([x2, y2]) = self.end();
        let mut fields: Vec<Field> = [x1, y1, x2, y2].map(Field::Float).into();
        fields.push(Field::Record(self.start_color().encode()));
        fields.push(Field::Record(self.stop_color().encode()));
        Record::from_fields(Self::TAG, fields)
    }

    fn decode(record: &Record) -> Result<Self> {
        let mut reader = FieldReader::new::<Self>(record)?;
        let fill = GradientFill::new(
            reader.float(0.0)?,
            reader.float(0.0)?,
            reader.float(0.0)?,
            reader.float(0.0)?,
            reader.record()?,
            reader.record()?,
        );
        reader.finish();
        Ok(fill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QUANTUM_RANGE;

    fn round_trip<T: Structured + PartialEq + std::fmt::Debug>(value: T) -> Result<()> {
        let record = encode(&value);
        assert_eq!(record.fields().len(), T::FIELDS.len());
        assert_eq!(decode::<T>(&record)?, value);
        #[cfg(feature = "serde")]
        {
            let restored = Record::from_json_str(&record.to_json_string())?;
            assert_eq!(decode::<T>(&restored)?, value);
        }
        Ok(())
    }

    #[test]
    fn test_round_trip() -> Result<()> {
        round_trip(Pixel::new(1, 2, QUANTUM_RANGE, 4))?;
        round_trip(Point::new(1.5, -2.25))?;
        round_trip(PrimaryInfo::new(0.64, 0.33, 0.03))?;
        round_trip(Rectangle::new(640, 480, -10, 20))?;
        round_trip(Rectangle::new(u64::MAX, 1, i64::MIN, i64::MAX))?;
        round_trip(Segment::new(1.0, 2.0, 3.5, -4.5))?;
        round_trip(AffineMatrix::new(2.0, 0.5, -0.5, 3.0, 10.0, 1.0))?;
        round_trip(Chromaticity {
            red_primary: PrimaryInfo::new(0.64, 0.33, 0.0),
            green_primary: PrimaryInfo::new(0.3, 0.6, 0.0),
            blue_primary: PrimaryInfo::new(0.15, 0.06, 0.0),
            white_point: PrimaryInfo::new(0.3127, 0.329, 0.0),
        })?;
        round_trip(GradientFill::new(
            0.0,
            1.0,
            2.0,
            3.0,
            Pixel::rgb(1, 2, 3),
            Pixel::new(4, 5, 6, 7),
        ))?;
        Ok(())
    }

    #[test]
    fn test_field_order() {
        let record = AffineMatrix::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0).encode();
        let values: Vec<_> = record
            .fields()
            .iter()
            .map(|field| match field {
                Some(Field::Float(value)) => *value,
                _ => panic!("float expected"),
            })
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(record.tag(), "AffineMatrix");
    }

    #[test]
    fn test_missing_fields_default() -> Result<()> {
        let empty = Record::new("AffineMatrix", Vec::new());
        assert_eq!(decode::<AffineMatrix>(&empty)?, AffineMatrix::identity());

        let partial = Record::new(
            "AffineMatrix",
            vec![Some(Field::Float(2.0)), None, Some(Field::Float(0.5))],
        );
        assert_eq!(
            decode::<AffineMatrix>(&partial)?,
            AffineMatrix::new(2.0, 0.0, 0.5, 1.0, 0.0, 0.0)
        );

        let pixel = Record::new("Pixel", vec![Some(Field::Int(100))]);
        assert_eq!(decode::<Pixel>(&pixel)?, Pixel::new(100, 0, 0, 0));

        let chroma = Record::new(
            "Chromaticity",
            vec![Some(PrimaryInfo::new(0.1, 0.2, 0.0).encode().into())],
        );
        let chroma = decode::<Chromaticity>(&chroma)?;
        assert_eq!(chroma.red_primary, PrimaryInfo::new(0.1, 0.2, 0.0));
        assert_eq!(chroma.white_point, PrimaryInfo::default());

        let fill = decode::<GradientFill>(&Record::new("GradientFill", Vec::new()))?;
        assert_eq!(fill.start_color(), Pixel::default());
        Ok(())
    }

    #[test]
    fn test_int_accepted_for_float() -> Result<()> {
        let record = Record::new("Point", vec![Some(3i64.into()), Some(4i64.into())]);
        assert_eq!(decode::<Point>(&record)?, Point::new(3.0, 4.0));
        Ok(())
    }

    #[test]
    fn test_extra_fields_ignored() -> Result<()> {
        let record = Record::new(
            "Point",
            vec![
                Some(Field::Float(1.0)),
                Some(Field::Float(2.0)),
                Some(Field::Float(3.0)),
            ],
        );
        assert_eq!(decode::<Point>(&record)?, Point::new(1.0, 2.0));
        Ok(())
    }

    #[test]
    fn test_type_mismatch() {
        let record = Point::new(1.0, 2.0).encode();
        assert_eq!(
            decode::<Segment>(&record),
            Err(Error::type_mismatch("Segment", "Point"))
        );

        let record = Record::new("Pixel", vec![Some(Field::Float(1.5))]);
        assert!(matches!(
            decode::<Pixel>(&record),
            Err(Error::TypeMismatch { .. })
        ));

        let record = Record::new(
            "Chromaticity",
            vec![Some(Pixel::default().encode().into())],
        );
        assert!(matches!(
            decode::<Chromaticity>(&record),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_unsigned_fields() -> Result<()> {
        let record = Rectangle::new(u64::MAX, 7, 0, 0).encode();
        assert_eq!(record.fields()[0], Some(Field::UInt(u64::MAX)));
        assert_eq!(record.fields()[1], Some(Field::Int(7)));
        assert_eq!(decode::<Rectangle>(&record)?.width, u64::MAX);

        let record = Record::new("Point", vec![Some(Field::UInt(u64::MAX))]);
        assert_eq!(decode::<Point>(&record)?.x(), u64::MAX as Scalar);

        let record = Record::new("Pixel", vec![Some(Field::UInt(u64::MAX))]);
        assert!(matches!(
            decode::<Pixel>(&record),
            Err(Error::TypeMismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_out_of_range() {
        let record = Record::new("Pixel", vec![Some(Field::Int(70000))]);
        assert!(matches!(
            decode::<Pixel>(&record),
            Err(Error::InvalidFormat(_))
        ));
        let record = Record::new("Rectangle", vec![Some(Field::Int(-1))]);
        assert!(matches!(
            decode::<Rectangle>(&record),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_shape() -> Result<()> {
        let record = Record::new(
            "Segment",
            vec![Some(Field::Float(1.5)), None, Some(Field::Int(2))],
        );
        assert_eq!(
            record.to_json_string(),
            r#"{"type":"Segment","fields":[1.5,null,2]}"#
        );
        let old_dump = r#"{"type": "AffineMatrix", "fields": [2.0, 0.0]}"#;
        let matrix = decode::<AffineMatrix>(&Record::from_json_str(old_dump)?)?;
        assert_eq!(matrix, AffineMatrix::new(2.0, 0.0, 0.0, 1.0, 0.0, 0.0));

        assert!(matches!(
            Record::from_json_str("[1, 2]"),
            Err(Error::InvalidFormat(_))
        ));
        assert!(matches!(
            Record::from_json_str(r#"{"type": "Point", "fields": ["1"]}"#),
            Err(Error::InvalidFormat(_))
        ));
        assert!(matches!(
            Record::from_json_str("{not json"),
            Err(Error::InvalidFormat(_))
        ));
        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_non_finite() -> Result<()> {
        let matrix = AffineMatrix::new(Scalar::INFINITY, 0.0, 0.0, Scalar::NEG_INFINITY, 0.0, 0.0);
        let text = matrix.encode().to_json_string();
        assert_eq!(
            text,
            r#"{"type":"AffineMatrix","fields":["inf",0.0,0.0,"-inf",0.0,0.0]}"#
        );
        assert_eq!(decode::<AffineMatrix>(&Record::from_json_str(&text)?)?, matrix);

        let point = Point::new(Scalar::NAN, 1.0).encode();
        let point = decode::<Point>(&Record::from_json_str(&point.to_json_string())?)?;
        assert!(point.x().is_nan());

        let text = format!(r#"{{"type":"Rectangle","fields":[{},1]}}"#, u64::MAX);
        assert_eq!(
            decode::<Rectangle>(&Record::from_json_str(&text)?)?,
            Rectangle::new(u64::MAX, 1, 0, 0)
        );
        Ok(())
    }
}
