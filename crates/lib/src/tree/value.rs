//! Property value types.
//!
//! A property is either a single [`Scalar`] or a homogeneous array of scalars
//! sharing one [`ScalarType`]. The register editors are generic over the
//! primitive type: they only ever compare scalars for equality and order, and
//! check that two properties agree on their base type.

use std::{convert::Infallible, fmt, slice, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::TreeError;

/// The primitive type of a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    String,
    Long,
    Boolean,
    Date,
}

impl ScalarType {
    /// Returns a human-readable name for this type
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::String => "String",
            ScalarType::Long => "Long",
            ScalarType::Boolean => "Boolean",
            ScalarType::Date => "Date",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single primitive value.
///
/// Scalars are totally ordered (first by type, then by value) so that
/// materialized sets have a deterministic layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scalar {
    String(String),
    Long(i64),
    Boolean(bool),
    Date(DateTime<Utc>),
}

impl Scalar {
    /// The primitive type of this scalar
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Scalar::String(_) => ScalarType::String,
            Scalar::Long(_) => ScalarType::Long,
            Scalar::Boolean(_) => ScalarType::Boolean,
            Scalar::Date(_) => ScalarType::Date,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Scalar::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Scalar::Date(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Long(n) => write!(f, "{n}"),
            Scalar::Boolean(b) => write!(f, "{b}"),
            Scalar::Date(d) => f.write_str(&d.to_rfc3339()),
        }
    }
}

/// Parses command line style input.
///
/// `true`/`false` become booleans, integers become longs, RFC 3339 timestamps
/// become dates and anything else is a string. Wrapping the input in double
/// quotes forces a string.
impl FromStr for Scalar {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(quoted) = s.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
            return Ok(Scalar::String(quoted.to_string()));
        }
        if let Ok(b) = s.parse::<bool>() {
            return Ok(Scalar::Boolean(b));
        }
        if let Ok(n) = s.parse::<i64>() {
            return Ok(Scalar::Long(n));
        }
        if let Ok(d) = DateTime::parse_from_rfc3339(s) {
            return Ok(Scalar::Date(d.with_timezone(&Utc)));
        }
        Ok(Scalar::String(s.to_string()))
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Long(n)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(d: DateTime<Utc>) -> Self {
        Scalar::Date(d)
    }
}

/// A homogeneous array of scalars.
///
/// Every element has the array's base type. Deserialization enforces this
/// the same way [`PropertyValue::array`] does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawArray")]
pub struct ScalarArray {
    base: ScalarType,
    values: Vec<Scalar>,
}

impl ScalarArray {
    /// # Errors
    /// Returns [`TreeError::MixedArray`] if any element is not of type `base`.
    pub fn new(base: ScalarType, values: Vec<Scalar>) -> Result<Self, TreeError> {
        if let Some(odd) = values.iter().find(|v| v.scalar_type() != base) {
            return Err(TreeError::MixedArray {
                expected: base,
                actual: odd.scalar_type(),
            });
        }
        Ok(Self { base, values })
    }

    pub fn base(&self) -> ScalarType {
        self.base
    }

    pub fn values(&self) -> &[Scalar] {
        &self.values
    }
}

#[derive(Deserialize)]
struct RawArray {
    base: ScalarType,
    values: Vec<Scalar>,
}

impl TryFrom<RawArray> for ScalarArray {
    type Error = TreeError;

    fn try_from(raw: RawArray) -> Result<Self, Self::Error> {
        ScalarArray::new(raw.base, raw.values)
    }
}

/// The value of a property: one scalar or a homogeneous array.
///
/// An empty array still has a base type and is distinct from an absent
/// property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyValue {
    Single(Scalar),
    Array(ScalarArray),
}

impl PropertyValue {
    /// Build an array of `base` typed scalars.
    ///
    /// # Errors
    /// Returns [`TreeError::MixedArray`] if any element is not of type `base`.
    pub fn array(
        base: ScalarType,
        values: impl IntoIterator<Item = Scalar>,
    ) -> Result<Self, TreeError> {
        ScalarArray::new(base, values.into_iter().collect()).map(PropertyValue::Array)
    }

    /// An empty array of the given base type
    pub fn empty_array(base: ScalarType) -> Self {
        PropertyValue::Array(ScalarArray {
            base,
            values: Vec::new(),
        })
    }

    /// The primitive type of the value, or of the array's elements
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            PropertyValue::Single(s) => s.scalar_type(),
            PropertyValue::Array(array) => array.base,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, PropertyValue::Array(_))
    }

    /// All scalars of this value; a single value yields a one element slice.
    pub fn values(&self) -> &[Scalar] {
        match self {
            PropertyValue::Single(s) => slice::from_ref(s),
            PropertyValue::Array(array) => &array.values,
        }
    }

    /// The scalar, if this is not an array
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            PropertyValue::Single(s) => Some(s),
            PropertyValue::Array(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Single(s) => write!(f, "{s}"),
            PropertyValue::Array(array) => {
                f.write_str("[")?;
                for (i, v) in array.values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<Scalar> for PropertyValue {
    fn from(s: Scalar) -> Self {
        PropertyValue::Single(s)
    }
}

macro_rules! property_value_from {
    ($($ty:ty => $base:ident),* $(,)?) => {
        $(
            impl From<$ty> for PropertyValue {
                fn from(v: $ty) -> Self {
                    PropertyValue::Single(Scalar::from(v))
                }
            }

            impl From<Vec<$ty>> for PropertyValue {
                fn from(vs: Vec<$ty>) -> Self {
                    PropertyValue::Array(ScalarArray {
                        base: ScalarType::$base,
                        values: vs.into_iter().map(Scalar::from).collect(),
                    })
                }
            }
        )*
    };
}

property_value_from! {
    String => String,
    &str => String,
    i64 => Long,
    bool => Boolean,
    DateTime<Utc> => Date,
}

/// A named property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyState {
    name: String,
    value: PropertyValue,
}

impl PropertyState {
    pub fn new(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub fn into_value(self) -> PropertyValue {
        self.value
    }

    pub fn is_array(&self) -> bool {
        self.value.is_array()
    }

    pub fn scalar_type(&self) -> ScalarType {
        self.value.scalar_type()
    }

    /// The same value under a different name
    pub fn renamed(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: self.value,
        }
    }
}
