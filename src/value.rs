//! The runtime value tree produced by a successful validation.

use indexmap::IndexMap;

/// A normalized primitive scalar, produced by [`crate::primitive`] parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(chrono::NaiveDate),
    DateTime(chrono::NaiveDateTime),
    Time(chrono::NaiveTime),
    Bytes(Vec<u8>),
    Uuid(uuid::Uuid),
    Url(url::Url),
    /// `"<number> <unit>"` physical quantities.
    Physical { magnitude: f64, unit: String },
}

impl PrimitiveValue {
    /// A stable textual key used for uniqueness/reference indexing, tagged
    /// by kind so e.g. `1` (int) and `"1"` (str) never collide.
    #[must_use]
    pub fn unique_key(&self) -> String {
        match self {
            Self::Str(s) => format!("str:{s}"),
            Self::Int(i) => format!("int:{i}"),
            Self::Float(f) => format!("float:{f}"),
            Self::Bool(b) => format!("bool:{b}"),
            Self::Date(d) => format!("date:{d}"),
            Self::DateTime(d) => format!("datetime:{d}"),
            Self::Time(t) => format!("time:{t}"),
            Self::Bytes(b) => format!("bytes:{}", base64::Engine::encode(&base64::engine::general_purpose::STANDARD, b)),
            Self::Uuid(u) => format!("uuid:{u}"),
            Self::Url(u) => format!("url:{u}"),
            Self::Physical { magnitude, unit } => format!("physical:{magnitude}:{unit}"),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl std::fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(d) => write!(f, "{d}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Url(u) => write!(f, "{u}"),
            Self::Physical { magnitude, unit } => write!(f, "{magnitude} {unit}"),
        }
    }
}

/// A fully validated composite object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    /// The type this object was validated against.
    pub type_name: String,
    /// That type's namespace.
    pub namespace: String,
    /// Property name -> validated value, in the type's declared order.
    pub fields: IndexMap<String, Value>,
}

/// The runtime value tree: the result of validating one YAML document
/// against a compiled root type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Primitive(PrimitiveValue),
    /// An enum member, stored as its matched string.
    Enum(String),
    List(Vec<Value>),
    /// Map entries in document-insertion order, keyed by a rendered
    /// primitive/enum key.
    Map(Vec<(String, Value)>),
    Object(ObjectValue),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_primitive(&self) -> Option<&PrimitiveValue> {
        match self {
            Self::Primitive(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_keys_distinguish_kinds() {
        let a = PrimitiveValue::Str("1".into());
        let b = PrimitiveValue::Int(1);
        assert_ne!(a.unique_key(), b.unique_key());
    }

    #[test]
    fn value_helpers() {
        assert!(Value::Null.is_null());
        assert!(Value::Primitive(PrimitiveValue::Int(3)).as_primitive().is_some());
    }
}
