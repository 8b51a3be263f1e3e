use crate::error::{self, Result};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

/// A semi-structured document, e.g. the `spec` or `status` of a requirement. Values are the
/// tagged variant `serde_json::Value`, so a `Document` works for any resource shape without
/// knowing its schema.
pub type Document = Map<String, Value>;

/// Whether `value` carries no information. `null`, `""`, `[]` and `{}` are empty. Booleans and
/// numbers never are, since `false` and `0` are values a requester can set on purpose.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Interpret an optional value found at `path` as a `Document`. A missing or `null` value is an
/// empty document.
pub(crate) fn document_at(value: Option<&Value>, path: &str) -> Result<Document> {
    match value {
        None | Some(Value::Null) => Ok(Document::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(error::MalformedFieldSnafu {
            path,
            expected: "an object",
            got: type_name(other),
        }
        .build()
        .into()),
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// A dotted path into a `Document`, e.g. `writeConnectionSecretToRef.name`.
///
/// Navigation never panics: reading through a missing key or a non-object value yields `None`.
/// Writing through a non-object intermediate value replaces it with an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The first key of the path, which is the top-level field it addresses.
    pub fn root(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    pub fn get<'a>(&self, doc: &'a Document) -> Option<&'a Value> {
        let (last, parents) = self.segments.split_last()?;
        let mut current = doc;
        for key in parents {
            current = current.get(key)?.as_object()?;
        }
        current.get(last)
    }

    /// Set `value` at this path, creating intermediate objects as needed. An empty path is a
    /// no-op.
    pub fn set(&self, doc: &mut Document, value: Value) {
        let (last, parents) = match self.segments.split_last() {
            Some(split) => split,
            None => return,
        };
        let mut current = doc;
        for key in parents {
            let entry = current
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => return,
            };
        }
        current.insert(last.clone(), value);
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::new(path.split('.').filter(|s| !s.is_empty()))
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self::from(path.as_str())
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
