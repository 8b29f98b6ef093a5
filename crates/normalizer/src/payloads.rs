use serde_json::{Map, Value};

static NULL: Value = Value::Null;

/// Total accessors over an untyped delivery payload.
///
/// Every lookup resolves to a default (`Null`, `""`, `false`) when a key is
/// missing, null, or holds the wrong type, so callers never branch on
/// failure.
pub trait PayloadExt {
    fn field(&self, key: &str) -> &Value;

    fn path(&self, keys: &[&str]) -> &Value;

    /// String at `keys`, or `""` for anything that is not a string.
    fn str_at(&self, keys: &[&str]) -> &str;

    /// `true` only for a literal JSON `true`.
    fn bool_at(&self, keys: &[&str]) -> bool;

    /// Identifier rendered as text: non-zero numbers and non-empty strings.
    fn id_at(&self, keys: &[&str]) -> String;

    /// First element of the array under `key`, `Null` when absent or empty.
    fn first_item(&self, key: &str) -> &Value;
}

impl PayloadExt for Value {
    fn field(&self, key: &str) -> &Value {
        match self {
            Value::Object(map) => map.get(key).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    fn path(&self, keys: &[&str]) -> &Value {
        keys.iter().fold(self, |value, key| value.field(key))
    }

    fn str_at(&self, keys: &[&str]) -> &str {
        self.path(keys).as_str().unwrap_or_default()
    }

    fn bool_at(&self, keys: &[&str]) -> bool {
        matches!(self.path(keys), Value::Bool(true))
    }

    fn id_at(&self, keys: &[&str]) -> String {
        match self.path(keys) {
            Value::Number(number) if number.as_f64() != Some(0.0) => number.to_string(),
            Value::String(text) => text.clone(),
            _ => String::new(),
        }
    }

    fn first_item(&self, key: &str) -> &Value {
        self.field(key)
            .as_array()
            .and_then(|items| items.first())
            .unwrap_or(&NULL)
    }
}

/// Parses a raw delivery body into an object, never failing: empty,
/// malformed, or non-object bodies become an empty object.
pub fn parse_payload(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Object(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) | Err(_) => Value::Object(Map::new()),
    }
}

/// First candidate that is not empty.
pub(crate) fn first_non_empty<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates.into_iter().find(|candidate| !candidate.is_empty())
}
