//! Resolved style and prop values
//!
//! A [`Style`] is an ordered mapping from a style/prop key to a resolved
//! [`PropValue`]. Elements resolve their static entries, shared-value
//! bindings and animated styles into a `Style` whenever a snapshot is read.
//!
//! Equality between two styles ignores key order, matching how snapshots
//! are compared in assertions.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default tolerance used when comparing numeric values
pub const DEFAULT_NUMBER_EPSILON: f32 = 1e-3;

/// A single resolved style or prop value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Number(f32),
    Text(String),
    /// Nested map, e.g. the `style` entry of animated props
    Map(Style),
}

impl PropValue {
    /// Numeric value, if this is a number
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text value, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Nested map, if this is a map
    pub fn as_map(&self) -> Option<&Style> {
        match self {
            PropValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Compare two values, allowing numbers to differ by at most `epsilon`
    pub fn approx_eq(&self, other: &PropValue, epsilon: f32) -> bool {
        match (self, other) {
            (PropValue::Number(a), PropValue::Number(b)) => (a - b).abs() <= epsilon,
            (PropValue::Map(a), PropValue::Map(b)) => a.approx_eq(b, epsilon),
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Bool(b) => write!(f, "{b}"),
            PropValue::Number(n) => write!(f, "{n}"),
            PropValue::Text(s) => write!(f, "{s:?}"),
            PropValue::Map(m) => write!(f, "{m}"),
        }
    }
}

impl From<f32> for PropValue {
    fn from(value: f32) -> Self {
        PropValue::Number(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value as f32)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Number(value as f32)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value)
    }
}

impl From<Style> for PropValue {
    fn from(value: Style) -> Self {
        PropValue::Map(value)
    }
}

/// One key that differs between an expected and an actual style
#[derive(Clone, Debug, PartialEq)]
pub struct PropMismatch {
    pub key: String,
    /// `None` when the key was not expected
    pub expected: Option<PropValue>,
    /// `None` when the key is missing from the actual style
    pub actual: Option<PropValue>,
}

impl fmt::Display for PropMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<PropValue>| match v {
            Some(v) => v.to_string(),
            None => "<absent>".to_string(),
        };
        write!(
            f,
            "{}: expected {}, actual {}",
            self.key,
            show(&self.expected),
            show(&self.actual)
        )
    }
}

/// An ordered style/prop mapping
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style(IndexMap<String, PropValue>);

impl Style {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value, keeping the key's original position
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.get(key)
    }

    /// Numeric value for a key
    pub fn number(&self, key: &str) -> Option<f32> {
        self.get(key).and_then(PropValue::as_number)
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overlay `other` on top of this style; later values win
    pub fn merge(&mut self, other: &Style) {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }

    /// Compare ignoring key order, with numeric tolerance
    pub fn approx_eq(&self, other: &Style, epsilon: f32) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| v.approx_eq(o, epsilon)))
    }

    /// List every key that differs from `expected`
    ///
    /// Expected keys are reported first in their declared order, followed by
    /// keys present only in `self`.
    pub fn diff(&self, expected: &Style, epsilon: f32) -> Vec<PropMismatch> {
        let mut mismatches = Vec::new();

        for (key, want) in expected.iter() {
            match self.get(key) {
                Some(got) if got.approx_eq(want, epsilon) => {}
                got => mismatches.push(PropMismatch {
                    key: key.to_string(),
                    expected: Some(want.clone()),
                    actual: got.cloned(),
                }),
            }
        }

        for (key, got) in self.iter() {
            if !expected.contains_key(key) {
                mismatches.push(PropMismatch {
                    key: key.to_string(),
                    expected: None,
                    actual: Some(got.clone()),
                });
            }
        }

        mismatches
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        write!(f, "}}")
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Style {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut style = Style::new();
        for (k, v) in iter {
            style.insert(k, v);
        }
        style
    }
}

/// Build a [`Style`] from `key => value` pairs
///
/// ```
/// use kinema_core::style;
///
/// let s = style! { "width" => 100.0, "backgroundColor" => "violet" };
/// assert_eq!(s.number("width"), Some(100.0));
/// ```
#[macro_export]
macro_rules! style {
    () => { $crate::value::Style::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut s = $crate::value::Style::new();
        $( s.insert($key, $value); )+
        s
    }};
}
