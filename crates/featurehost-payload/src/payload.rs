//! Numeric payloads exchanged between a host and a routine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PayloadError;

/// A numeric value or an ordered, possibly nested, sequence of them.
///
/// The JSON form is untagged: `3`, `2.5`, `[1, 2, [3.0, 4.0]]`. Integers
/// and floats are kept apart so a routine that adds `1` to `[1, 2]` hands
/// back `[2, 3]` rather than `[2.0, 3.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// An integer scalar.
    Int(i64),
    /// A floating-point scalar.
    Float(f64),
    /// An ordered sequence of payloads.
    Seq(Vec<Payload>),
}

impl Default for Payload {
    /// The empty sequence, bound when the host supplies no input.
    fn default() -> Self {
        Payload::empty()
    }
}

impl Payload {
    /// Creates an empty sequence.
    pub fn empty() -> Self {
        Payload::Seq(Vec::new())
    }

    /// Parses a payload from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, PayloadError> {
        serde_json::from_str(text).map_err(PayloadError::Json)
    }

    /// Converts a JSON value into a payload.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, PayloadError> {
        serde_json::from_value(value).map_err(PayloadError::Json)
    }

    /// Serializes the payload to compact JSON.
    pub fn to_json(&self) -> Result<String, PayloadError> {
        serde_json::to_string(self).map_err(PayloadError::Json)
    }

    /// Serializes the payload to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, PayloadError> {
        serde_json::to_string_pretty(self).map_err(PayloadError::Json)
    }

    /// Returns true for `Int` and `Float`.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Payload::Seq(_))
    }

    /// Returns the elements if this is a sequence.
    pub fn as_seq(&self) -> Option<&[Payload]> {
        match self {
            Payload::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Returns true for a sequence with no elements.
    pub fn is_empty_seq(&self) -> bool {
        matches!(self, Payload::Seq(items) if items.is_empty())
    }

    /// Returns a scalar as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Payload::Int(i) => Some(*i as f64),
            Payload::Float(f) => Some(*f),
            Payload::Seq(_) => None,
        }
    }

    /// Returns a flat sequence of scalars as `f64`s.
    ///
    /// `None` if this is a scalar or if any element is itself a sequence.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        self.as_seq()?.iter().map(Payload::as_f64).collect()
    }

    /// Returns a sequence of flat scalar sequences as rows of `f64`s.
    ///
    /// Rows may differ in length; use [`Payload::shape`] to check for a
    /// rectangular matrix.
    pub fn to_rows(&self) -> Option<Vec<Vec<f64>>> {
        self.as_seq()?.iter().map(Payload::to_f64_vec).collect()
    }

    /// Returns the dimensions of a rectangular payload.
    ///
    /// Scalars have shape `[]`, `[1, 2, 3]` has shape `[3]`, and
    /// `[[1, 2], [3, 4]]` has shape `[2, 2]`. Ragged or mixed-depth
    /// structures return `None`. The empty sequence has shape `[0]`.
    pub fn shape(&self) -> Option<Vec<usize>> {
        match self {
            Payload::Int(_) | Payload::Float(_) => Some(Vec::new()),
            Payload::Seq(items) => {
                let mut inner: Option<Vec<usize>> = None;
                for item in items {
                    let item_shape = item.shape()?;
                    match &inner {
                        None => inner = Some(item_shape),
                        Some(existing) if *existing == item_shape => {}
                        Some(_) => return None,
                    }
                }
                let mut shape = vec![items.len()];
                shape.extend(inner.unwrap_or_default());
                Some(shape)
            }
        }
    }

    /// Nesting depth: 0 for scalars, 1 for a flat sequence.
    pub fn depth(&self) -> usize {
        match self {
            Payload::Seq(items) => 1 + items.iter().map(Payload::depth).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// Total number of scalars anywhere in the structure.
    pub fn scalar_count(&self) -> usize {
        match self {
            Payload::Seq(items) => items.iter().map(Payload::scalar_count).sum(),
            _ => 1,
        }
    }

    /// Returns true when every float in the structure is finite.
    pub fn is_finite(&self) -> bool {
        match self {
            Payload::Int(_) => true,
            Payload::Float(f) => f.is_finite(),
            Payload::Seq(items) => items.iter().all(Payload::is_finite),
        }
    }

    /// Applies `f` to every scalar, preserving the structure.
    pub fn map_scalars<F>(&self, f: &F) -> Payload
    where
        F: Fn(&Payload) -> Payload,
    {
        match self {
            Payload::Seq(items) => Payload::Seq(items.iter().map(|p| p.map_scalars(f)).collect()),
            scalar => f(scalar),
        }
    }

    /// Numeric equality within `tolerance`, treating `Int(2)` and
    /// `Float(2.0)` as equal. Structures must match exactly.
    pub fn approx_eq(&self, other: &Payload, tolerance: f64) -> bool {
        match (self, other) {
            (Payload::Seq(a), Payload::Seq(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.approx_eq(y, tolerance))
            }
            (Payload::Seq(_), _) | (_, Payload::Seq(_)) => false,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => (x - y).abs() <= tolerance || x == y,
                _ => false,
            },
        }
    }
}

impl From<i64> for Payload {
    fn from(value: i64) -> Self {
        Payload::Int(value)
    }
}

impl From<f64> for Payload {
    fn from(value: f64) -> Self {
        Payload::Float(value)
    }
}

impl From<Vec<i64>> for Payload {
    fn from(values: Vec<i64>) -> Self {
        Payload::Seq(values.into_iter().map(Payload::Int).collect())
    }
}

impl From<Vec<f64>> for Payload {
    fn from(values: Vec<f64>) -> Self {
        Payload::Seq(values.into_iter().map(Payload::Float).collect())
    }
}

impl From<Vec<Vec<f64>>> for Payload {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Payload::Seq(rows.into_iter().map(Payload::from).collect())
    }
}

impl From<Vec<Payload>> for Payload {
    fn from(items: Vec<Payload>) -> Self {
        Payload::Seq(items)
    }
}

/// Formats like a Python list literal: `[2, 3, 4.5]`.
impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Int(i) => write!(f, "{}", i),
            Payload::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{}", x)
                }
            }
            Payload::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}
