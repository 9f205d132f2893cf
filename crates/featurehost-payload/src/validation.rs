//! Payload validation and the output shape policy.

use serde::{Deserialize, Serialize};

use crate::error::PayloadError;
use crate::payload::Payload;

/// Deepest nesting accepted for host-supplied payloads.
pub const MAX_PAYLOAD_DEPTH: usize = 32;

/// Checks a host-supplied payload before it is bound.
///
/// Rejects non-finite floats and nesting deeper than [`MAX_PAYLOAD_DEPTH`].
/// Shape is not checked here: whether a shape is usable is for the routine
/// to decide.
pub fn validate_payload(payload: &Payload) -> Result<(), PayloadError> {
    let depth = payload.depth();
    if depth > MAX_PAYLOAD_DEPTH {
        return Err(PayloadError::TooDeep {
            depth,
            limit: MAX_PAYLOAD_DEPTH,
        });
    }
    if !payload.is_finite() {
        return Err(PayloadError::NonFinite);
    }
    Ok(())
}

/// How strictly the host compares output shape against input shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapePolicy {
    /// Any numeric structure is accepted.
    #[default]
    Any,
    /// Output must have exactly the input's rectangular shape.
    Same,
}

impl ShapePolicy {
    /// Returns the policy name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapePolicy::Any => "any",
            ShapePolicy::Same => "same",
        }
    }

    /// Checks `output` against `input` under this policy.
    ///
    /// Returns a description of the mismatch on failure.
    pub fn check(&self, input: &Payload, output: &Payload) -> Result<(), String> {
        match self {
            ShapePolicy::Any => Ok(()),
            ShapePolicy::Same => {
                let input_shape = input.shape();
                let output_shape = output.shape();
                match (&input_shape, &output_shape) {
                    (Some(a), Some(b)) if a == b => Ok(()),
                    _ => Err(format!(
                        "output shape {} does not match input shape {}",
                        describe_shape(output_shape.as_deref()),
                        describe_shape(input_shape.as_deref()),
                    )),
                }
            }
        }
    }
}

impl std::str::FromStr for ShapePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(ShapePolicy::Any),
            "same" => Ok(ShapePolicy::Same),
            other => Err(format!("unknown shape policy '{}' (expected any, same)", other)),
        }
    }
}

fn describe_shape(shape: Option<&[usize]>) -> String {
    match shape {
        Some(dims) => format!("{:?}", dims),
        None => "ragged".to_string(),
    }
}
