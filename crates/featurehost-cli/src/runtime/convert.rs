//! Conversion between payloads and Starlark values.
//!
//! Payloads go in as frozen Starlark lists of ints and floats, so a routine
//! that tries to mutate its input faults. Values come back out through the
//! same mapping, with tuples accepted as sequences. Outputs must be finite
//! and nest no deeper than [`MAX_PAYLOAD_DEPTH`].

use super::error::ExecError;
use featurehost_payload::{Payload, MAX_PAYLOAD_DEPTH};
use starlark::values::list::{AllocList, ListRef};
use starlark::values::tuple::TupleRef;
use starlark::values::{FrozenHeap, FrozenValue, UnpackValue, Value};

/// Allocates a payload on a frozen Starlark heap.
///
/// Integers outside the `i32` range are bound as floats.
pub fn payload_to_frozen(heap: &FrozenHeap, payload: &Payload) -> FrozenValue {
    match payload {
        Payload::Int(i) => match i32::try_from(*i) {
            Ok(small) => heap.alloc(small),
            Err(_) => heap.alloc(*i as f64),
        },
        Payload::Float(f) => heap.alloc(*f),
        Payload::Seq(items) => {
            let values: Vec<FrozenValue> = items
                .iter()
                .map(|item| payload_to_frozen(heap, item))
                .collect();
            heap.alloc(AllocList(values))
        }
    }
}

/// Converts a Starlark value to a payload.
///
/// Supported conversions:
/// - `int` -> `Payload::Int` (must fit in 64 bits)
/// - `float` -> `Payload::Float` (must be finite)
/// - `list`, `tuple` -> `Payload::Seq`
///
/// Sequences nested deeper than [`MAX_PAYLOAD_DEPTH`] are rejected before
/// their contents are visited.
///
/// `name` is used in error messages to point at the offending element,
/// e.g. `output_data[1][0]`.
pub fn value_to_payload(value: Value, name: &str) -> Result<Payload, ExecError> {
    convert_at(value, name, 0)
}

fn convert_at(value: Value, name: &str, depth: usize) -> Result<Payload, ExecError> {
    if value.unpack_bool().is_some() || value.is_none() {
        return Err(unsupported(value, name));
    }

    if value.get_type() == "int" {
        return i64::unpack_value(value)
            .map(Payload::Int)
            .ok_or_else(|| ExecError::OutputConversion {
                message: format!("{} = {} does not fit in 64 bits", name, value),
            });
    }

    if value.get_type() == "float" {
        return match f64::unpack_value(value) {
            Some(f) if f.is_finite() => Ok(Payload::Float(f)),
            _ => Err(ExecError::OutputConversion {
                message: format!("{} = {} is not a finite number", name, value),
            }),
        };
    }

    let items: Vec<Value> = if let Some(list) = ListRef::from_value(value) {
        list.iter().collect()
    } else if let Some(tuple) = TupleRef::from_value(value) {
        tuple.content().to_vec()
    } else {
        return Err(unsupported(value, name));
    };

    if depth >= MAX_PAYLOAD_DEPTH {
        return Err(ExecError::OutputConversion {
            message: format!("{} nests deeper than {} levels", name, MAX_PAYLOAD_DEPTH),
        });
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| convert_at(item, &format!("{}[{}]", name, i), depth + 1))
        .collect::<Result<Vec<_>, _>>()
        .map(Payload::Seq)
}

fn unsupported(value: Value, name: &str) -> ExecError {
    ExecError::OutputConversion {
        message: format!(
            "{} must be a number or a list of numbers, got {}",
            name,
            value.get_type()
        ),
    }
}
