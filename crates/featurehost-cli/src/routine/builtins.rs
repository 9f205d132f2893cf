//! Precompiled feature routines.
//!
//! | Name | Effect |
//! |------|--------|
//! | `add_one` | adds 1 to every value, keeping ints as ints |
//! | `square` | squares every value |
//! | `normalize_max` | divides a flat sequence by its maximum |
//! | `standardize` | per-column z-score of a 2-D matrix |
//! | `passthrough` | returns the input unchanged |

use super::NativeRoutine;
use crate::diagnostics::Diagnostics;
use crate::runtime::stdlib::numeric::{column_means, column_stds};
use crate::runtime::ExecError;
use featurehost_payload::Payload;

/// Substituted for a zero column deviation in `standardize`.
pub const STD_FLOOR: f64 = 1e-8;

/// Names of all builtin routines, in listing order.
pub const BUILTIN_NAMES: &[&str] = &[
    "add_one",
    "square",
    "normalize_max",
    "standardize",
    "passthrough",
];

/// One-line description of a builtin, for listings.
pub fn describe(name: &str) -> Option<&'static str> {
    Some(match name {
        "add_one" => "add 1 to every value",
        "square" => "square every value",
        "normalize_max" => "divide a flat sequence by its maximum",
        "standardize" => "per-column z-score of a 2-D matrix",
        "passthrough" => "return the input unchanged",
        _ => return None,
    })
}

/// Looks up a builtin routine by name.
pub fn lookup(name: &str) -> Option<NativeRoutine> {
    let routine = match name {
        "add_one" => NativeRoutine::new(name, add_one),
        "square" => NativeRoutine::new(name, square),
        "normalize_max" => NativeRoutine::new(name, normalize_max),
        "standardize" => NativeRoutine::new(name, standardize),
        "passthrough" => NativeRoutine::new(name, passthrough),
        _ => return None,
    };
    Some(routine)
}

fn add_one(input: &Payload, diagnostics: &Diagnostics) -> Result<Payload, ExecError> {
    let output = input.map_scalars(&|x| match x {
        Payload::Int(i) => i
            .checked_add(1)
            .map(Payload::Int)
            .unwrap_or(Payload::Float(*i as f64 + 1.0)),
        Payload::Float(f) => Payload::Float(f + 1.0),
        seq => seq.clone(),
    });
    diagnostics.emit(&format!("Processed features: {}", output));
    Ok(output)
}

fn square(input: &Payload, _diagnostics: &Diagnostics) -> Result<Payload, ExecError> {
    Ok(input.map_scalars(&|x| match x {
        Payload::Int(i) => i
            .checked_mul(*i)
            .map(Payload::Int)
            .unwrap_or(Payload::Float((*i as f64).powi(2))),
        Payload::Float(f) => Payload::Float(f * f),
        seq => seq.clone(),
    }))
}

fn normalize_max(input: &Payload, diagnostics: &Diagnostics) -> Result<Payload, ExecError> {
    let values = input
        .to_f64_vec()
        .ok_or_else(|| ExecError::binding("normalize_max expects a flat sequence of numbers"))?;

    let max = values.iter().cloned().fold(f64::NAN, f64::max);
    if max == 0.0 || max.is_nan() {
        diagnostics.emit("Normalization skipped: max value is zero or NaN");
        return Ok(input.clone());
    }
    Ok(Payload::from(
        values.iter().map(|x| x / max).collect::<Vec<f64>>(),
    ))
}

fn standardize(input: &Payload, diagnostics: &Diagnostics) -> Result<Payload, ExecError> {
    if input.is_empty_seq() {
        return Ok(Payload::empty());
    }
    let rows = input
        .to_rows()
        .ok_or_else(|| ExecError::binding("standardize expects a 2-D matrix of numbers"))?;
    if let Some(bad) = rows.iter().position(|row| row.len() != rows[0].len()) {
        return Err(ExecError::binding(format!(
            "standardize expects rectangular rows; row {} has {} columns, expected {}",
            bad,
            rows[bad].len(),
            rows[0].len()
        )));
    }

    let mean = column_means(&rows);
    let std: Vec<f64> = column_stds(&rows)
        .into_iter()
        .map(|s| if s == 0.0 { STD_FLOOR } else { s })
        .collect();
    diagnostics.emit(&format!(
        "std: {}, mean: {}",
        Payload::from(std.clone()),
        Payload::from(mean.clone())
    ));

    let output: Vec<Vec<f64>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(col, x)| (x - mean[col]) / std[col])
                .collect()
        })
        .collect();
    Ok(Payload::from(output))
}

fn passthrough(input: &Payload, _diagnostics: &Diagnostics) -> Result<Payload, ExecError> {
    Ok(input.clone())
}
