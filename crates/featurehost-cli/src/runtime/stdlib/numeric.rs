//! Numeric helpers for feature routines.
//!
//! Scripts get `sqrt`, `sum`, `mean`, `stdev`, `transpose`, `column_mean`
//! and `column_stdev`. The plain Rust functions at the top of this file are
//! shared with the native builtins so both paths compute the same numbers.

use starlark::environment::GlobalsBuilder;
use starlark::starlark_module;
use starlark::values::list::{AllocList, ListRef};
use starlark::values::tuple::TupleRef;
use starlark::values::{Heap, UnpackValue, Value};

/// Arithmetic mean. Returns `None` for an empty slice.
pub fn mean_of(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation. Returns `None` for an empty slice.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let mean = mean_of(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Swaps rows and columns of a rectangular matrix.
pub fn transpose_rows(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let width = rows.first().map_or(0, Vec::len);
    (0..width)
        .map(|col| rows.iter().map(|row| row[col]).collect())
        .collect()
}

/// Per-column means of a rectangular matrix.
pub fn column_means(rows: &[Vec<f64>]) -> Vec<f64> {
    transpose_rows(rows)
        .iter()
        .map(|column| mean_of(column).unwrap_or(0.0))
        .collect()
}

/// Per-column population standard deviations of a rectangular matrix.
pub fn column_stds(rows: &[Vec<f64>]) -> Vec<f64> {
    transpose_rows(rows)
        .iter()
        .map(|column| population_std(column).unwrap_or(0.0))
        .collect()
}

fn extract_float(value: Value, function: &str, param: &str) -> anyhow::Result<f64> {
    let number = match value.get_type() {
        "int" => i64::unpack_value(value).map(|i| i as f64),
        "float" => f64::unpack_value(value),
        _ => None,
    };
    number.ok_or_else(|| {
        anyhow::anyhow!(
            "{}(): '{}' expected a number, got {}",
            function,
            param,
            value.get_type()
        )
    })
}

fn sequence_items<'v>(value: Value<'v>) -> Option<Vec<Value<'v>>> {
    if let Some(list) = ListRef::from_value(value) {
        return Some(list.iter().collect());
    }
    TupleRef::from_value(value).map(|tuple| tuple.content().to_vec())
}

fn extract_floats(value: Value, function: &str, param: &str) -> anyhow::Result<Vec<f64>> {
    let items = sequence_items(value).ok_or_else(|| {
        anyhow::anyhow!(
            "{}(): '{}' expected a list of numbers, got {}",
            function,
            param,
            value.get_type()
        )
    })?;
    items
        .into_iter()
        .map(|item| extract_float(item, function, param))
        .collect()
}

fn extract_matrix(value: Value, function: &str, param: &str) -> anyhow::Result<Vec<Vec<f64>>> {
    let items = sequence_items(value).ok_or_else(|| {
        anyhow::anyhow!(
            "{}(): '{}' expected a list of rows, got {}",
            function,
            param,
            value.get_type()
        )
    })?;
    let rows = items
        .into_iter()
        .map(|row| extract_floats(row, function, param))
        .collect::<anyhow::Result<Vec<_>>>()?;
    if let Some(first) = rows.first() {
        if let Some(bad) = rows.iter().position(|row| row.len() != first.len()) {
            return Err(anyhow::anyhow!(
                "{}(): '{}' row {} has {} columns, expected {}",
                function,
                param,
                bad,
                rows[bad].len(),
                first.len()
            ));
        }
    }
    Ok(rows)
}

/// Registers numeric functions into a GlobalsBuilder.
pub fn register(builder: &mut GlobalsBuilder) {
    register_numeric_functions(builder);
}

#[starlark_module]
fn register_numeric_functions(builder: &mut GlobalsBuilder) {
    /// Square root of a non-negative number.
    fn sqrt<'v>(x: Value<'v>) -> anyhow::Result<f64> {
        let x = extract_float(x, "sqrt", "x")?;
        if x < 0.0 {
            return Err(anyhow::anyhow!("sqrt(): 'x' must be >= 0, got {}", x));
        }
        Ok(x.sqrt())
    }

    /// Sum of a list of numbers, as a float. `sum([])` is `0.0`.
    fn sum<'v>(values: Value<'v>) -> anyhow::Result<f64> {
        Ok(extract_floats(values, "sum", "values")?.iter().sum())
    }

    /// Arithmetic mean of a non-empty list of numbers.
    fn mean<'v>(values: Value<'v>) -> anyhow::Result<f64> {
        let values = extract_floats(values, "mean", "values")?;
        mean_of(&values).ok_or_else(|| anyhow::anyhow!("mean(): 'values' must not be empty"))
    }

    /// Population standard deviation of a non-empty list of numbers.
    fn stdev<'v>(values: Value<'v>) -> anyhow::Result<f64> {
        let values = extract_floats(values, "stdev", "values")?;
        population_std(&values)
            .ok_or_else(|| anyhow::anyhow!("stdev(): 'values' must not be empty"))
    }

    /// Transposes a rectangular list of rows.
    ///
    /// # Example
    /// ```starlark
    /// transpose([[1, 2], [3, 4]])  # [[1.0, 3.0], [2.0, 4.0]]
    /// ```
    fn transpose<'v>(rows: Value<'v>, heap: &'v Heap) -> anyhow::Result<Value<'v>> {
        let rows = extract_matrix(rows, "transpose", "rows")?;
        let columns: Vec<Value<'v>> = transpose_rows(&rows)
            .into_iter()
            .map(|column| heap.alloc(AllocList(column)))
            .collect();
        Ok(heap.alloc(AllocList(columns)))
    }

    /// Per-column means of a rectangular list of rows.
    fn column_mean<'v>(rows: Value<'v>, heap: &'v Heap) -> anyhow::Result<Value<'v>> {
        let rows = extract_matrix(rows, "column_mean", "rows")?;
        if rows.is_empty() {
            return Err(anyhow::anyhow!("column_mean(): 'rows' must not be empty"));
        }
        Ok(heap.alloc(AllocList(column_means(&rows))))
    }

    /// Per-column population standard deviations of a rectangular list of rows.
    fn column_stdev<'v>(rows: Value<'v>, heap: &'v Heap) -> anyhow::Result<Value<'v>> {
        let rows = extract_matrix(rows, "column_stdev", "rows")?;
        if rows.is_empty() {
            return Err(anyhow::anyhow!("column_stdev(): 'rows' must not be empty"));
        }
        Ok(heap.alloc(AllocList(column_stds(&rows))))
    }
}
