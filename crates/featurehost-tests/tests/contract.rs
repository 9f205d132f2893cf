//! End-to-end tests for the host/routine data-exchange contract.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p featurehost-tests --test contract
//! ```

use featurehost_cli::diagnostics::Diagnostics;
use featurehost_cli::host::Host;
use featurehost_cli::routine::{builtins, NativeRoutine, Routine, ScriptRoutine};
use featurehost_cli::runtime::{ExecError, RuntimeConfig};
use featurehost_payload::{FaultCode, Payload, ShapePolicy};
use featurehost_tests::{assert_idempotent, RoutineFixture};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn script(source: &str) -> Arc<ScriptRoutine> {
    Arc::new(ScriptRoutine::from_source("routine", source, &RuntimeConfig::default()).unwrap())
}

const ADD_ONE: &str = r#"
output_data = [x + 1 for x in input_data]
print("Processed features: " + str(output_data))
"#;

// ============================================================================
// Binding and extraction
// ============================================================================

#[test]
fn output_is_the_routine_applied_to_input() {
    let routine = script("output_data = [x * x - 1 for x in input_data]");
    let result = Host::new().invoke(&routine, Some(Payload::from(vec![1i64, 2, 3])));
    assert!(result.success);
    assert_eq!(result.output, Some(Payload::from(vec![0i64, 3, 8])));
}

#[test]
fn add_one_scenario() {
    let input = Payload::from(vec![1i64, 2, 3, 4, 5]);
    let result = Host::new().invoke(&script(ADD_ONE), Some(input));
    assert!(result.success);
    assert_eq!(result.output, Some(Payload::from(vec![2i64, 3, 4, 5, 6])));
    assert!(result
        .diagnostics
        .contains("Processed features: [2, 3, 4, 5, 6]"));
}

#[test]
fn empty_default_input() {
    let result = Host::new().invoke(&script(ADD_ONE), None);
    assert!(result.success);
    assert_eq!(result.output, Some(Payload::empty()));
}

#[test]
fn only_top_level_output_is_read() {
    let source = r#"
def compute():
    output_data = [1]
    return output_data

result = compute()
"#;
    let result = Host::new().invoke(&script(source), None);
    assert_eq!(result.fault_code(), Some(FaultCode::OutputMissing));
    assert!(result.output.is_none());
}

#[test]
fn mutating_input_faults_and_host_payload_is_untouched() {
    let input = Payload::from(vec![1i64, 2, 3]);
    let routine = script("input_data[0] = 100\noutput_data = input_data");
    let result = Host::new().invoke(&routine, Some(input.clone()));

    assert_eq!(result.fault_code(), Some(FaultCode::RoutineFault));
    assert_eq!(input, Payload::from(vec![1i64, 2, 3]));
}

#[test]
fn non_numeric_output_is_conversion_fault() {
    let result = Host::new().invoke(&script("output_data = [\"a\", \"b\"]"), None);
    assert_eq!(result.fault_code(), Some(FaultCode::OutputConversion));
    assert!(result.fault.unwrap().message.contains("output_data[0]"));
}

#[test]
fn precise_floats_pass_through_unchanged() {
    let input = Payload::from(vec![1234567.891, 1.2345678e-7, 0.000123456789, -98765.4321]);
    let result = Host::new().invoke(&script("output_data = input_data"), Some(input.clone()));
    assert!(result.success, "{:?}", result.fault);
    assert_eq!(result.output, Some(input));
}

#[test]
fn non_finite_output_is_conversion_fault() {
    for source in [
        "output_data = [1.0, float(\"inf\")]",
        "output_data = [1.0, float(\"nan\")]",
        "output_data = [1.0, -float(\"inf\")]",
    ] {
        let result = Host::new().invoke(&script(source), None);
        assert_eq!(result.fault_code(), Some(FaultCode::OutputConversion), "{}", source);
        assert!(result.output.is_none());
        let message = result.fault.unwrap().message;
        assert!(message.contains("output_data[1]"), "{}", message);
    }
}

#[test]
fn deeply_nested_output_is_conversion_fault() {
    let source = r#"
x = []
for i in range(100000):
    x = [x]
output_data = x
"#;
    let result = Host::new().invoke(&script(source), None);
    assert_eq!(result.fault_code(), Some(FaultCode::OutputConversion));
    assert!(result.output.is_none());
    assert!(result.fault.unwrap().message.contains("nests deeper than"));
}

// ============================================================================
// Diagnostics capture
// ============================================================================

#[test]
fn diagnostics_are_ordered_lines() {
    let routine = script("print(\"A\")\noutput_data = []\nprint(\"B\")");
    let result = Host::new().invoke(&routine, None);
    assert_eq!(result.diagnostics, "A\nB\n");
    assert_eq!(result.diagnostic_lines().collect::<Vec<_>>(), vec!["A", "B"]);
}

#[test]
fn diagnostics_survive_a_fault() {
    let routine = script("print(\"step 1\")\nprint(\"step 2\")\noutput_data = 1 // 0");
    let result = Host::new().invoke(&routine, None);
    assert!(!result.success);
    assert_eq!(result.diagnostics, "step 1\nstep 2\n");
}

#[test]
fn diagnostics_do_not_leak_between_invocations() {
    let host = Host::new();
    let routine = script(ADD_ONE);
    let first = host.invoke(&routine, Some(Payload::from(vec![1i64])));
    let second = host.invoke(&routine, Some(Payload::from(vec![5i64])));
    assert_eq!(first.diagnostics, "Processed features: [2]\n");
    assert_eq!(second.diagnostics, "Processed features: [6]\n");
}

#[test]
fn concurrent_invocations_keep_separate_diagnostics() {
    let host = Arc::new(Host::new());
    let routine = script(ADD_ONE);

    let handles: Vec<_> = (0..8i64)
        .map(|i| {
            let host = Arc::clone(&host);
            let routine = Arc::clone(&routine);
            thread::spawn(move || host.invoke(&routine, Some(Payload::from(vec![i]))))
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.join().unwrap();
        assert_eq!(
            result.diagnostics,
            format!("Processed features: [{}]\n", i + 1)
        );
    }
}

// ============================================================================
// Faults
// ============================================================================

#[test]
fn division_by_zero_is_reported_not_raised() {
    let routine = script("output_data = [x / 0 for x in input_data]");
    let result = Host::new().invoke(&routine, Some(Payload::from(vec![1i64])));
    assert!(!result.success);
    assert!(result.output.is_none());
    let fault = result.fault.unwrap();
    assert_eq!(fault.kind, FaultCode::RoutineFault);
    assert_eq!(fault.code, "R002");
}

#[test]
fn syntax_errors_surface_at_load() {
    let err = ScriptRoutine::from_source("bad", "output_data = [x for x in]", &RuntimeConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, ExecError::Syntax { .. }));
}

#[test]
fn timeout_is_reported_with_diagnostics() {
    let routine = Arc::new(NativeRoutine::new("slow", |input, diagnostics| {
        diagnostics.emit("warming up");
        thread::sleep(Duration::from_millis(300));
        Ok(input.clone())
    }));
    let host = Host::new().with_timeout(Some(Duration::from_millis(30)));
    let result = host.invoke(&routine, None);

    assert_eq!(result.fault_code(), Some(FaultCode::Timeout));
    assert_eq!(result.diagnostics, "warming up\n");
}

#[test]
fn shape_policy_same_rejects_reshaping() {
    let routine = script("output_data = [sum(input_data)]");
    let host = Host::new().with_shape_policy(ShapePolicy::Same);
    let result = host.invoke(&routine, Some(Payload::from(vec![1i64, 2, 3])));
    assert_eq!(result.fault_code(), Some(FaultCode::ShapeMismatch));
    assert!(result.fault.unwrap().message.contains("[1]"));
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn stateless_script_is_idempotent() {
    assert_idempotent(
        &Host::new(),
        &script(ADD_ONE),
        Some(Payload::from(vec![1i64, 2, 3])),
        5,
    );
}

#[test]
fn builtins_are_idempotent() {
    let host = Host::new();
    let input = Payload::from(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    for name in builtins::BUILTIN_NAMES {
        let routine = Arc::new(builtins::lookup(name).unwrap());
        assert_idempotent(&host, &routine, Some(input.clone()), 3);
    }
}

// ============================================================================
// Column standardization
// ============================================================================

fn column(rows: &[Vec<f64>], c: usize) -> Vec<f64> {
    rows.iter().map(|row| row[c]).collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

fn standardize_script() -> (RoutineFixture, Arc<ScriptRoutine>) {
    let fixture = RoutineFixture::new();
    fixture.write(
        "lib/stats.star",
        r#"
def standardize_columns(rows):
    means = column_mean(rows)
    stds = [s if s != 0 else 1e-8 for s in column_stdev(rows)]
    print("std: " + str(stds) + ", mean: " + str(means))
    return [[(row[c] - means[c]) / stds[c] for c in range(len(row))] for row in rows]
"#,
    );
    let routine = fixture.load(
        "standardize",
        "load(\"lib/stats.star\", \"standardize_columns\")\noutput_data = standardize_columns(input_data)\n",
    );
    (fixture, routine)
}

#[test]
fn column_standardization_scenario() {
    let input = Payload::from(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    let (_fixture, scripted) = standardize_script();
    for routine in [
        scripted as Arc<dyn Routine>,
        Arc::new(builtins::lookup("standardize").unwrap()) as Arc<dyn Routine>,
    ] {
        let result = Host::new().invoke(&routine, Some(input.clone()));
        assert!(result.success, "{}: {:?}", routine.name(), result.fault);

        let rows = result.output.unwrap().to_rows().unwrap();
        for c in 0..2 {
            let col = column(&rows, c);
            assert!(mean(&col).abs() < 1e-9, "{} column {} mean", routine.name(), c);
            assert!((population_std(&col) - 1.0).abs() < 1e-9, "{} column {} std", routine.name(), c);
        }
        assert!(result.diagnostics.starts_with("std: "));
    }
}

#[test]
fn constant_column_uses_std_floor() {
    let input = Payload::from(vec![vec![7.0, 1.0], vec![7.0, 2.0]]);
    let (_fixture, routine) = standardize_script();
    let result = Host::new().invoke(&routine, Some(input));
    assert!(result.diagnostics.starts_with("std: ["));

    let rows = result.output.unwrap().to_rows().unwrap();
    assert_eq!(column(&rows, 0), vec![0.0, 0.0]);
    assert!(column(&rows, 1).iter().all(|v| v.is_finite()));
}

// ============================================================================
// Script and native agreement
// ============================================================================

#[test]
fn script_and_native_agree() {
    let cases: &[(&str, &str, Payload)] = &[
        ("add_one", ADD_ONE, Payload::from(vec![1i64, 2, 3])),
        (
            "square",
            "output_data = [x * x for x in input_data]",
            Payload::from(vec![1.5, -2.0, 3.0]),
        ),
        (
            "normalize_max",
            "output_data = [x / max(input_data) for x in input_data]",
            Payload::from(vec![1.0, 2.0, 4.0]),
        ),
        ("passthrough", "output_data = input_data", Payload::from(vec![vec![1.0], vec![2.0]])),
    ];

    let host = Host::new();
    for (name, source, input) in cases {
        let native = Arc::new(builtins::lookup(name).unwrap());
        let scripted = script(source);

        let a = host.invoke(&native, Some(input.clone())).output.unwrap();
        let b = host.invoke(&scripted, Some(input.clone())).output.unwrap();
        assert!(a.approx_eq(&b, 1e-12), "{}: native {} vs script {}", name, a, b);
    }
}

#[test]
fn add_one_diagnostics_match_between_implementations() {
    let input = Payload::from(vec![1i64, 2, 3, 4, 5]);
    let native = builtins::lookup("add_one").unwrap();
    let sink = Diagnostics::new();
    native.invoke(&input, &sink).unwrap();

    let scripted = Host::new().invoke(&script(ADD_ONE), Some(input));
    assert_eq!(sink.contents(), scripted.diagnostics);
}
