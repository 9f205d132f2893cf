//! Command-level tests against the bundled routines directory.

use featurehost_cli::commands::{self, InputArgs, RoutineArgs};
use featurehost_cli::routine::Routine;
use featurehost_payload::ShapePolicy;
use featurehost_tests::{bundled_routines_dir, RoutineFixture};
use std::process::ExitCode;

fn bundled(relative: &str) -> String {
    bundled_routines_dir()
        .join(relative)
        .to_string_lossy()
        .into_owned()
}

fn inline(json: &str) -> InputArgs {
    InputArgs {
        input: Some(json.to_string()),
        input_file: None,
    }
}

#[test]
fn run_bundled_script() {
    let args = RoutineArgs {
        script: Some(bundled("features.star")),
        ..RoutineArgs::default()
    };
    let code = commands::run::run(&args, &inline("[1, 2, 3, 4, 5]"), true).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
}

#[test]
fn run_from_bundled_config() {
    let args = RoutineArgs {
        config: Some(bundled("featurehost.json")),
        ..RoutineArgs::default()
    };
    let code = commands::run::run(&args, &inline("[[1.0, 2.0], [3.0, 4.0]]"), false).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
}

#[test]
fn flags_override_bundled_config() {
    let args = RoutineArgs {
        config: Some(bundled("featurehost.json")),
        builtin: Some("passthrough".to_string()),
        shape_policy: Some("any".to_string()),
        ..RoutineArgs::default()
    };
    let resolved = args.resolve().unwrap();
    assert_eq!(resolved.routine.name(), "passthrough");
    assert!(resolved.source_hash.is_none());
    assert_eq!(resolved.host.shape_policy(), ShapePolicy::Any);
    assert_eq!(resolved.host.timeout(), Some(std::time::Duration::from_secs(10)));
}

#[test]
fn run_reports_routine_fault_as_exit_code() {
    let fixture = RoutineFixture::new();
    let path = fixture.add_script("div", "output_data = [x / 0 for x in input_data]\n");
    let args = RoutineArgs {
        script: Some(path.to_string_lossy().into_owned()),
        ..RoutineArgs::default()
    };
    let code = commands::run::run(&args, &inline("[1]"), false).unwrap();
    assert_eq!(code, ExitCode::from(1));
}

#[test]
fn run_with_input_file() {
    let fixture = RoutineFixture::new();
    let input = fixture.write("input.json", "[1.5, 2.5]");
    let args = RoutineArgs {
        builtin: Some("square".to_string()),
        ..RoutineArgs::default()
    };
    let input = InputArgs {
        input: None,
        input_file: Some(input.to_string_lossy().into_owned()),
    };
    assert_eq!(commands::run::run(&args, &input, true).unwrap(), ExitCode::SUCCESS);
}

#[test]
fn run_unknown_builtin_is_err() {
    let args = RoutineArgs {
        builtin: Some("no_such_routine".to_string()),
        ..RoutineArgs::default()
    };
    let err = commands::run::run(&args, &InputArgs::default(), false).unwrap_err();
    assert!(err.to_string().contains("add_one"), "{}", err);
}

#[test]
fn batch_bundled_csv() {
    let args = RoutineArgs {
        script: Some(bundled("features.star")),
        ..RoutineArgs::default()
    };
    let code = commands::batch::run(&args, &bundled("data/features.csv"), true).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
}

#[test]
fn batch_bundled_jsonl_with_config() {
    let args = RoutineArgs {
        config: Some(bundled("featurehost.json")),
        ..RoutineArgs::default()
    };
    let code = commands::batch::run(&args, &bundled("data/matrices.jsonl"), false).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
}

#[test]
fn check_bundled_scripts() {
    for script in ["features.star", "normalize.star", "standardize.star"] {
        let args = RoutineArgs {
            script: Some(bundled(script)),
            ..RoutineArgs::default()
        };
        assert_eq!(
            commands::check::run(&args, true).unwrap(),
            ExitCode::SUCCESS,
            "{}",
            script
        );
    }
}

#[test]
fn bench_bundled_script_against_builtin() {
    let code = commands::bench::run(
        &bundled("features.star"),
        "add_one",
        &inline("[1, 2, 3]"),
        5,
        true,
    )
    .unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
}

#[test]
fn bench_reports_disagreement() {
    let code = commands::bench::run(
        &bundled("features.star"),
        "square",
        &inline("[1, 2, 3]"),
        2,
        false,
    )
    .unwrap();
    assert_eq!(code, ExitCode::from(1));
}

#[test]
fn builtins_command() {
    assert_eq!(commands::builtins::run(true).unwrap(), ExitCode::SUCCESS);
}
