//! Integration tests for the `run` command.
use float_cmp::assert_approx_eq;
use scuc::cli::{RunOpts, handle_run_command};
use scuc::settings::Settings;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the input document for the two-bus example.
fn get_input_path() -> PathBuf {
    PathBuf::from("demos/two_bus/input.json")
}

/// An integration test for the `run` command.
#[test]
fn test_handle_run_command() {
    unsafe { std::env::set_var("SCUC_LOG_LEVEL", "off") };

    {
        // Save results to non-existent directory to check that directory creation works
        let tempdir = tempdir().unwrap();
        let output_dir = tempdir.path().join("results");
        let opts = RunOpts {
            output_dir: Some(output_dir.clone()),
            ..RunOpts::default()
        };
        let report =
            handle_run_command(&get_input_path(), &opts, Some(Settings::default())).unwrap();

        assert_approx_eq!(f64, report.objective_value, 501_000.0, epsilon = 1e-3);
        assert!(output_dir.join("solution.json").is_file());
        assert!(output_dir.join("dispatch.csv").is_file());
        assert!(output_dir.join("scuc_info.log").is_file());

        let dispatch = fs::read_to_string(output_dir.join("dispatch.csv")).unwrap();
        assert_eq!(dispatch.lines().count(), 2); // header plus one generator-hour
    }

    // Second time will fail because the logging is already initialised
    let opts = RunOpts {
        output_dir: Some(tempdir().unwrap().path().to_path_buf()),
        ..RunOpts::default()
    };
    assert_eq!(
        handle_run_command(&get_input_path(), &opts, Some(Settings::default()))
            .unwrap_err()
            .chain()
            .next()
            .unwrap()
            .to_string(),
        "Failed to initialise logging."
    );
}
