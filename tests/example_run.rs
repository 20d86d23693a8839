//! Integration tests for the `example run` command.
use scuc::cli::RunOpts;
use scuc::cli::example::handle_example_run_command;
use scuc::settings::Settings;
use tempfile::tempdir;

/// An integration test for the `example run` command.
#[test]
fn test_handle_example_run_command() {
    unsafe { std::env::set_var("SCUC_LOG_LEVEL", "off") };

    let dir = tempdir().unwrap();
    let opts = RunOpts {
        output_dir: Some(dir.path().join("simple")),
        ..RunOpts::default()
    };
    handle_example_run_command("simple", &opts, Some(Settings::default())).unwrap();
    assert!(dir.path().join("simple").join("solution.json").is_file());
}
