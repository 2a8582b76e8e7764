mod common;

use clap::Parser;
use common::FakeScanner;
use nessus_ops::cli::{run_session, Cli, Commands};
use nessus_ops::errors::OpsError;

fn command(args: &[&str]) -> Commands {
    let mut argv = vec!["nessus-configure", "-H", "scanner", "-U", "admin"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap().command
}

fn scanner() -> FakeScanner {
    FakeScanner::new()
        .with_folder(3, "Audits")
        .with_scan(1, "Weekly", "completed", 3)
}

#[tokio::test]
async fn test_successful_command_logs_out() {
    let api = scanner();

    run_session(&api, &command(&["exec", "-s", "Weekly"]), None).await.unwrap();

    let state = api.state();
    assert_eq!(state.launched, vec![1]);
    assert!(state.logged_out);
}

#[tokio::test]
async fn test_failed_command_still_logs_out() {
    let api = scanner();

    let result = run_session(&api, &command(&["exec", "-s", "Missing"]), None).await;

    assert!(matches!(result, Err(OpsError::Config(_))));
    let state = api.state();
    assert!(state.launched.is_empty());
    assert!(state.logged_out);
}

#[tokio::test]
async fn test_export_into_a_file_still_logs_out() {
    let dir = tempfile::tempdir().unwrap();
    let outdir = dir.path().join("exports");
    std::fs::write(&outdir, "not a directory").unwrap();
    let api = scanner();
    let outdir_arg = outdir.display().to_string();

    let result = run_session(&api, &command(&["export", "-o", &outdir_arg]), None).await;

    assert!(matches!(result, Err(OpsError::Export(_))));
    let state = api.state();
    assert!(state.exports.is_empty());
    assert!(state.logged_out);
}

#[tokio::test]
async fn test_logout_failure_keeps_command_result() {
    let api = scanner();
    api.state().fail_logout = true;

    run_session(&api, &command(&["exec", "-s", "Weekly"]), None).await.unwrap();
    let result = run_session(&api, &command(&["exec", "-s", "Missing"]), None).await;

    assert!(matches!(result, Err(OpsError::Config(_))));
    assert!(!api.state().logged_out);
}
