use std::io::Write;

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env_remove("TASK_PLANNER_DB_PATH")
        .env_remove("TASK_PLANNER_WEEKLY_HOURS")
        .env("TASK_PLANNER_LOG_LEVEL", "warn");
    cmd
}

fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    cli().write_stdin(script.to_string()).assert()
}

#[test]
fn cli_lists_seeded_developers() {
    run_cli("devs\nquit\n")
        .success()
        .stdout(str_contains("dev5@example.com"))
        .stdout(str_contains("DEV3 Three"));
}

#[test]
fn cli_schedules_added_tasks() {
    run_cli("add-task 1 3 5 mock-one First task\nadd-task 2 8 2 mock-one Second task\nschedule\nload\nquit\n")
        .success()
        .stdout(str_contains("Task 1 created (externalId=1)."))
        .stdout(str_contains("Scheduled (weeks=1, work_days=5"))
        .stdout(str_contains("First task"))
        .stdout(str_contains("weeks_active"));
}

#[test]
fn cli_reports_validation_errors() {
    run_cli("add-task 1 42 5 mock-one Too hard\nquit\n")
        .success()
        .stdout(str_contains("difficulty 42 outside 1..=10"));
}

#[test]
fn cli_reports_unschedulable_tasks() {
    cli()
        .env("TASK_PLANNER_WEEKLY_HOURS", "1")
        .write_stdin("add-task 7 10 5 mock-one Heavy task\nschedule\nquit\n")
        .assert()
        .success()
        .stdout(str_contains("Unschedulable: week 1"));
}

#[test]
fn cli_imports_provider_payload_and_saves_schedule() {
    let mut payload = NamedTempFile::new().unwrap();
    payload
        .write_all(br#"[{"id": 1, "zorluk": 3, "sure": 5}, {"id": 2, "value": 4, "estimated_duration": 6}, {"id": 3}]"#)
        .unwrap();
    let out = NamedTempFile::new().unwrap();

    let script = format!(
        "import mock-one {}\ntasks\nschedule\nsave csv {}\nquit\n",
        payload.path().display(),
        out.path().display()
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("created=2, duplicates=0, rejected=1"))
        .stdout(str_contains("Schedule saved to"));

    let saved = std::fs::read_to_string(out.path()).unwrap();
    assert_eq!(saved.lines().count(), 3);
    assert!(saved.starts_with("week,developer_id"));
}

#[test]
fn cli_requires_schedule_before_show() {
    run_cli("show\nquit\n")
        .success()
        .stdout(str_contains("No schedule computed yet"));
}
