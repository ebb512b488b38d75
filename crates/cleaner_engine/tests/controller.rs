mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cleaner_core::{RunConfig, RunEnd, RunPlan, RunState, StartError};
use cleaner_engine::{load_table, ProgressEvent, RunController};
use common::{init_logging, ScriptedClient, TEMPLATE};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const INPUT: &str = "宝贝名,价格\nitem-0,10\nitem-1,20\nitem-2,30\n";

fn plan(input: &Path, output: &Path) -> RunPlan {
    let mut config = RunConfig::new("sk-test", TEMPLATE);
    config.batch_size = 2;
    config.max_workers = 2;
    RunPlan::prepare(Some(input.to_path_buf()), Some(output.to_path_buf()), config).unwrap()
}

/// Drain events until the run ends, returning every status line seen.
fn wait_for_end(controller: &RunController) -> (RunEnd, Vec<String>) {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut statuses = Vec::new();
    while Instant::now() < deadline {
        match controller.recv_timeout(Duration::from_millis(50)) {
            Some(ProgressEvent::Status(line)) => statuses.push(line),
            Some(ProgressEvent::RunEnded(end)) => {
                controller.wait();
                return (end, statuses);
            }
            Some(ProgressEvent::Progress(_)) | None => {}
        }
    }
    panic!("run did not end; statuses so far: {statuses:?}");
}

#[test]
fn run_writes_extracted_columns_to_output() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in.csv");
    let output = temp.path().join("out").join("cleaned.csv");
    fs::write(&input, INPUT).unwrap();

    let controller = RunController::new(Arc::new(ScriptedClient::filling()));
    controller.start(plan(&input, &output)).unwrap();
    let (end, statuses) = wait_for_end(&controller);

    let RunEnd::Completed(summary) = end else {
        panic!("expected completion, got {end:?}");
    };
    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.output, output);
    assert!(statuses.contains(&"Loaded 3 rows".to_string()));
    assert_eq!(controller.state(), RunState::Idle);

    let table = load_table(&output).unwrap();
    assert_eq!(table.headers(), vec!["宝贝名", "价格", "规格", "功效"]);
    assert_eq!(table.cell(2, "规格"), Some("2ml"));
    assert_eq!(table.cell(0, "功效"), Some("effect-0"));
    // The input is never modified.
    assert_eq!(fs::read_to_string(&input).unwrap(), INPUT);
}

#[test]
fn locked_output_refuses_to_start() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in.csv");
    let output = temp.path().join("out.csv");
    fs::write(&input, INPUT).unwrap();
    fs::write(temp.path().join("~$out.csv"), "").unwrap();

    let controller = RunController::new(Arc::new(ScriptedClient::filling()));
    let err = controller.start(plan(&input, &output)).unwrap_err();
    assert!(matches!(err, StartError::WriteLocked(_)));
    assert_eq!(controller.state(), RunState::Idle);
    assert!(!output.exists());
    assert!(controller.try_recv().is_none());
}

#[test]
fn unreadable_input_refuses_to_start() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let output_dir = temp.path().join("results");
    let output = output_dir.join("out.csv");

    let controller = RunController::new(Arc::new(ScriptedClient::filling()));
    let err = controller
        .start(plan(&temp.path().join("missing.csv"), &output))
        .unwrap_err();
    assert!(matches!(err, StartError::UnreadableInput(_)));
    assert_eq!(controller.state(), RunState::Idle);
    // The input is checked before anything on the output side is touched.
    assert!(!output_dir.exists());
}

#[test]
fn second_start_while_running_is_rejected() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in.csv");
    let output = temp.path().join("out.csv");
    fs::write(&input, INPUT).unwrap();

    let client = ScriptedClient::filling().with_delay(Duration::from_millis(200));
    let controller = RunController::new(Arc::new(client));
    controller.start(plan(&input, &output)).unwrap();
    assert_eq!(controller.state(), RunState::Running);

    let err = controller.start(plan(&input, &output)).unwrap_err();
    assert_eq!(err, StartError::AlreadyRunning);

    assert!(controller.stop_and_save());
    assert!(!controller.stop_no_save());
    let (end, _) = wait_for_end(&controller);
    assert_eq!(end, RunEnd::Stopped { saved: true });
    assert_eq!(controller.state(), RunState::Idle);
    assert!(output.exists());
}

#[test]
fn stop_requests_are_ignored_when_idle() {
    let controller = RunController::new(Arc::new(ScriptedClient::filling()));
    assert!(!controller.stop_no_save());
    assert!(!controller.stop_and_save());
    assert_eq!(controller.state(), RunState::Idle);
}

#[test]
fn controller_can_run_again_after_completion() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in.csv");
    let output = temp.path().join("out.csv");
    fs::write(&input, INPUT).unwrap();

    let controller = RunController::new(Arc::new(ScriptedClient::filling()));
    for _ in 0..2 {
        controller.start(plan(&input, &output)).unwrap();
        let (end, _) = wait_for_end(&controller);
        assert!(matches!(end, RunEnd::Completed(_)));
    }
}
