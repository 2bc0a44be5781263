// Integration tests for the offline board commands.
// Run with: cargo test -p harada-cli --test board_commands

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

struct Sandbox {
    config: TempDir,
    store: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            config: TempDir::new().unwrap(),
            store: TempDir::new().unwrap(),
        }
    }

    fn with_settings(json: &str) -> Self {
        let sandbox = Self::new();
        std::fs::write(sandbox.config.path().join("settings.json"), json).unwrap();
        sandbox
    }

    fn harada(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_harada"));
        cmd.env("HARADA_CONFIG_DIR", self.config.path());
        cmd.env("HARADA_STORE_DIR", self.store.path());
        // Keep real credentials and log settings out of tests
        cmd.env_remove("HARADA_OPENAI_KEY");
        cmd.env_remove("HARADA_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.harada().args(args).output().expect("failed to run harada")
    }

    fn run_with_stdin(&self, args: &[&str], stdin: &str) -> Output {
        let mut child = self
            .harada()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to run harada");
        child.stdin.take().unwrap().write_all(stdin.as_bytes()).unwrap();
        child.wait_with_output().unwrap()
    }

    fn store_path(&self, name: &str) -> std::path::PathBuf {
        self.store.path().join(name)
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_exit(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "expected exit {}, got {:?}\nstdout: {}\nstderr: {}",
        code,
        output.status.code(),
        stdout(output),
        stderr(output),
    );
}

fn board_record(dir: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(dir.join("harada.board.v1")).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn set_then_get_survives_restart() {
    let sandbox = Sandbox::new();
    assert_exit(&sandbox.run(&["set", "goal", "Run a marathon"]), 0);

    let output = sandbox.run(&["get", "goal"]);
    assert_exit(&output, 0);
    assert_eq!(stdout(&output).trim_end(), "Run a marathon");

    let record = board_record(sandbox.store.path());
    assert_eq!(record["goal"], "Run a marathon");
    assert_eq!(record.as_object().unwrap().len(), 73);
}

#[test]
fn unknown_cell_exits_3_and_writes_nothing() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["set", "r5c5", "inside the goal block"]);
    assert_exit(&output, 3);
    assert!(stderr(&output).contains("Unknown cell 'r5c5'"));
    assert!(!sandbox.store_path("harada.board.v1").exists());

    assert_exit(&sandbox.run(&["get", "r10c1"]), 3);
}

#[test]
fn show_draws_values() {
    let sandbox = Sandbox::new();
    sandbox.run(&["set", "r2c2", "Fitness"]);
    let output = sandbox.run(&["show", "--select", "r2c2"]);
    assert_exit(&output, 0);
    let text = stdout(&output);
    assert!(text.contains("*Fitness"), "{}", text);
    assert_eq!(text.lines().count(), 19);

    let output = sandbox.run(&["show", "--json"]);
    let values: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(values["r2c2"], "Fitness");
    assert_eq!(values["goal"], "");
}

#[test]
fn select_describes_cell() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["select", "r5c2"]);
    assert_exit(&output, 0);
    let text = stdout(&output);
    assert!(text.starts_with("r5c2  Goal attribute  (row 5, col 2)"), "{}", text);
    assert!(text.contains("goal attribute cell"));
}

#[test]
fn reset_clears_board_and_reset_all_forgets_onboarding() {
    let sandbox = Sandbox::new();
    sandbox.run(&["set", "r1c1", "Stretch"]);
    assert_exit(&sandbox.run_with_stdin(&["onboard"], "y\ny\n"), 0);

    assert_exit(&sandbox.run(&["reset"]), 0);
    assert_eq!(stdout(&sandbox.run(&["get", "r1c1"])).trim_end(), "");
    assert!(sandbox.store_path("harada.newUser").exists());

    sandbox.run(&["set", "r1c1", "Stretch"]);
    assert_exit(&sandbox.run(&["reset-all"]), 0);
    assert!(!sandbox.store_path("harada.board.v1").exists());
    assert!(!sandbox.store_path("harada.newUser").exists());
}

#[test]
fn onboard_marks_returning_user() {
    let sandbox = Sandbox::new();
    let output = sandbox.run_with_stdin(&["onboard"], "maybe\nyes\nno\n");
    assert_exit(&output, 0);
    let text = stdout(&output);
    assert!(text.contains("Are you already familiar with the Harada Method?"));
    assert!(text.contains("Please answer yes or no."));
    assert_eq!(
        std::fs::read_to_string(sandbox.store_path("harada.newUser")).unwrap(),
        "false"
    );

    let output = sandbox.run(&["onboard"]);
    assert_exit(&output, 0);
    assert!(stdout(&output).contains("already completed"));
}

#[test]
fn onboard_incomplete_exits_7() {
    let sandbox = Sandbox::new();
    let output = sandbox.run_with_stdin(&["onboard"], "yes\n");
    assert_exit(&output, 7);
    assert!(!sandbox.store_path("harada.newUser").exists());
}

#[test]
fn prompt_includes_role_and_text() {
    let sandbox = Sandbox::new();
    sandbox.run(&["set", "goal", "Write a novel"]);
    let output = sandbox.run(&["prompt", "goal", "make", "it", "measurable"]);
    assert_exit(&output, 0);
    let text = stdout(&output);
    assert!(text.contains("the main goal cell"));
    assert!(text.contains("Write a novel"));
    assert!(text.contains("make it measurable"));
}

#[test]
fn prompt_rejects_blank_question() {
    let sandbox = Sandbox::new();
    assert_exit(&sandbox.run(&["prompt", "goal", "   "]), 4);
}

#[test]
fn assist_disabled_exits_10() {
    let sandbox = Sandbox::new();
    sandbox.run(&["set", "r3c3", "Eat well"]);
    let output = sandbox.run(&["assist", "r3c3", "ideas"]);
    assert_exit(&output, 10);
    assert_eq!(stdout(&sandbox.run(&["get", "r3c3"])).trim_end(), "Eat well");
}

#[test]
fn doctor_reports_disabled() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["doctor", "--json"]);
    assert_exit(&output, 10);
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["status"], "disabled");
    assert_eq!(report["provider"], "none");
}

#[test]
fn snapshot_lists_whole_catalog() {
    let sandbox = Sandbox::new();
    sandbox.run(&["set", "goal", "Learn piano"]);
    let output = sandbox.run(&["snapshot"]);
    assert_exit(&output, 0);
    let body: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(body["type"], "board");
    assert_eq!(body["cells"].as_array().unwrap().len(), 73);
    assert_eq!(body["values"]["goal"], "Learn piano");
}

#[test]
fn export_without_service_exits_20() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["export"]);
    assert_exit(&output, 20);
    assert!(stderr(&output).contains("service.baseUrl"));
}

#[test]
fn corrupt_record_starts_from_defaults() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.store_path("harada.board.v1"), "{not json").unwrap();
    let output = sandbox.run(&["get", "goal"]);
    assert_exit(&output, 0);
    assert_eq!(stdout(&output).trim_end(), "");
    assert!(stderr(&output).contains("warning: saved board not loaded"));
}

#[test]
fn sqlite_backend_persists() {
    let sandbox = Sandbox::with_settings(r#"{ "storage.backend": "sqlite" }"#);
    assert_exit(&sandbox.run(&["set", "r9c9", "Sleep by 11"]), 0);
    assert!(sandbox.store_path("board.db").exists());
    assert!(!sandbox.store_path("harada.board.v1").exists());
    assert_eq!(stdout(&sandbox.run(&["get", "r9c9"])).trim_end(), "Sleep by 11");
}

#[test]
fn status_json() {
    let sandbox = Sandbox::new();
    sandbox.run(&["set", "r1c2", "Jog"]);
    let output = sandbox.run(&["status", "--json"]);
    assert_exit(&output, 0);
    let status: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(status["filled"], 1);
    assert_eq!(status["cells"], 73);
    assert_eq!(status["onboarded"], false);
    assert_eq!(status["backend"], "files");
}

#[test]
fn repl_keeps_selection_between_lines() {
    let sandbox = Sandbox::new();
    let output = sandbox.run_with_stdin(
        &["repl", "--width", "8"],
        "select goal\nset goal Win the cup\nget\nshow\nquit\n",
    );
    assert_exit(&output, 0);
    let text = stdout(&output);
    assert!(text.contains("harada [goal]> "));
    assert!(text.contains("*Win the cup"));
    assert_eq!(stdout(&sandbox.run(&["get", "goal"])).trim_end(), "Win the cup");
}

#[test]
fn edits_fail_when_store_cannot_open() {
    let sandbox = Sandbox::new();
    let blocker = sandbox.store_path("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let store_dir = blocker.join("store");

    let run = |args: &[&str]| {
        sandbox
            .harada()
            .env("HARADA_STORE_DIR", &store_dir)
            .args(args)
            .output()
            .expect("failed to run harada")
    };

    let output = run(&["set", "goal", "Run a marathon"]);
    assert_exit(&output, 5);
    assert!(stderr(&output).contains("nothing was changed"), "{}", stderr(&output));
    assert_exit(&run(&["reset"]), 5);
    assert_exit(&run(&["reset-all"]), 5);

    // Viewing still works on an empty board
    let output = run(&["get", "goal"]);
    assert_exit(&output, 0);
    assert_eq!(stdout(&output).trim_end(), "");
    assert_eq!(stderr(&output).matches("store unavailable").count(), 1);
}
