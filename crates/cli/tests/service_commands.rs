// Integration tests for `harada assist` and `harada export` against a mock service.
// Run with: cargo test -p harada-cli --test service_commands

use std::process::{Command, Output};

use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

struct Sandbox {
    config: TempDir,
    store: TempDir,
}

impl Sandbox {
    /// Sandbox whose settings point assist and export at `base_url`.
    fn for_service(base_url: &str) -> Self {
        let sandbox = Self {
            config: TempDir::new().unwrap(),
            store: TempDir::new().unwrap(),
        };
        let settings = json!({
            "service.baseUrl": base_url,
            "export.defaultFilename": "fallback.pdf",
            "assist": { "provider": "service" }
        });
        std::fs::write(
            sandbox.config.path().join("settings.json"),
            serde_json::to_string_pretty(&settings).unwrap(),
        )
        .unwrap();
        sandbox
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_harada"))
            .args(args)
            .env("HARADA_CONFIG_DIR", self.config.path())
            .env("HARADA_STORE_DIR", self.store.path())
            .env_remove("HARADA_LOG")
            .output()
            .expect("failed to run harada")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn assert_exit(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "expected exit {}, got {:?}\nstderr: {}",
        code,
        output.status.code(),
        String::from_utf8_lossy(&output.stderr),
    );
}

#[test]
fn assist_writes_suggestion() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/recommendations").json_body(json!({
            "type": "cell-help",
            "helpQuestion": "make it measurable",
            "cellVariant": "section",
            "existingContent": "Fast",
            "cellId": "r2c2"
        }));
        then.status(200)
            .json_body(json!({ "recommendation": "Run 5k in under 25 minutes" }));
    });

    let sandbox = Sandbox::for_service(&server.base_url());
    sandbox.run(&["set", "r2c2", "Fast"]);
    let output = sandbox.run(&["assist", "r2c2", "make", "it", "measurable"]);
    assert_exit(&output, 0);
    mock.assert();
    assert_eq!(stdout(&output).trim_end(), "Run 5k in under 25 minutes");
    assert_eq!(
        stdout(&sandbox.run(&["get", "r2c2"])).trim_end(),
        "Run 5k in under 25 minutes"
    );
}

#[test]
fn assist_service_error_leaves_cell() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/recommendations");
        then.status(500)
            .json_body(json!({ "error": "Failed to generate recommendation" }));
    });

    let sandbox = Sandbox::for_service(&server.base_url());
    sandbox.run(&["set", "goal", "Original"]);
    let output = sandbox.run(&["assist", "goal", "rephrase"]);
    assert_exit(&output, 14);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to generate recommendation"));
    assert_eq!(stdout(&sandbox.run(&["get", "goal"])).trim_end(), "Original");
}

#[test]
fn assist_empty_recommendation_is_rejected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/recommendations");
        then.status(200).json_body(json!({ "recommendation": "   " }));
    });

    let sandbox = Sandbox::for_service(&server.base_url());
    assert_exit(&sandbox.run(&["assist", "r1c1", "ideas"]), 14);
    assert_eq!(stdout(&sandbox.run(&["get", "r1c1"])).trim_end(), "");
}

#[test]
fn assist_validates_before_calling_service() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/recommendations");
        then.status(200).json_body(json!({ "recommendation": "x" }));
    });

    let sandbox = Sandbox::for_service(&server.base_url());
    assert_exit(&sandbox.run(&["assist", "r4c4", "ideas"]), 3);
    assert_exit(&sandbox.run(&["assist", "r1c1", " "]), 4);
    mock.assert_hits(0);
}

#[test]
fn export_uses_service_filename() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/generate-pdf");
        then.status(200)
            .header("content-type", "application/pdf")
            .header("content-disposition", "attachment; filename=\"my-harada.pdf\"")
            .body("%PDF-1.4 board");
    });

    let sandbox = Sandbox::for_service(&server.base_url());
    sandbox.run(&["set", "goal", "Ship the app"]);
    let out_dir = TempDir::new().unwrap();
    let output = sandbox.run(&["export", "-o", out_dir.path().to_str().unwrap()]);
    assert_exit(&output, 0);
    mock.assert();

    let path = out_dir.path().join("my-harada.pdf");
    assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 board");
    assert!(stdout(&output).contains("my-harada.pdf"));
}

#[test]
fn export_falls_back_to_configured_filename() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/generate-pdf");
        then.status(200).body("%PDF-1.4");
    });

    let sandbox = Sandbox::for_service(&server.base_url());
    let out_dir = TempDir::new().unwrap();
    assert_exit(&sandbox.run(&["export", "-o", out_dir.path().to_str().unwrap()]), 0);
    assert!(out_dir.path().join("fallback.pdf").exists());
}

#[test]
fn export_service_error_exits_21() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/generate-pdf");
        then.status(500).json_body(json!({ "error": "Failed to generate PDF" }));
    });

    let sandbox = Sandbox::for_service(&server.base_url());
    let out_dir = TempDir::new().unwrap();
    let output = sandbox.run(&["export", "-o", out_dir.path().to_str().unwrap()]);
    assert_exit(&output, 21);
    assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 0);
}
