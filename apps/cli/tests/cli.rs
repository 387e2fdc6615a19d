use assert_cmd::prelude::*;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// An endpoint nothing listens on; reaching it would fail the submission.
const DEAD_ENDPOINT: &str = "http://127.0.0.1:9/";

fn tripgate(work: &Path) -> Command {
    tripgate_posting_to(work, DEAD_ENDPOINT)
}

fn tripgate_posting_to(work: &Path, endpoint: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tripgate"));
    cmd.current_dir(work)
        .arg("--data-dir")
        .arg(work.join("data"))
        .arg("--endpoint")
        .arg(endpoint)
        .env("TRIP__LOGGING__LEVEL", "warn")
        .env_remove("RUST_LOG");
    cmd
}

fn seed(work: &Path, key: &str, value: &str) {
    let data = work.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join(key), value).unwrap();
}

/// Serves `200 OK` to every POST from a background thread.
fn accepting_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            let app = Router::new().route("/", post(|| async { StatusCode::OK }));
            axum::serve(listener, app).await.unwrap();
        });
    });
    format!("http://{addr}/")
}

fn register_args<'a>(cmd: &'a mut Command, email: &str) -> &'a mut Command {
    cmd.args(["register", "--name", "ana lee", "--email", email])
        .args(["--phone", "+1 (555) 123-4567", "--captcha", "goa"])
}

#[test]
fn status_of_a_fresh_trip() {
    let work = TempDir::new().unwrap();
    tripgate(work.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Registrations: 0 of 10"))
        .stdout(predicate::str::contains("Spots left: 10"))
        .stdout(predicate::str::contains("Status: open"));
}

#[test]
fn configuration_loading_is_logged() {
    let work = TempDir::new().unwrap();
    tripgate(work.path())
        .args(["--log-level", "trip_kernel=debug", "status"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Loading configuration"))
        .stderr(predicate::str::contains("Configuration loaded"));
}

#[test]
fn status_as_json() {
    let work = TempDir::new().unwrap();
    seed(work.path(), "registrationCounter", "8");

    let output = tripgate(work.path()).args(["status", "--json"]).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["count"], 8);
    assert_eq!(report["full"], false);
    assert_eq!(report["progress"]["spots_left"], 2);
    assert_eq!(report["progress"]["tier"], "critical");
}

#[test]
fn status_reports_a_full_trip() {
    let work = TempDir::new().unwrap();
    seed(work.path(), "registrationCounter", "10");

    tripgate(work.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: closed"));
}

#[test]
fn check_accepts_and_rejects_values() {
    let work = TempDir::new().unwrap();

    tripgate(work.path())
        .args(["check", "name", "Ana Lee"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: ok"));

    tripgate(work.path())
        .args(["check", "email", "ana@"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a valid email address"));

    tripgate(work.path())
        .args(["check", "captcha", "rio"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please type \"GOA\""));
}

#[test]
fn check_flags_registered_email() {
    let work = TempDir::new().unwrap();
    seed(work.path(), "registeredEmailList", r#"["ana@example.com"]"#);

    tripgate(work.path())
        .args(["check", "email", "ANA@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already registered"));
}

#[test]
fn check_rejects_unknown_field() {
    let work = TempDir::new().unwrap();
    tripgate(work.path()).args(["check", "age", "30"]).assert().failure();
}

#[test]
fn register_refused_when_full() {
    let work = TempDir::new().unwrap();
    seed(work.path(), "registrationCounter", "10");

    register_args(&mut tripgate(work.path()), "ana@example.com")
        .assert()
        .failure()
        .stderr(predicate::str::contains("all 10 spots have been filled"));
}

#[test]
fn register_lists_invalid_fields() {
    let work = TempDir::new().unwrap();

    tripgate(work.path())
        .args(["register", "--name", "A", "--email", "nope", "--phone", "12", "--captcha", "goa"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("name: Name must be at least 2 characters long"))
        .stderr(predicate::str::contains("email: Please enter a valid email address"))
        .stderr(predicate::str::contains("phone: Please enter a valid phone number"));
}

#[test]
fn register_transport_failure_changes_nothing() {
    let work = TempDir::new().unwrap();

    register_args(&mut tripgate(work.path()), "ana@example.com")
        .assert()
        .failure()
        .stderr(predicate::str::contains("There was an error submitting the form"));

    assert!(!work.path().join("data").join("registrationCounter").exists());
}

#[test]
fn register_takes_the_last_seat() {
    let work = TempDir::new().unwrap();
    let endpoint = accepting_endpoint();

    register_args(&mut tripgate_posting_to(work.path(), &endpoint), "Ana@Example.com")
        .env("TRIP__TRIP__CAPACITY", "1")
        .env("TRIP__TRIP__FULL_PANEL_DELAY_MS", "0")
        .assert()
        .success()
        .stdout(predicate::str::contains("Registration received for Ana Lee."))
        .stdout(predicate::str::contains("Spots left: 0"))
        .stdout(predicate::str::contains("The trip is now full."));

    let data = work.path().join("data");
    assert_eq!(fs::read_to_string(data.join("registrationCounter")).unwrap(), "1");
    assert_eq!(
        fs::read_to_string(data.join("registeredEmailList")).unwrap(),
        r#"["ana@example.com"]"#
    );
}
