//! End-to-end runs of the runner over JSON test files and registered suites.

use std::fs;
use std::time::Duration;

use falkor::runner::{Matcher, discover};
use falkor::{Asserter, Config, Error, Harness, JsonLoader, Registry, RunMode, Runner, Suite};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_test_file(dir: &TempDir, name: &str, contents: &str) -> String {
    let file = dir.path().join(name);
    fs::write(&file, contents).unwrap();
    file.to_string_lossy().into_owned()
}

async fn server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/home"))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn two_passing_files_in_parallel() {
    let server = server().await;
    let dir = TempDir::new().unwrap();
    let files = vec![
        write_test_file(&dir, "health.json", r#"{ "tests": { "is up": { "url": "/health", "expectStatus": 200 } } }"#),
        write_test_file(
            &dir,
            "auth.json",
            r#"{ "tests": { "login redirects": { "url": "/login", "method": "post", "form": { "user": "ann" }, "expectStatus": 302 } } }"#,
        ),
    ];
    let config = Config {
        base_url: Some(server.uri()),
        ..Config::default()
    };
    let harness = Harness::new(&config).unwrap();

    let discovery = discover(&files, &JsonLoader, &harness, &Matcher::new("").unwrap()).unwrap();
    assert_eq!(discovery.banner(), "2 test cases discovered, in 2 files.");

    let summary = Runner::new(&config, &harness, &JsonLoader).run(&files).await.unwrap();
    assert!(summary.failures.is_empty(), "{:?}", summary.failures);
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.exit_code(), 0);
}

#[tokio::test]
async fn failures_are_listed_by_file_and_name() {
    let server = server().await;
    let dir = TempDir::new().unwrap();
    let file = write_test_file(
        &dir,
        "mixed.json",
        r#"{ "tests": {
            "health": { "url": "/health", "expectStatus": 200 },
            "wrong status": { "url": "/health", "expectStatus": 201 }
        } }"#,
    );
    let config = Config {
        base_url: Some(server.uri()),
        run_mode: RunMode::Serial,
        ..Config::default()
    };
    let harness = Harness::new(&config).unwrap();

    let summary = Runner::new(&config, &harness, &JsonLoader)
        .quiet()
        .run(std::slice::from_ref(&file))
        .await
        .unwrap();

    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].name, "wrong status");
    assert_eq!(summary.failures[0].errors[0].message, "Expected status 201 but got 200");
    assert_eq!(summary.exit_code(), 1);
    assert!(summary.render().ends_with(&format!("Failed tests:\n{file}:wrong status")));
}

#[tokio::test]
async fn pattern_limits_what_runs() {
    let server = server().await;
    let dir = TempDir::new().unwrap();
    let file = write_test_file(
        &dir,
        "all.json",
        r#"{ "tests": {
            "Login flow": { "url": "/login", "method": "POST", "expectStatus": 302 },
            "broken": { "url": "/health", "expectStatus": 500 }
        } }"#,
    );
    let config = Config {
        base_url: Some(server.uri()),
        test_pattern: "login".to_string(),
        ..Config::default()
    };
    let harness = Harness::new(&config).unwrap();

    let summary = Runner::new(&config, &harness, &JsonLoader)
        .quiet()
        .run(&[file])
        .await
        .unwrap();
    assert_eq!(summary.passed, 1);
    assert!(summary.is_success());
}

#[tokio::test(start_paused = true)]
async fn run_times_out_when_a_test_never_finishes() {
    let config = Config {
        timeout: Duration::from_secs(1),
        ..Config::default()
    };
    let harness = Harness::new(&config).unwrap();
    let registry = Registry::new().register("stuck", |_: &Harness| {
        Suite::new()
            .test_fn("finishes", |asserter: Asserter| async move { asserter.done() })
            .test_fn("never finishes", |asserter: Asserter| async move {
                std::future::pending::<()>().await;
                asserter.done();
            })
    });

    let started = tokio::time::Instant::now();
    let err = Runner::new(&config, &harness, &registry)
        .quiet()
        .run(&["stuck".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn invalid_pattern_fails_before_running() {
    let config = Config {
        test_pattern: "[".to_string(),
        ..Config::default()
    };
    let harness = Harness::new(&config).unwrap();
    let registry = Registry::new();
    let err = Runner::new(&config, &harness, &registry)
        .quiet()
        .run(&[])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPattern { .. }));
}
