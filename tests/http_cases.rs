//! Test cases issued against a wiremock server.

use falkor::{Asserter, AssertionSink, Config, Harness};
use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

async fn harness_for(server: &MockServer) -> Harness {
    let config = Config {
        base_url: Some(server.uri()),
        ..Config::default()
    };
    Harness::new(&config).unwrap()
}

#[tokio::test]
async fn get_with_cookies_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(query_param("tab", "settings"))
        .and(header("cookie", "session=abc; id=1"))
        .and(header("x-client", "falkor"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let (asserter, completion) = Asserter::new();
    harness_for(&server)
        .await
        .fetch("/profile?tab=settings")
        .with_header("X-Client", "falkor")
        .with_cookie("session", "abc")
        .with_cookie("id", "1")
        .with_verifier(|response, sink| {
            sink.check(response.status.as_u16() == 200, "expected 200");
            sink.check(response.text() == "hello", "expected greeting");
        })
        .set_asserter(asserter)
        .run()
        .await
        .unwrap();

    let verdict = completion.await;
    assert!(verdict.passed(), "{:?}", verdict.errors);
}

#[tokio::test]
async fn posts_form_encoded_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("a=1%202&b=x%26y"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (asserter, completion) = Asserter::new();
    harness_for(&server)
        .await
        .fetch("/login")
        .with_method("post")
        .with_form_encoded_payload([("a", "1 2"), ("b", "x&y")])
        .set_asserter(asserter)
        .run()
        .await
        .unwrap();

    assert!(completion.await.passed());
}

#[tokio::test]
async fn puts_json_payload_and_reads_json_response() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/items/7"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"a": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "a": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let (asserter, completion) = Asserter::new();
    harness_for(&server)
        .await
        .fetch(format!("{}/items/7", server.uri()))
        .with_method("Put")
        .with_json_payload(&json!({"a": 1}))
        .with_verifier(|response, sink| {
            let body: serde_json::Value = match response.json() {
                Ok(body) => body,
                Err(err) => {
                    sink.check(false, &format!("invalid JSON: {err}"));
                    return;
                }
            };
            sink.check(body["id"] == 7, "expected id 7");
        })
        .set_asserter(asserter)
        .run()
        .await
        .unwrap();

    assert!(completion.await.passed());
}

#[tokio::test]
async fn empty_payload_is_not_written() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(|request: &Request| {
            request.body.is_empty() && !request.headers.contains_key("content-length")
        })
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (asserter, completion) = Asserter::new();
    harness_for(&server)
        .await
        .fetch("/ping")
        .with_payload("")
        .with_verifier(|response, sink| {
            sink.check(response.status.as_u16() == 204, "expected 204");
        })
        .set_asserter(asserter)
        .run()
        .await
        .unwrap();

    let verdict = completion.await;
    assert!(verdict.passed(), "{:?}", verdict.errors);
}

#[tokio::test]
async fn redirects_are_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (asserter, completion) = Asserter::new();
    harness_for(&server)
        .await
        .fetch("/old")
        .dump()
        .with_verifier(|response, sink| {
            sink.check(response.status.as_u16() == 302, "expected 302");
            sink.check(response.header("location") == Some("/new"), "expected Location");
            sink.check(response.body.is_empty(), "expected empty body");
        })
        .set_asserter(asserter)
        .run()
        .await
        .unwrap();

    let verdict = completion.await;
    assert!(verdict.passed(), "{:?}", verdict.errors);
}

#[tokio::test]
async fn failing_verifier_reports_through_the_asserter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (asserter, completion) = Asserter::new();
    harness_for(&server)
        .await
        .fetch("/")
        .with_verifier(|response, sink| {
            sink.log(format!("status was {}", response.status.as_u16()));
            sink.check(response.status.is_success(), "expected success");
        })
        .set_asserter(asserter)
        .run()
        .await
        .unwrap();

    let verdict = completion.await;
    assert_eq!(verdict.errors.len(), 1);
    assert_eq!(verdict.logs, vec!["status was 500".to_string()]);
}

#[tokio::test]
async fn connection_refused_is_a_single_failure() {
    let harness = Harness::new(&Config::default()).unwrap();
    let (asserter, completion) = Asserter::new();
    harness
        .fetch("http://127.0.0.1:1/unreachable")
        .set_asserter(asserter)
        .run()
        .await
        .unwrap();

    let verdict = completion.await;
    assert_eq!(verdict.errors.len(), 1);
    let message = &verdict.errors[0].message;
    assert!(message.starts_with("Request for http://127.0.0.1:1/unreachable failed."));
    assert!(message.to_lowercase().contains("refused"), "{message}");
}
