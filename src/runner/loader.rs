//! Test module loaders.
//!
//! A loader turns a file identifier into the [`Suite`] that module exports.
//! [`Registry`] serves suites defined in Rust; [`JsonLoader`] reads
//! declarative JSON test files from disk.

use std::collections::HashMap;
use std::fs;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::testing::{AssertionSink, Harness, TestCase};

use super::suite::Suite;

pub trait ModuleLoader {
    fn load(&self, file: &str, harness: &Harness) -> Result<Suite>;
}

type SuiteBuilder = Box<dyn Fn(&Harness) -> Suite + Send + Sync>;

/// In-process modules, keyed by file identifier.
#[derive(Default)]
pub struct Registry {
    modules: HashMap<String, SuiteBuilder>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, file: impl Into<String>, build: F) -> Self
    where
        F: Fn(&Harness) -> Suite + Send + Sync + 'static,
    {
        self.modules.insert(file.into(), Box::new(build));
        self
    }
}

impl ModuleLoader for Registry {
    fn load(&self, file: &str, harness: &Harness) -> Result<Suite> {
        let build = self.modules.get(file).ok_or_else(|| Error::Load {
            file: file.to_string(),
            reason: "no such module registered".to_string(),
        })?;
        Ok(build(harness))
    }
}

/// Loads JSON test files of the form
///
/// ```json
/// {
///   "tests": {
///     "login redirects": {
///       "url": "/login",
///       "method": "post",
///       "form": { "user": "ann", "password": "secret" },
///       "expectStatus": 302
///     }
///   }
/// }
/// ```
///
/// Tests run in file order. Exactly one of `body`, `json` or `form` may be
/// given.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLoader;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TestFile {
    tests: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RequestSpec {
    url: String,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    headers: Map<String, Value>,
    #[serde(default)]
    cookies: Map<String, Value>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    json: Option<Value>,
    #[serde(default)]
    form: Option<Map<String, Value>>,
    #[serde(default)]
    dump: bool,
    #[serde(default)]
    expect_status: Option<u16>,
}

impl JsonLoader {
    pub fn parse(&self, file: &str, source: &str, harness: &Harness) -> Result<Suite> {
        let load_error = |reason: String| Error::Load {
            file: file.to_string(),
            reason,
        };

        let parsed: TestFile =
            serde_json::from_str(source).map_err(|err| load_error(err.to_string()))?;

        let mut suite = Suite::new();
        for (name, spec) in parsed.tests {
            let spec: RequestSpec = serde_json::from_value(spec)
                .map_err(|err| load_error(format!("test `{name}`: {err}")))?;
            let case = build_case(spec, harness).map_err(|reason| load_error(format!("test `{name}`: {reason}")))?;
            suite = suite.test(name, case);
        }
        debug!(file, tests = suite.len(), "parsed JSON test module");
        Ok(suite)
    }
}

impl ModuleLoader for JsonLoader {
    fn load(&self, file: &str, harness: &Harness) -> Result<Suite> {
        let source = fs::read_to_string(file).map_err(|err| Error::Load {
            file: file.to_string(),
            reason: err.to_string(),
        })?;
        self.parse(file, &source, harness)
    }
}

fn build_case(spec: RequestSpec, harness: &Harness) -> std::result::Result<TestCase, String> {
    let payloads = [spec.body.is_some(), spec.json.is_some(), spec.form.is_some()];
    if payloads.iter().filter(|given| **given).count() > 1 {
        return Err("only one of `body`, `json` or `form` may be given".to_string());
    }

    let mut case = harness.fetch(spec.url);
    if let Some(method) = spec.method.as_deref() {
        case = case.with_method(method);
    }
    for (key, value) in spec.headers {
        case = case.with_header(key.clone(), string_value(&key, value)?);
    }
    for (name, value) in spec.cookies {
        case = case.with_cookie(name.clone(), string_value(&name, value)?);
    }

    if let Some(body) = spec.body {
        case = case.with_payload(body);
    } else if let Some(json) = spec.json {
        case = case.with_json_payload(&json);
    } else if let Some(form) = spec.form {
        let pairs = form
            .into_iter()
            .map(|(key, value)| string_value(&key, value).map(|value| (key, value)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        case = case.with_form_encoded_payload(pairs);
    }

    if spec.dump {
        case = case.dump();
    }
    if let Some(expected) = spec.expect_status {
        case = case.with_verifier(move |response, sink: &mut dyn AssertionSink| {
            let actual = response.status.as_u16();
            sink.check(
                actual == expected,
                &format!("Expected status {expected} but got {actual}"),
            );
        });
    }
    Ok(case)
}

/// Strings pass through; numbers and booleans are rendered as JSON text.
fn string_value(key: &str, value: Value) -> std::result::Result<String, String> {
    match value {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(format!("`{key}` must be a string, got {other}")),
    }
}
