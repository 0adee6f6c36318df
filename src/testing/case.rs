use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::Url;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::http::response::read_body;
use crate::http::{HttpResponse, Method, Payload, PreparedRequest, Target, Transport};
use crate::runner::Test;

use super::asserter::{AssertionError, AssertionSink, Asserter};
use super::dump;
use super::encode::{FORM_CONTENT_TYPE, JSON_CONTENT_TYPE, form_encode, json_encode};

const CONTENT_TYPE: &str = "Content-Type";
const COOKIE: &str = "Cookie";

/// User verification step, run against the fully received response.
pub type Verifier = Box<dyn FnOnce(&HttpResponse, &mut dyn AssertionSink) + Send>;

/// One HTTP request under test.
///
/// Configure it with the `with_*` builders, bind a sink with
/// [`set_asserter`](Self::set_asserter) and consume it with [`run`](Self::run).
/// Test cases are created by [`crate::Harness::fetch`].
pub struct TestCase {
    target: Target,
    base_url: Option<Url>,
    transport: Arc<dyn Transport>,
    max_body_bytes: usize,
    method: Method,
    headers: Vec<(String, String)>,
    cookies: Vec<(String, String)>,
    payload: Option<Payload>,
    dump: bool,
    asserter: Option<Box<dyn AssertionSink>>,
    verifier: Option<Verifier>,
    encode_error: Option<String>,
}

impl TestCase {
    pub(crate) fn new(
        target: Target,
        base_url: Option<Url>,
        transport: Arc<dyn Transport>,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            target,
            base_url,
            transport,
            max_body_bytes,
            method: Method::default(),
            headers: Vec::new(),
            cookies: Vec::new(),
            payload: None,
            dump: false,
            asserter: None,
            verifier: None,
            encode_error: None,
        }
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = Method::new(method);
        self
    }

    /// Sets a header. Names compare case-insensitively; the latest call wins
    /// and its spelling of the name is the one sent.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&key));
        self.headers.push((key, value.into()));
        self
    }

    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header(CONTENT_TYPE, content_type)
    }

    /// Sets a cookie. Neither the name nor the value may contain `=` or `;`;
    /// they are sent raw.
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.cookies.iter_mut().find(|(existing, _)| *existing == name) {
            Some(cookie) => cookie.1 = value,
            None => self.cookies.push((name, value)),
        }
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_form_encoded_payload<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.with_payload(form_encode(pairs))
            .with_content_type(FORM_CONTENT_TYPE)
    }

    /// Serializes `value` as the JSON body. A value that fails to serialize is
    /// reported as a failure when the case runs.
    pub fn with_json_payload<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match json_encode(value) {
            Ok(json) => {
                self.encode_error = None;
                self.with_payload(json).with_content_type(JSON_CONTENT_TYPE)
            }
            Err(err) => {
                self.encode_error = Some(format!("Failed to encode JSON payload: {err}"));
                self
            }
        }
    }

    pub fn dump(mut self) -> Self {
        self.dump = true;
        self
    }

    pub fn with_verifier<F>(mut self, verifier: F) -> Self
    where
        F: FnOnce(&HttpResponse, &mut dyn AssertionSink) + Send + 'static,
    {
        self.verifier = Some(Box::new(verifier));
        self
    }

    pub fn set_asserter(mut self, asserter: impl AssertionSink + 'static) -> Self {
        self.asserter = Some(Box::new(asserter));
        self
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// The headers that will be sent: explicit headers plus a synthesized
    /// `Cookie` header when none was set explicitly.
    pub fn effective_headers(&self) -> Vec<(String, String)> {
        let mut headers = self.headers.clone();

        let explicit_cookie = self.headers.iter().any(|(key, _)| key.eq_ignore_ascii_case(COOKIE));
        if !explicit_cookie && !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            headers.push((COOKIE.to_string(), cookie));
        }

        headers
    }

    fn prepare(&self) -> std::result::Result<PreparedRequest, String> {
        if let Some(err) = self.encode_error.as_ref() {
            return Err(err.clone());
        }
        let endpoint = self
            .target
            .resolve(self.base_url.as_ref())
            .map_err(|err| err.to_string())?;
        Ok(PreparedRequest {
            method: self.method.clone(),
            endpoint,
            headers: self.effective_headers(),
            payload: self.payload.clone(),
        })
    }

    /// Sends the request and reports to the bound sink.
    ///
    /// Fails with [`Error::MissingAsserter`] before any I/O when no sink is
    /// bound. Every other problem is recorded on the sink, which is signaled
    /// exactly once.
    pub async fn run(mut self) -> Result<()> {
        let mut asserter = self.asserter.take().ok_or(Error::MissingAsserter)?;

        let request = match self.prepare() {
            Ok(request) => request,
            Err(reason) => {
                asserter.fail(AssertionError::new(format!(
                    "Request for {} failed. {reason}",
                    self.target
                )));
                asserter.done();
                return Ok(());
            }
        };

        debug!(method = %request.method, url = %request.endpoint.url(), "sending request");
        let response = match self.transport.send(&request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(target_url = %self.target, error = %err, "request failed");
                asserter.fail(AssertionError::new(format!(
                    "Request for {} failed. {err}",
                    self.target
                )));
                asserter.done();
                return Ok(());
            }
        };

        let body = match read_body(response.body, self.max_body_bytes).await {
            Ok(body) => body,
            Err(err) => {
                asserter.fail(AssertionError::new(format!(
                    "Response for {} could not be read. {err}",
                    self.target
                )));
                asserter.done();
                return Ok(());
            }
        };

        let response = HttpResponse {
            status: response.status,
            headers: response.headers,
            body,
        };
        self.finalize(&request, &response, asserter);
        Ok(())
    }

    fn finalize(
        &mut self,
        request: &PreparedRequest,
        response: &HttpResponse,
        mut asserter: Box<dyn AssertionSink>,
    ) {
        if self.dump {
            print!("{}", dump::render(&self.target, request, response));
        }
        if let Some(verifier) = self.verifier.take() {
            verifier(response, asserter.as_mut());
        }
        asserter.done();
    }
}

impl Test for TestCase {
    fn call(self: Box<Self>, asserter: Asserter) -> BoxFuture<'static, ()> {
        let case = (*self).set_asserter(asserter);
        async move {
            // The asserter was bound just above, so run cannot miss it.
            if let Err(err) = case.run().await {
                warn!(error = %err, "test case did not run");
            }
        }
        .boxed()
    }
}
