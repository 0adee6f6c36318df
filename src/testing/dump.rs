use std::fmt::Write;

use crate::http::{HttpResponse, PreparedRequest, Target};

const INDENT: &str = "     ";

/// Renders the request/response diagnostics printed for `dump()`ed test cases.
/// The URL is shown as the test case was given it.
pub fn render(target: &Target, request: &PreparedRequest, response: &HttpResponse) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "Request URL: {target}");
    let _ = writeln!(out, "Request Method: {}", request.method);
    let _ = writeln!(out, "Status Code: {}", response.status.as_u16());

    if let Some(payload) = request.payload.as_ref().filter(|payload| !payload.is_empty()) {
        let _ = writeln!(out, "Request Payload:");
        let _ = writeln!(out, "{}", indent(&payload.to_text()));
    }

    let _ = writeln!(out, "Request Headers:");
    for (name, value) in &request.headers {
        let _ = writeln!(out, "{INDENT}{name}: {value}");
    }

    let _ = writeln!(out, "Response Headers:");
    for (name, value) in &response.headers {
        let value = value.to_str().unwrap_or("<binary>");
        let _ = writeln!(out, "{INDENT}{name}: {value}");
    }

    if !response.body.is_empty() {
        let _ = writeln!(out, "Response Data:");
        let _ = writeln!(out, "{}", indent(&response.text()));
    }

    out
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("{INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
