use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;

use crate::state::{AppState, ErrorResponse};

pub fn json_error(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn json_error_response(status: StatusCode, message: impl Into<String>) -> Response {
    json_error(status, message).into_response()
}

pub fn html_response(status: StatusCode, body: String) -> Response {
    let mut response = Html(body).into_response();
    *response.status_mut() = status;
    response
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn url_escape(input: &str) -> String {
    let mut out = String::new();
    for byte in input.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(*byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// `m:ss`; unknown durations are zero and render as `0:00`.
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn apply_template(mut template: String, replacements: &[(&str, String)]) -> String {
    for (key, value) in replacements {
        let token = format!("{{{{{}}}}}", key);
        template = template.replace(&token, value);
    }
    template
}

pub fn load_template(state: &AppState, name: &str) -> Result<String, String> {
    let path = state.web_root.join(name);
    std::fs::read_to_string(&path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::{apply_template, escape_html, format_duration, url_escape};

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b>\"Rock & Roll\"</b>"),
            "&lt;b&gt;&quot;Rock &amp; Roll&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn escapes_url_components() {
        assert_eq!(url_escape("a b/c"), "a%20b%2Fc");
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(5), "0:05");
        assert_eq!(format_duration(210), "3:30");
        assert_eq!(format_duration(3725), "62:05");
    }

    #[test]
    fn fills_template_tokens() {
        let out = apply_template(
            "<h1>{{title}}</h1>{{title}}".to_string(),
            &[("title", "Eras".to_string())],
        );
        assert_eq!(out, "<h1>Eras</h1>Eras");
    }
}
