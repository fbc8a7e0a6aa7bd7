//! Pure helpers: body capture, decoding, path building (no status logic).

use serde::de::DeserializeOwned;

use crate::error::{ClientError, ClientResult};

/// Whether a content-type header value denotes JSON.
pub(crate) fn is_json_content_type(content_type: &str) -> bool {
    content_type
        .to_ascii_lowercase()
        .contains("application/json")
}

/// Parse a response body given its content-type.
///
/// JSON content types are parsed; anything else is kept as raw text.
/// An unparseable JSON body yields `None`.
pub(crate) fn parse_body(content_type: &str, text: String) -> Option<serde_json::Value> {
    if is_json_content_type(content_type) {
        serde_json::from_str(&text).ok()
    } else {
        Some(serde_json::Value::String(text))
    }
}

/// Capture a response body; read failures degrade to `None`.
pub(crate) async fn read_body(response: reqwest::Response) -> Option<serde_json::Value> {
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let text = response.text().await.ok()?;
    parse_body(&content_type, text)
}

/// Decode a captured success body into the caller's type.
pub(crate) fn decode<T: DeserializeOwned>(
    path: &str,
    body: Option<serde_json::Value>,
) -> ClientResult<T> {
    serde_json::from_value(body.unwrap_or(serde_json::Value::Null)).map_err(|e| {
        ClientError::InvalidResponse {
            message: format!("unexpected body from {}: {}", path, e),
        }
    })
}

/// Percent-encode one path segment or query value.
pub(crate) fn enc(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
