//! Debug logging of credential documents and token responses.
//!
//! Credential documents are logged by key only. Response bodies are logged
//! verbatim up to [`RESPONSE_LOG_LIMIT`] bytes.

use serde_json::{Map, Value};
use tracing::debug;

/// Maximum number of response body bytes written to the debug log
pub const RESPONSE_LOG_LIMIT: usize = 1024;

/// Appended to a response excerpt that was cut at [`RESPONSE_LOG_LIMIT`]
pub const TRUNCATION_MARKER: &str = "\n...";

/// Top-level keys of a credentials document, sorted.
pub fn sorted_keys(document: &Map<String, Value>) -> Vec<&str> {
    let mut keys: Vec<&str> = document.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

pub fn log_document_keys(document: &Map<String, Value>) {
    debug!(keys = ?sorted_keys(document), "Found keys in auth file");
}

/// The part of a response body that goes into the debug log: the whole body,
/// or its first [`RESPONSE_LOG_LIMIT`] bytes followed by [`TRUNCATION_MARKER`].
///
/// The cut is made on raw bytes and may split a UTF-8 sequence.
pub fn response_excerpt(body: &[u8]) -> Vec<u8> {
    if body.len() <= RESPONSE_LOG_LIMIT {
        return body.to_vec();
    }

    let mut excerpt = Vec::with_capacity(RESPONSE_LOG_LIMIT + TRUNCATION_MARKER.len());
    excerpt.extend_from_slice(&body[..RESPONSE_LOG_LIMIT]);
    excerpt.extend_from_slice(TRUNCATION_MARKER.as_bytes());
    excerpt
}

/// Render bytes for the log. Valid UTF-8 is written as is; undecodable bytes
/// are written as `\xNN` escapes, never replaced.
pub fn escape_invalid_utf8(bytes: &[u8]) -> String {
    let mut rendered = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        rendered.push_str(chunk.valid());
        for byte in chunk.invalid() {
            rendered.push_str(&format!("\\x{:02x}", byte));
        }
    }
    rendered
}

pub fn log_response(body: &[u8]) {
    let cropped = body.len() > RESPONSE_LOG_LIMIT;
    debug!(
        bytes = body.len(),
        cropped,
        "OAuth response details:\n---[ RESPONSE ]--------------------------------------\n{}\n-----------------------------------------------------",
        escape_invalid_utf8(&response_excerpt(body))
    );
}
