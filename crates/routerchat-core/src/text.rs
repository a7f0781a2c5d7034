//! Text policy at the process boundary.
//!
//! User input is cleaned once when it enters the session, and response bodies
//! are decoded once when they leave the HTTP client. Nothing else re-encodes.

/// Cleans a line typed by the user.
///
/// Control characters other than newline and tab are dropped and surrounding
/// whitespace is trimmed. Returns `None` when nothing is left to send.
pub fn normalize_input(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Decodes a response body as UTF-8.
///
/// Invalid sequences become U+FFFD so the damage stays visible in the
/// rendered reply.
pub fn decode_body(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(err) => {
            tracing::warn!(
                valid_up_to = err.valid_up_to(),
                len = bytes.len(),
                "response body is not valid UTF-8; replacing invalid bytes"
            );
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}
