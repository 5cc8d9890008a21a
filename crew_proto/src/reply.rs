use serde_json::Value;
use thiserror::Error;

use crate::seconds;

/// Application-level refusal (`ok: false`) reported by the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: u16,
    pub message: String,
    /// Seconds until the action becomes acceptable (vote-too-soon).
    pub delay: Option<u32>,
    /// Seconds of cooldown still pending (kill-too-soon).
    pub remaining: Option<u32>,
}

impl Rejection {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            delay: None,
            remaining: None,
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Failure of a request to the game authority.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorityError {
    /// Network failure or timeout. Retry-eligible.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The session no longer exists (HTTP 404). Never retried.
    #[error("session expired")]
    SessionGone,
    #[error("{0}")]
    Rejected(Rejection),
    #[error("malformed reply: {0}")]
    Malformed(String),
}

impl AuthorityError {
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            AuthorityError::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

/// Validate the `{ok, error}` envelope of a reply and hand back the payload.
///
/// `404` always means the session is gone. Any non-2xx status or `ok: false`
/// becomes a [`Rejection`] carrying the authority's message (or a generic one
/// when the body is not JSON). A 2xx body that is not JSON is malformed.
pub fn decode_envelope(status: u16, body: &str) -> Result<Value, AuthorityError> {
    if status == 404 {
        return Err(AuthorityError::SessionGone);
    }
    let success = (200..300).contains(&status);
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) if success => return Err(AuthorityError::Malformed(err.to_string())),
        Err(_) => {
            return Err(AuthorityError::Rejected(Rejection::new(
                status,
                format!("request failed (status {status})"),
            )))
        }
    };

    let ok = value.get("ok").and_then(Value::as_bool).unwrap_or(success);
    if success && ok {
        return Ok(value);
    }

    let message = value
        .get("error")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("request failed (status {status})"));
    Err(AuthorityError::Rejected(Rejection {
        status,
        message,
        delay: value.get("delay").map(seconds::from_value).filter(|v| *v > 0),
        remaining: value
            .get("remaining")
            .map(seconds::from_value)
            .filter(|v| *v > 0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_session_gone() {
        let err = decode_envelope(404, r#"{"ok": false, "error": "Sessao expirada."}"#)
            .expect_err("404 is terminal");
        assert_eq!(err, AuthorityError::SessionGone);
    }

    #[test]
    fn ok_false_surfaces_message_and_delay() {
        let err = decode_envelope(400, r#"{"ok": false, "error": "Too soon", "delay": 4}"#)
            .expect_err("rejection");
        let rejection = err.rejection().expect("rejection variant");
        assert_eq!(rejection.message, "Too soon");
        assert_eq!(rejection.delay, Some(4));
        assert_eq!(rejection.remaining, None);
        assert_eq!(err.to_string(), "Too soon");
    }

    #[test]
    fn ok_false_on_success_status_is_still_rejected() {
        let err = decode_envelope(200, r#"{"ok": false}"#).expect_err("rejection");
        assert_eq!(
            err.rejection().map(|r| r.message.as_str()),
            Some("request failed (status 200)")
        );
    }

    #[test]
    fn garbage_body_is_malformed_only_on_success() {
        assert!(matches!(
            decode_envelope(200, "<html>"),
            Err(AuthorityError::Malformed(_))
        ));
        assert!(matches!(
            decode_envelope(502, "<html>"),
            Err(AuthorityError::Rejected(_))
        ));
    }

    #[test]
    fn passes_payload_through() {
        let value = decode_envelope(200, r#"{"ok": true, "final": false}"#).unwrap();
        assert_eq!(value["final"], Value::Bool(false));
    }
}
