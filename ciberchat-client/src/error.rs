//! Internal error helpers for mapping HTTP/reqwest errors to [`ClientError`].

use std::time::Duration;

use ciberchat_types::ClientError;
use serde::Deserialize;

/// Error body returned by the chat API: `{"detail": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Pull the `detail` message out of an error body, falling back to the raw text.
fn detail(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.detail)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Map a non-success HTTP status to a [`ClientError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ClientError {
    let detail = detail(body);
    match status.as_u16() {
        400 => ClientError::InvalidRequest(detail),
        // The API answers 401 without a session and 403 on a missing CSRF token.
        401 | 403 => ClientError::Authentication(detail),
        404 => ClientError::NotFound(detail),
        500..=599 => ClientError::ServiceUnavailable(detail),
        code => ClientError::UnexpectedStatus {
            status: code,
            detail,
        },
    }
}

/// Map a [`reqwest::Error`] to a [`ClientError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error, timeout: Option<Duration>) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout(timeout.unwrap_or_default())
    } else if err.is_decode() {
        ClientError::Decode(err.to_string())
    } else {
        ClientError::Network(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn detail_is_extracted_from_json_body() {
        let err = map_http_status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail": "No estás autenticado"}"#,
        );
        assert!(matches!(err, ClientError::Authentication(d) if d == "No estás autenticado"));
    }

    #[test]
    fn raw_body_is_kept_when_not_json() {
        let err = map_http_status(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>\n");
        assert!(
            matches!(err, ClientError::ServiceUnavailable(d) if d == "<html>bad gateway</html>")
        );
    }

    #[test]
    fn status_codes_map_to_variants() {
        assert!(matches!(
            map_http_status(StatusCode::BAD_REQUEST, "{}"),
            ClientError::InvalidRequest(_)
        ));
        assert!(matches!(
            map_http_status(StatusCode::FORBIDDEN, ""),
            ClientError::Authentication(_)
        ));
        assert!(matches!(
            map_http_status(StatusCode::NOT_FOUND, ""),
            ClientError::NotFound(_)
        ));
        assert!(matches!(
            map_http_status(StatusCode::METHOD_NOT_ALLOWED, ""),
            ClientError::UnexpectedStatus { status: 405, .. }
        ));
    }
}
