use ciberchat_types::*;
use std::time::Duration;

#[test]
fn client_error_display() {
    let err = ClientError::UnexpectedStatus {
        status: 418,
        detail: "teapot".into(),
    };
    assert!(err.to_string().contains("418"));
    assert!(err.to_string().contains("teapot"));
}

#[test]
fn client_error_is_retryable() {
    assert!(
        ClientError::Network(Box::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset"
        )))
        .is_retryable()
    );
    assert!(ClientError::Timeout(Duration::from_secs(5)).is_retryable());
    assert!(ClientError::ServiceUnavailable("down".into()).is_retryable());
    assert!(
        ClientError::Stream(StreamError::Transport(Box::new(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "eof"
        ))))
        .is_retryable()
    );
    assert!(!ClientError::Authentication("no session".into()).is_retryable());
    assert!(!ClientError::InvalidRequest("empty".into()).is_retryable());
    assert!(!ClientError::NotFound("chat 9".into()).is_retryable());
    assert!(!ClientError::Stream(StreamError::Truncated).is_retryable());
}

#[test]
fn client_error_from_stream_error() {
    let err: ClientError = StreamError::Truncated.into();
    assert!(err.to_string().contains("[DONE]"));
}

#[test]
fn stream_error_keeps_source() {
    use std::error::Error as _;

    let err = StreamError::Transport(Box::new(std::io::Error::new(
        std::io::ErrorKind::ConnectionAborted,
        "aborted",
    )));
    assert!(err.source().is_some());
}
