//! Mapping HTTP failures onto [`ServiceError`].

use serde::Deserialize;

use careerpath_core::error::ServiceError;

/// Error body shape used by the careerpath backend: `{"error": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Classify a transport-level failure.
pub(crate) fn request_error(err: reqwest::Error, timeout_secs: u64) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout(timeout_secs)
    } else if err.is_decode() {
        ServiceError::Malformed(err.to_string())
    } else if err.is_connect() || err.is_request() || err.is_body() {
        ServiceError::Network(err.to_string())
    } else {
        ServiceError::Unknown(err.to_string())
    }
}

/// Pass 2xx responses through; turn anything else into
/// [`ServiceError::Status`] with the server's message when it sent one.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    Err(ServiceError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Read a JSON body, reporting undecodable payloads as malformed.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ServiceError> {
    let body = response
        .text()
        .await
        .map_err(|e| ServiceError::Network(e.to_string()))?;
    serde_json::from_str(&body)
        .map_err(|e| ServiceError::Malformed(format!("failed to parse response: {e}")))
}
