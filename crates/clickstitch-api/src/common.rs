// Shared pieces for the HTTP surface

use axum::http::StatusCode;
use clickstitch_core::WriteError;

/// Map a write-path error to the client-facing status.
///
/// The retryable infrastructure failures become 503 so callers know a
/// retry is reasonable; a publish failure is the downstream's fault and
/// becomes 502.
pub fn status_for(err: &WriteError) -> StatusCode {
    match err {
        WriteError::ValidationRejected(_) => StatusCode::FORBIDDEN,
        WriteError::HistoryUnavailable(_) | WriteError::HistoryTimeout(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        WriteError::Publish(_) => StatusCode::BAD_GATEWAY,
        WriteError::MalformedRecord(_)
        | WriteError::Configuration(_)
        | WriteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
