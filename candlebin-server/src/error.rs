use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use candlebin::CandlebinError;
use serde_json::json;

/// A `CandlebinError` on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub CandlebinError);

impl From<CandlebinError> for ApiError {
    fn from(e: CandlebinError) -> Self {
        Self(e)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self(CandlebinError::InvalidArg(e.body_text()))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ApiError {
    /// 400 for caller mistakes, 504 for deadlines, 500 for the rest.
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if self.0.is_timeout() {
            StatusCode::GATEWAY_TIMEOUT
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Message safe to hand to the client. Server-side details stay in the logs.
    pub fn public_message(&self) -> String {
        match &self.0 {
            CandlebinError::InvalidInterval(m) | CandlebinError::InvalidArg(m) => m.clone(),
            CandlebinError::UnknownSymbol { symbol } => symbol.clone(),
            CandlebinError::StoreTimeout { .. } | CandlebinError::RequestTimeout { .. } => {
                "upstream timed out".to_string()
            }
            CandlebinError::DataIntegrity(_) => "stored data failed validation".to_string(),
            _ => "internal error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, kind = self.0.kind(), "request failed");
        } else {
            tracing::warn!(error = %self.0, kind = self.0.kind(), "rejected request");
        }
        let body = format!("{}: {}", self.0.kind(), self.public_message());
        (status, Json(json!({ "error": body }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_error_class() {
        let cases = [
            (CandlebinError::InvalidInterval("0".into()), StatusCode::BAD_REQUEST),
            (CandlebinError::unknown_symbol("ZZZZ"), StatusCode::BAD_REQUEST),
            (CandlebinError::InvalidArg("symbol".into()), StatusCode::BAD_REQUEST),
            (
                CandlebinError::store_timeout("sqlite", "fetch-prices"),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (CandlebinError::request_timeout("export"), StatusCode::GATEWAY_TIMEOUT),
            (
                CandlebinError::DataIntegrity("high < low".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CandlebinError::store("sqlite", "disk I/O error"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CandlebinError::Artifact("permission denied".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, want) in cases {
            assert_eq!(ApiError(err).status(), want);
        }
    }

    #[test]
    fn server_errors_hide_details() {
        let msg = ApiError(CandlebinError::store("sqlite", "database is locked")).public_message();
        assert!(!msg.contains("locked"));
        let msg = ApiError(CandlebinError::DataIntegrity("row 7: high < low".into())).public_message();
        assert!(!msg.contains("row 7"));
    }
}
