/* src/i18n/adapter/axum/src/error.rs */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use seam_i18n::I18nError;

/// Newtype so `I18nError` can implement `IntoResponse` (orphan rule).
pub(crate) struct AxumError(pub I18nError);

impl IntoResponse for AxumError {
  fn into_response(self) -> Response {
    let err = self.0;
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = serde_json::json!({
      "ok": false,
      "error": {
        "code": err.code(),
        "message": err.message(),
      }
    });
    (status, axum::Json(body)).into_response()
  }
}

impl From<I18nError> for AxumError {
  fn from(err: I18nError) -> Self {
    Self(err)
  }
}
