use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::schema::ErrorResponse;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Injected failure from the simulation
    #[error("Random service error")]
    Simulated,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Simulated => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body sent to clients; details stay in the logs
    fn public_message(&self) -> &'static str {
        "Internal server error"
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);
        (
            self.status_code(),
            Json(ErrorResponse::new(self.public_message())),
        )
            .into_response()
    }
}
