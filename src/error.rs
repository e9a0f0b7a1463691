use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("NotFound: query returned no rows")]
    NotFound,
    #[error("StoreError: {0}")]
    Store(#[from] libsql::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(&'static str),
    /// The store failed; `context` is the only text the client sees.
    #[error("{context}")]
    Persistence {
        context: &'static str,
        #[source]
        source: GatewayError,
    },
}

impl HandlerError {
    pub fn persistence(context: &'static str) -> impl FnOnce(GatewayError) -> HandlerError {
        move |source| HandlerError::Persistence { context, source }
    }

    pub fn status(&self) -> StatusCode {
        use HandlerError::*;
        match self {
            Validation(_) => StatusCode::BAD_REQUEST,
            NotFound(_) => StatusCode::NOT_FOUND,
            Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        if let HandlerError::Persistence { source, .. } = &self {
            tracing::error!(error = %crate::unpack_error(source), "{}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(
            HandlerError::Validation("title is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HandlerError::NotFound("User book not found").status(),
            StatusCode::NOT_FOUND
        );
        let err = HandlerError::persistence("Failed to add book")(GatewayError::NotFound);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn persistence_error_hides_store_text() {
        let err = HandlerError::persistence("Failed to remove book")(GatewayError::NotFound);
        assert_eq!(err.to_string(), "Failed to remove book");
        assert!(crate::unpack_error(&err).contains("query returned no rows"));
    }
}
