use crate::auth::{self, Principal};
use crate::startup::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use service_core::error::AppError;

/// Basic-Auth gate for the `/v1` routes.
///
/// Extracting a `Principal` verifies the `Authorization` header against the
/// credential store, so a handler that takes one cannot run
/// unauthenticated. Rejections carry no hint of which check failed.
#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let principal = auth::authorize(state.credentials.as_ref(), header).await?;

        // Add to tracing span for observability
        tracing::Span::current().record("client_id", principal.client_id.as_str());

        Ok(principal)
    }
}
