use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use stylist_core::AppError;

use crate::auth::session::SessionVerifier;
use crate::error::HttpAppError;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn SessionVerifier>,
}

/// Require a verified `Authorization: Bearer <id token>` and attach the
/// resulting `Session` to the request extensions.
pub async fn session_guard(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let token = match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => token.trim().to_string(),
        _ => {
            return HttpAppError(AppError::Unauthorized(
                "Invalid authorization header format".to_string(),
            ))
            .into_response();
        }
    };

    match auth_state.verifier.verify(&token).await {
        Ok(session) => {
            tracing::debug!(user_id = %session.user_id, path = %request.uri().path(), "Session verified");
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}
