//! Bearer token extractor for Axum handlers.

use alertdesk_core::error::CoreError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::token::verify_token;
use crate::error::AppError;
use crate::state::AppState;

/// Proof that the request carried the configured API token.
///
/// ```ignore
/// async fn my_handler(_auth: ApiToken) -> AppResult<Json<()>> { ... }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ApiToken;

impl FromRequestParts<AppState> for ApiToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        match verify_token(token, &state.config.token_hash) {
            Ok(true) => Ok(ApiToken),
            Ok(false) => Err(AppError::Core(CoreError::Unauthorized(
                "Invalid token".into(),
            ))),
            Err(e) => {
                tracing::error!(error = %e, "Configured TOKEN_HASH is not a valid PHC string");
                Err(AppError::Core(CoreError::Unauthorized(
                    "Invalid token".into(),
                )))
            }
        }
    }
}
