use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejectionReason,
    TypedHeader,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

use crate::auth::{AuthError, AuthUser, JwtService};

/// Bearer-token extractor: handlers taking `AuthUser` only run for valid tokens.
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtService: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| match rejection.reason() {
                TypedHeaderRejectionReason::Missing => AuthError::MissingAuthHeader,
                _ => AuthError::InvalidAuthHeaderFormat,
            })?;

        let jwt = JwtService::from_ref(state);
        let user = jwt.authenticate(bearer.token()).map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            err
        })?;

        Ok(user)
    }
}

/// CORS configuration for the JSON API
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
