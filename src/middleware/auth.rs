use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde_json::json;

use crate::app_state::AppState;
use crate::identity::{Claims, Identity};
use crate::utils::api_response::ApiResponse;

/// ✅ **Identity Middleware**
///
/// Requests without an `Authorization` header continue as anonymous
/// visitors. A header that is present but unusable is rejected with `401`/`400`.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    // Step 1: No header means an anonymous visitor
    let Some(auth_header) = req.headers().get(AUTHORIZATION) else {
        req.extensions_mut().insert(Identity::anonymous());
        return Ok(next.run(req).await);
    };

    // Step 2: Convert header to string
    let token_str = auth_header.to_str().map_err(|_| {
        tracing::error!("Invalid Authorization header format");
        ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Invalid Authorization header format", None)
            .into_response()
    })?;

    // Step 3: Strip "Bearer " prefix
    let token = token_str.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::error!("Invalid token format (missing 'Bearer ' prefix)");
        ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Invalid token format (missing 'Bearer ' prefix)",
            None,
        )
        .into_response()
    })?;

    // Step 4: Decode the JWT token
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::warn!("JWT decoding failed: {:?}", e);
        ApiResponse::<()>::error(
            StatusCode::UNAUTHORIZED,
            "Invalid token",
            Some(json!({ "error": e.to_string() })),
        )
        .into_response()
    })?;

    // Step 5: Turn the claims into the caller's identity
    let identity = Identity::try_from(token_data.claims)
        .map_err(|e| ApiResponse::from_review_error(e).into_response())?;
    tracing::debug!("Request authenticated as user {:?}", identity.user_id);
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
