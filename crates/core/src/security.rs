//! Bearer authentication for the `/api` routes.
//!
//! Access tokens are HS256 JWTs naming the user in `sub`. The middleware
//! only lets a request through when the token verifies and its user is
//! still known to the store; the verified [`Claims`] are then available
//! to handlers as an `Extension`.

use crate::app_state::AppState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use meterpay_primitives::error::{ApiError, AuthError};
use meterpay_primitives::models::app_state::jwt_details::JWTInfo;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

const ALGORITHM: Algorithm = Algorithm::HS256;
const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    fn for_user(jwt: &JWTInfo, user_id: Uuid) -> Self {
        let issued_at = Utc::now();
        Self {
            sub: user_id.to_string(),
            iss: jwt.jwt_issuer.clone(),
            aud: jwt.jwt_audience.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(jwt.jwt_expiration_hours)).timestamp(),
        }
    }

    pub fn user_id(&self) -> Result<Uuid, ApiError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| ApiError::Auth(AuthError::InvalidToken("Malformed subject".into())))
    }
}

pub struct SecurityConfig;

impl SecurityConfig {
    /// Signs an access token for `user_id` valid for `JWT_EXPIRATION_HOURS`.
    pub fn create_token(state: &AppState, user_id: Uuid) -> Result<String, ApiError> {
        let jwt = &state.config.jwt_details;

        encode(
            &Header::new(ALGORITHM),
            &Claims::for_user(jwt, user_id),
            &EncodingKey::from_secret(jwt.jwt_secret.expose_secret().as_bytes()),
        )
        .map_err(|e| ApiError::Token(format!("Token creation failed: {}", e)))
    }

    pub fn verify_token(state: &AppState, token: &str) -> Result<Claims, AuthError> {
        let jwt = &state.config.jwt_details;

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[jwt.jwt_issuer.as_str()]);
        validation.set_audience(&[jwt.jwt_audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(jwt.jwt_secret.expose_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!("auth: token rejected: {}", e);
            AuthError::InvalidToken("Invalid or expired token".into())
        })
    }

    pub async fn auth_middleware(
        State(state): State<Arc<AppState>>,
        mut req: Request,
        next: Next,
    ) -> Result<Response, Response> {
        let claims = match Self::authenticate(&state, &req) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(path = %req.uri().path(), "auth: rejected request: {}", e);
                return Err(e.into_response());
            }
        };

        req.extensions_mut().insert(claims);
        Ok(next.run(req).await)
    }

    fn authenticate(state: &AppState, req: &Request) -> Result<Claims, ApiError> {
        let token = bearer_token(req)?;
        let claims = Self::verify_token(state, token)?;

        // tokens outlive a restarted memory store
        let user_id = claims.user_id()?;
        if state.store.find_user(user_id)?.is_none() {
            return Err(ApiError::Auth(AuthError::InvalidToken("Unknown user".into())));
        }

        Ok(claims)
    }
}

fn bearer_token(req: &Request) -> Result<&str, AuthError> {
    let header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    match header.strip_prefix(BEARER_PREFIX).map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::InvalidFormat),
    }
}
