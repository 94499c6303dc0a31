use crate::app_state::AppState;
use crate::security::SecurityConfig;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, Params};
use meterpay_primitives::error::{ApiError, AuthError};
use meterpay_primitives::models::dtos::auth_dto::{
    AuthResponse, LoginRequest, RegisterRequest, UserProfileDto,
};
use meterpay_primitives::models::entities::user::{NewUser, User};
use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

pub struct AuthService;

impl AuthService {
    pub async fn register(
        state: &AppState,
        payload: RegisterRequest,
    ) -> Result<AuthResponse, ApiError> {
        let payload = payload.normalize();
        payload.validate()?;

        if state.store.find_user_by_username(&payload.username)?.is_some() {
            warn!(username = %payload.username, "auth.register: username taken");
            return Err(ApiError::Auth(AuthError::DuplicateUsername));
        }

        let password = SecretString::from(payload.password);
        let password_hash = Self::hash_password(&password)?;

        let user = state.store.create_user(NewUser {
            id: Uuid::new_v4(),
            username: payload.username,
            password_hash,
            full_name: payload.full_name,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
        })?;

        let token = SecurityConfig::create_token(state, user.id).map_err(|_| {
            error!("auth.register: jwt generation failed");
            ApiError::Internal("Authentication service error".into())
        })?;

        info!(user_id = %user.id, username = %user.username, "User registered successfully");

        Ok(AuthResponse {
            token,
            user: UserProfileDto::from(user),
        })
    }

    pub async fn login(state: &AppState, payload: LoginRequest) -> Result<AuthResponse, ApiError> {
        let payload = payload.normalize();
        payload.validate()?;

        let user = state.store.find_user_by_username(&payload.username)?;
        Self::verify_password(&payload.password, user.as_ref())?;

        let user = user.ok_or(ApiError::Auth(AuthError::InvalidCredentials))?;

        let token = SecurityConfig::create_token(state, user.id).map_err(|_| {
            error!("auth.login: jwt creation failed");
            ApiError::Internal("Authentication service unavailable".into())
        })?;

        info!(user_id = %user.id, "User logged in successfully");

        Ok(AuthResponse {
            token,
            user: UserProfileDto::from(user),
        })
    }

    pub fn hash_password(password: &SecretString) -> Result<String, ApiError> {
        let argon2 = Self::create_argon2()?;
        let salt = SaltString::generate(&mut OsRng);

        argon2
            .hash_password(password.expose_secret().as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|_| {
                error!("auth.register: password hashing failed");
                ApiError::Internal("Credential processing failed".into())
            })
    }

    fn verify_password(password: &str, user: Option<&User>) -> Result<(), ApiError> {
        // unknown users still pay for one verification
        let hash = user
            .map(|u| u.password_hash.as_str())
            .unwrap_or(Self::dummy_hash());

        let parsed = PasswordHash::new(hash).map_err(|_| {
            error!("auth.login: invalid password hash");
            ApiError::Internal("Authentication failure".into())
        })?;

        let argon2 = Self::create_argon2()?;

        if argon2.verify_password(password.as_bytes(), &parsed).is_err() || user.is_none() {
            warn!("auth.login: invalid credentials");
            return Err(ApiError::Auth(AuthError::InvalidCredentials));
        }

        Ok(())
    }

    pub fn create_argon2() -> Result<Argon2<'static>, ApiError> {
        let params = Params::new(
            65536, // 64 MiB memory
            3,     // iterations
            1,     // parallelism
            None,
        )
        .map_err(|e| {
            error!("Argon2 params error: {}", e);
            ApiError::Internal("Encryption configuration error".to_string())
        })?;

        Ok(Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            params,
        ))
    }

    fn dummy_hash() -> &'static str {
        "$argon2id$v=19$m=65536,t=3,p=1$\
         c29tZXNhbHQ$\
         c29tZWZha2VoYXNo"
    }
}
