use crate::models::entities::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "demo_user")]
    #[validate(length(min = 3, max = 64))]
    pub username: String,

    #[schema(example = "password123", format = "password")]
    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(max = 128))]
    pub full_name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 32))]
    pub phone: Option<String>,

    #[validate(length(max = 256))]
    pub address: Option<String>,
}

impl RegisterRequest {
    pub fn normalize(mut self) -> Self {
        self.username = self.username.trim().to_lowercase();
        self.email = self.email.map(|e| e.trim().to_lowercase());
        self
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "demo_user")]
    #[validate(length(min = 1))]
    pub username: String,

    #[schema(example = "password123", format = "password")]
    #[validate(length(min = 1))]
    pub password: String,
}

impl LoginRequest {
    pub fn normalize(mut self) -> Self {
        self.username = self.username.trim().to_lowercase();
        self
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileDto {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub wallet_balance: i64, // cents
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfileDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            address: user.address,
            wallet_balance: user.wallet_balance,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub user: UserProfileDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}
