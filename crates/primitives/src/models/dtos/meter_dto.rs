use crate::models::entities::enum_types::MeterStatus;
use crate::models::entities::meter::Meter;
use crate::utility::validate_meter_number;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeterRequest {
    #[schema(example = "12345678901")]
    #[validate(custom(function = "validate_meter_number"))]
    pub meter_number: String,

    #[schema(example = "Home")]
    #[validate(length(min = 1, max = 64))]
    pub nickname: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeterRequest {
    #[validate(length(min = 1, max = 64))]
    pub nickname: Option<String>,
    pub status: Option<MeterStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeterDto {
    pub id: Uuid,
    pub meter_number: String,
    pub nickname: Option<String>,
    pub status: MeterStatus,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Meter> for MeterDto {
    fn from(meter: Meter) -> Self {
        Self {
            id: meter.id,
            meter_number: meter.meter_number,
            nickname: meter.nickname,
            status: meter.status,
            user_id: meter.user_id,
            created_at: meter.created_at,
            updated_at: meter.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MetersResponse {
    pub meters: Vec<MeterDto>,
}
