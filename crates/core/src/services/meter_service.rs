use crate::app_state::AppState;
use crate::repositories::{MeterClaim, MeterResolution};
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::meter_dto::{CreateMeterRequest, MeterDto, UpdateMeterRequest};
use meterpay_primitives::models::entities::enum_types::MeterStatus;
use meterpay_primitives::models::entities::meter::{Meter, MeterChanges};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

pub struct MeterService;

impl MeterService {
    /// Registers a meter for the user. Repeating the call is harmless; the
    /// second element tells whether a new meter was created.
    pub async fn register_meter(
        state: &AppState,
        user_id: Uuid,
        req: CreateMeterRequest,
    ) -> Result<(MeterDto, bool), ApiError> {
        req.validate()?;

        let meter_number = req.meter_number.trim().to_string();

        if let Some(existing) = state.store.find_meter_by_number(&meter_number)? {
            if !existing.manageable_by(user_id) {
                warn!(user_id = %user_id, meter_number = %meter_number, "meters.create: owned by another user");
                return Err(ApiError::Conflict(
                    "Meter is registered to another account".into(),
                ));
            }
        }

        let resolution = state.store.resolve_meter(MeterClaim {
            user_id,
            meter_number,
            nickname: clean_nickname(req.nickname),
        })?;

        let created = resolution.was_created();
        let meter = resolution.into_meter();

        info!(
            user_id = %user_id,
            meter_id = %meter.id,
            created,
            "meters.create: meter resolved"
        );

        Ok((MeterDto::from(meter), created))
    }

    /// Get-or-create used by purchases. Inactive meters are refused before
    /// anything is written.
    pub fn resolve_for_purchase(
        state: &AppState,
        user_id: Uuid,
        meter_number: &str,
        nickname: Option<String>,
    ) -> Result<Meter, ApiError> {
        if let Some(existing) = state.store.find_meter_by_number(meter_number)? {
            if existing.status == MeterStatus::Inactive {
                return Err(ApiError::BadRequest(format!(
                    "Meter {} is inactive",
                    meter_number
                )));
            }
        }

        let resolution = state.store.resolve_meter(MeterClaim {
            user_id,
            meter_number: meter_number.to_string(),
            nickname: clean_nickname(nickname),
        })?;

        if let MeterResolution::Created(meter) = &resolution {
            info!(user_id = %user_id, meter_id = %meter.id, "meters.resolve: created on purchase");
        }

        Ok(resolution.into_meter())
    }

    pub async fn get_meter(
        state: &AppState,
        user_id: Uuid,
        meter_id: Uuid,
    ) -> Result<MeterDto, ApiError> {
        Self::owned_meter(state, user_id, meter_id).map(MeterDto::from)
    }

    pub async fn update_meter(
        state: &AppState,
        user_id: Uuid,
        meter_id: Uuid,
        req: UpdateMeterRequest,
    ) -> Result<MeterDto, ApiError> {
        req.validate()?;

        let changes = MeterChanges {
            nickname: clean_nickname(req.nickname),
            status: req.status,
        };

        if changes.is_empty() {
            return Err(ApiError::BadRequest("Nothing to update".into()));
        }

        Self::owned_meter(state, user_id, meter_id)?;
        let meter = state.store.update_meter(meter_id, changes)?;

        info!(user_id = %user_id, meter_id = %meter.id, status = %meter.status, "meters.update: meter updated");
        Ok(MeterDto::from(meter))
    }

    fn owned_meter(state: &AppState, user_id: Uuid, meter_id: Uuid) -> Result<Meter, ApiError> {
        state
            .store
            .find_meter(meter_id)?
            .filter(|m| m.user_id == Some(user_id))
            .ok_or_else(|| ApiError::NotFound("Meter not found".into()))
    }
}

fn clean_nickname(nickname: Option<String>) -> Option<String> {
    nickname
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}
