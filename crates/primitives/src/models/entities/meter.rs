use crate::models::entities::enum_types::MeterStatus;
use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = crate::schema::meters)]
pub struct Meter {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub meter_number: String,
    pub nickname: Option<String>,
    pub status: MeterStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meter {
    /// Unowned meters may be claimed by anyone; owned meters only by their owner.
    pub fn manageable_by(&self, user_id: Uuid) -> bool {
        self.user_id.map_or(true, |owner| owner == user_id)
    }

    pub fn has_nickname(&self) -> bool {
        self.nickname.as_deref().is_some_and(|n| !n.trim().is_empty())
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::meters)]
pub struct NewMeter {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub meter_number: String,
    pub nickname: Option<String>,
    pub status: MeterStatus,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::meters)]
pub struct MeterChanges {
    pub nickname: Option<String>,
    pub status: Option<MeterStatus>,
}

impl MeterChanges {
    pub fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.status.is_none()
    }
}
