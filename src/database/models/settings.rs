use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-organization clock rules. The row is provisioned when the organization
/// is created, so reads and updates treat a missing row as NotFound.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSettings {
    pub organization_id: Uuid,
    pub require_geo: bool,
    pub require_device_lock: bool,
    pub minimum_clock_seconds: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub require_geo: Option<bool>,
    pub require_device_lock: Option<bool>,
    pub minimum_clock_seconds: Option<i64>,
}
