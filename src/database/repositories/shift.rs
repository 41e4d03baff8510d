use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{
    NewShift, OrganizationSettings, Shift, UpdateSettingsRequest, UpdateShiftRequest,
};

const SHIFT_COLUMNS: &str =
    "id, user_id, organization_id, start_time, end_time, created_at, updated_at";

#[derive(Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert one row per entry. The batch is a single transaction so a bulk
    /// request never becomes visible half-applied.
    pub async fn create_shifts(
        &self,
        organization_id: Uuid,
        entries: &[NewShift],
    ) -> Result<Vec<Shift>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(entries.len());

        for entry in entries {
            let shift = sqlx::query_as::<_, Shift>(&format!(
                r#"
                INSERT INTO shifts (id, user_id, organization_id, start_time, end_time, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                RETURNING {SHIFT_COLUMNS}
                "#
            ))
            .bind(Uuid::new_v4())
            .bind(entry.user_id)
            .bind(organization_id)
            .bind(entry.start_time)
            .bind(entry.end_time)
            .bind(now)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

            created.push(shift);
        }

        tx.commit().await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Shifts in an organization ordered by start time. When `user_id` is
    /// supplied the result is restricted to that user's own shifts.
    pub async fn find_by_organization(
        &self,
        organization_id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<Vec<Shift>> {
        let shifts = if let Some(user_id) = user_id {
            sqlx::query_as::<_, Shift>(&format!(
                "SELECT {SHIFT_COLUMNS} FROM shifts WHERE organization_id = ? AND user_id = ? ORDER BY start_time"
            ))
            .bind(organization_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Shift>(&format!(
                "SELECT {SHIFT_COLUMNS} FROM shifts WHERE organization_id = ? ORDER BY start_time"
            ))
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(shifts)
    }

    /// An omitted start time keeps the stored one; an omitted end time clears
    /// the scheduled end.
    pub async fn update_shift(
        &self,
        id: Uuid,
        changes: &UpdateShiftRequest,
    ) -> Result<Option<Shift>> {
        let now = Utc::now();
        let shift = sqlx::query_as::<_, Shift>(&format!(
            r#"
            UPDATE shifts
            SET start_time = COALESCE(?, start_time), end_time = ?, updated_at = ?
            WHERE id = ?
            RETURNING {SHIFT_COLUMNS}
            "#
        ))
        .bind(changes.start_time)
        .bind(changes.end_time)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    pub async fn get_settings(&self, organization_id: Uuid) -> Result<Option<OrganizationSettings>> {
        let settings = sqlx::query_as::<_, OrganizationSettings>(
            r#"
            SELECT organization_id, require_geo, require_device_lock, minimum_clock_seconds, created_at, updated_at
            FROM organization_settings
            WHERE organization_id = ?
            "#,
        )
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    pub async fn update_settings(
        &self,
        organization_id: Uuid,
        changes: &UpdateSettingsRequest,
    ) -> Result<Option<OrganizationSettings>> {
        let now = Utc::now();
        let settings = sqlx::query_as::<_, OrganizationSettings>(
            r#"
            UPDATE organization_settings
            SET require_geo = COALESCE(?, require_geo),
                require_device_lock = COALESCE(?, require_device_lock),
                minimum_clock_seconds = COALESCE(?, minimum_clock_seconds),
                updated_at = ?
            WHERE organization_id = ?
            RETURNING organization_id, require_geo, require_device_lock, minimum_clock_seconds, created_at, updated_at
            "#,
        )
        .bind(changes.require_geo)
        .bind(changes.require_device_lock)
        .bind(changes.minimum_clock_seconds)
        .bind(now)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }
}
