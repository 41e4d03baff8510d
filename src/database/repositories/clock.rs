use anyhow::{Result, anyhow};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{
    Clock, ClockEvent, ClockEventInput, ClockEventKind, ClockWithEvents, UpdateClockRulesRequest,
};

const CLOCK_COLUMNS: &str =
    "id, shift_id, user_id, created_by_id, require_geo, require_device_lock, created_at, updated_at";

const EVENT_COLUMNS: &str =
    "id, clock_id, kind, clock_at, method, latitude, longitude, ip_address, device, created_at";

#[derive(Clone)]
pub struct ClockRepository {
    pool: SqlitePool,
}

impl ClockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Clock>> {
        let clock = sqlx::query_as::<_, Clock>(&format!(
            "SELECT {CLOCK_COLUMNS} FROM clocks WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(clock)
    }

    pub async fn find_by_pair(&self, shift_id: Uuid, user_id: Uuid) -> Result<Option<Clock>> {
        let clock = sqlx::query_as::<_, Clock>(&format!(
            "SELECT {CLOCK_COLUMNS} FROM clocks WHERE shift_id = ? AND user_id = ?"
        ))
        .bind(shift_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(clock)
    }

    /// At most one clock exists per (shift, user). The UNIQUE constraint is the
    /// arbiter under concurrent creates: losing the race means the row exists,
    /// so re-read it instead of failing.
    pub async fn find_or_create(
        &self,
        shift_id: Uuid,
        user_id: Uuid,
        created_by_id: Uuid,
    ) -> Result<Clock> {
        if let Some(clock) = self.find_by_pair(shift_id, user_id).await? {
            return Ok(clock);
        }

        let now = Utc::now();
        let inserted = sqlx::query_as::<_, Clock>(&format!(
            r#"
            INSERT INTO clocks (id, shift_id, user_id, created_by_id, require_geo, require_device_lock, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, 0, ?, ?)
            RETURNING {CLOCK_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(shift_id)
        .bind(user_id)
        .bind(created_by_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(clock) => Ok(clock),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => self
                .find_by_pair(shift_id, user_id)
                .await?
                .ok_or_else(|| anyhow!("clock missing after unique violation")),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn clock_in(
        &self,
        shift_id: Uuid,
        user_id: Uuid,
        created_by_id: Uuid,
        input: &ClockEventInput,
    ) -> Result<ClockWithEvents> {
        let clock = self.find_or_create(shift_id, user_id, created_by_id).await?;
        self.append_event(clock.id, ClockEventKind::In, input).await?;
        self.with_events(clock).await
    }

    /// Clocking out never creates the ledger; returns None when no clock
    /// exists for the pair.
    pub async fn clock_out(
        &self,
        shift_id: Uuid,
        user_id: Uuid,
        input: &ClockEventInput,
    ) -> Result<Option<ClockWithEvents>> {
        let Some(clock) = self.find_by_pair(shift_id, user_id).await? else {
            return Ok(None);
        };

        self.append_event(clock.id, ClockEventKind::Out, input).await?;

        Ok(Some(self.with_events(clock).await?))
    }

    /// Clock-in via a verified proof code. The embedded clock id must match an
    /// existing (clock, shift, user) triple; returns None otherwise.
    pub async fn clock_in_with_code(
        &self,
        clock_id: Uuid,
        shift_id: Uuid,
        user_id: Uuid,
        input: &ClockEventInput,
    ) -> Result<Option<ClockWithEvents>> {
        let clock = sqlx::query_as::<_, Clock>(&format!(
            "SELECT {CLOCK_COLUMNS} FROM clocks WHERE id = ? AND shift_id = ? AND user_id = ?"
        ))
        .bind(clock_id)
        .bind(shift_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(clock) = clock else {
            return Ok(None);
        };

        self.append_event(clock.id, ClockEventKind::In, input).await?;

        Ok(Some(self.with_events(clock).await?))
    }

    pub async fn find_by_shift(&self, shift_id: Uuid) -> Result<Vec<ClockWithEvents>> {
        let clocks = sqlx::query_as::<_, Clock>(&format!(
            "SELECT {CLOCK_COLUMNS} FROM clocks WHERE shift_id = ?"
        ))
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(clocks.len());
        for clock in clocks {
            result.push(self.with_events(clock).await?);
        }

        Ok(result)
    }

    pub async fn update_rules(
        &self,
        clock_id: Uuid,
        changes: &UpdateClockRulesRequest,
    ) -> Result<Option<Clock>> {
        let now = Utc::now();
        let clock = sqlx::query_as::<_, Clock>(&format!(
            r#"
            UPDATE clocks
            SET require_geo = COALESCE(?, require_geo),
                require_device_lock = COALESCE(?, require_device_lock),
                updated_at = ?
            WHERE id = ?
            RETURNING {CLOCK_COLUMNS}
            "#
        ))
        .bind(changes.require_geo)
        .bind(changes.require_device_lock)
        .bind(now)
        .bind(clock_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(clock)
    }

    async fn append_event(
        &self,
        clock_id: Uuid,
        kind: ClockEventKind,
        input: &ClockEventInput,
    ) -> Result<ClockEvent> {
        let now = Utc::now();
        let event = sqlx::query_as::<_, ClockEvent>(&format!(
            r#"
            INSERT INTO clock_events (id, clock_id, kind, clock_at, method, latitude, longitude, ip_address, device, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(clock_id)
        .bind(kind)
        .bind(input.clock_at.unwrap_or(now))
        .bind(input.method)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.ip_address.as_deref())
        .bind(input.device.as_deref())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Callers may backfill historical timestamps, so event ordering is always
    /// re-derived from `clock_at`, never from insertion order.
    async fn with_events(&self, clock: Clock) -> Result<ClockWithEvents> {
        let mut events = sqlx::query_as::<_, ClockEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM clock_events WHERE clock_id = ?"
        ))
        .bind(clock.id)
        .fetch_all(&self.pool)
        .await?;

        events.sort_by_key(|e| e.clock_at);

        let (clock_ins, clock_outs) = events
            .into_iter()
            .partition(|e| e.kind == ClockEventKind::In);

        Ok(ClockWithEvents {
            clock,
            clock_ins,
            clock_outs,
        })
    }
}
