use std::collections::{HashMap, HashSet};

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{
    AdherenceReport, Clock, ClockEvent, ClockEventKind, Shift, ShiftTimingIssue,
};

/// Read-side aggregation over the clock ledger. Nothing is materialized;
/// every report is recomputed from the append-only event rows.
#[derive(Clone)]
pub struct AttendanceRepository {
    pool: SqlitePool,
}

impl AttendanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A shift is covered when its clock has at least one clock-in and at
    /// least one clock-out.
    pub async fn shift_adherence(&self, organization_id: Uuid) -> Result<AdherenceReport> {
        let shifts = self.org_shifts(organization_id).await?;
        let clocks = self.org_clocks(organization_id).await?;
        let events = self.org_events(organization_id).await?;

        let mut has_in: HashSet<Uuid> = HashSet::new();
        let mut has_out: HashSet<Uuid> = HashSet::new();
        for event in &events {
            match event.kind {
                ClockEventKind::In => has_in.insert(event.clock_id),
                ClockEventKind::Out => has_out.insert(event.clock_id),
            };
        }

        let mut covered_shifts: HashSet<Uuid> = HashSet::new();
        for clock in &clocks {
            if has_in.contains(&clock.id) && has_out.contains(&clock.id) {
                covered_shifts.insert(clock.shift_id);
            }
        }

        let total = shifts.len() as i64;
        let covered = shifts
            .iter()
            .filter(|s| covered_shifts.contains(&s.id))
            .count() as i64;

        let adherence_rate = if total > 0 {
            (covered as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        Ok(AdherenceReport {
            total_shifts: total,
            covered_shifts: covered,
            adherence_rate,
        })
    }

    /// Clocks currently inside an open interval: some clock-in at or before
    /// `now` with no clock-out at or before `now`.
    pub async fn clocked_in_count(&self, organization_id: Uuid) -> Result<i64> {
        self.clocked_in_count_at(organization_id, Utc::now()).await
    }

    pub async fn clocked_in_count_at(
        &self,
        organization_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let clocks = self.org_clocks(organization_id).await?;
        let events = self.org_events(organization_id).await?;

        let mut in_before_now: HashSet<Uuid> = HashSet::new();
        let mut out_before_now: HashSet<Uuid> = HashSet::new();
        for event in &events {
            if event.clock_at > now {
                continue;
            }
            match event.kind {
                ClockEventKind::In => in_before_now.insert(event.clock_id),
                ClockEventKind::Out => out_before_now.insert(event.clock_id),
            };
        }

        let count = clocks
            .iter()
            .filter(|c| in_before_now.contains(&c.id) && !out_before_now.contains(&c.id))
            .count() as i64;

        Ok(count)
    }

    /// Late arrivals and early departures, in fractional minutes. First and
    /// last events are determined by `clock_at`, never by storage order.
    pub async fn shift_timing_issues(&self, organization_id: Uuid) -> Result<Vec<ShiftTimingIssue>> {
        let shifts = self.org_shifts(organization_id).await?;
        let clocks = self.org_clocks(organization_id).await?;
        let events = self.org_events(organization_id).await?;

        let clock_shift: HashMap<Uuid, Uuid> =
            clocks.iter().map(|c| (c.id, c.shift_id)).collect();

        let mut first_in: HashMap<Uuid, DateTime<Utc>> = HashMap::new();
        let mut last_out: HashMap<Uuid, DateTime<Utc>> = HashMap::new();
        for event in &events {
            let Some(&shift_id) = clock_shift.get(&event.clock_id) else {
                continue;
            };
            match event.kind {
                ClockEventKind::In => {
                    first_in
                        .entry(shift_id)
                        .and_modify(|at| *at = (*at).min(event.clock_at))
                        .or_insert(event.clock_at);
                }
                ClockEventKind::Out => {
                    last_out
                        .entry(shift_id)
                        .and_modify(|at| *at = (*at).max(event.clock_at))
                        .or_insert(event.clock_at);
                }
            }
        }

        let issues = shifts
            .iter()
            .map(|shift| {
                let late_by_minutes = first_in
                    .get(&shift.id)
                    .map(|at| minutes_between(shift.start_time, *at).max(0.0));
                let left_early_by_minutes = match (last_out.get(&shift.id), shift.end_time) {
                    (Some(at), Some(end)) => Some(minutes_between(*at, end).max(0.0)),
                    _ => None,
                };

                ShiftTimingIssue {
                    shift_id: shift.id,
                    user_id: shift.user_id,
                    late_by_minutes,
                    left_early_by_minutes,
                }
            })
            .filter(|issue| {
                issue.late_by_minutes.unwrap_or(0.0) > 0.0
                    || issue.left_early_by_minutes.unwrap_or(0.0) > 0.0
            })
            .collect();

        Ok(issues)
    }

    async fn org_shifts(&self, organization_id: Uuid) -> Result<Vec<Shift>> {
        let shifts = sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, user_id, organization_id, start_time, end_time, created_at, updated_at
            FROM shifts
            WHERE organization_id = ?
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }

    async fn org_clocks(&self, organization_id: Uuid) -> Result<Vec<Clock>> {
        let clocks = sqlx::query_as::<_, Clock>(
            r#"
            SELECT c.id, c.shift_id, c.user_id, c.created_by_id, c.require_geo,
                   c.require_device_lock, c.created_at, c.updated_at
            FROM clocks c
            INNER JOIN shifts s ON s.id = c.shift_id
            WHERE s.organization_id = ?
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(clocks)
    }

    async fn org_events(&self, organization_id: Uuid) -> Result<Vec<ClockEvent>> {
        let events = sqlx::query_as::<_, ClockEvent>(
            r#"
            SELECT e.id, e.clock_id, e.kind, e.clock_at, e.method, e.latitude,
                   e.longitude, e.ip_address, e.device, e.created_at
            FROM clock_events e
            INNER JOIN clocks c ON c.id = e.clock_id
            INNER JOIN shifts s ON s.id = c.shift_id
            WHERE s.organization_id = ?
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}

fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 60_000.0
}
