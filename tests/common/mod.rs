#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

use timeclock_be::database::init_database;
use timeclock_be::database::models::{ClockEventInput, ClockMethod, NewShift, Shift};
use timeclock_be::database::repositories::ShiftRepository;
use timeclock_be::services::{Claims, UserRole};
use timeclock_be::Config;

// Test database wrapper
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let database_url = format!("sqlite:{}/test.db", temp_dir.path().display());
        let pool = init_database(&database_url).await?;

        Ok(TestDb {
            pool,
            _temp_dir: temp_dir,
        })
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-jwt-secret-key-that-is-long-enough".to_string(),
        clock_code_secret: "test-clock-code-secret".to_string(),
        clock_code_ttl_seconds: 15,
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
    }
}

pub fn bearer_token(config: &Config, user_id: Uuid, role: UserRole, organization_id: Uuid) -> String {
    Claims::new(user_id, role, organization_id, 1)
        .sign(&config.jwt_secret)
        .expect("Failed to sign test token")
}

/// Settings rows are provisioned by the organization collaborator in
/// production, so tests insert them directly.
pub async fn seed_settings(pool: &SqlitePool, organization_id: Uuid) {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO organization_settings (organization_id, require_geo, require_device_lock, minimum_clock_seconds, created_at, updated_at)
        VALUES (?, 0, 0, NULL, ?, ?)
        "#,
    )
    .bind(organization_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .expect("Failed to seed organization settings");
}

pub async fn seed_shift(
    pool: &SqlitePool,
    organization_id: Uuid,
    user_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
) -> Shift {
    let repo = ShiftRepository::new(pool.clone());
    let mut shifts = repo
        .create_shifts(
            organization_id,
            &[NewShift {
                user_id,
                start_time,
                end_time,
            }],
        )
        .await
        .expect("Failed to seed shift");

    shifts.remove(0)
}

pub fn event_input(method: ClockMethod, clock_at: Option<DateTime<Utc>>) -> ClockEventInput {
    ClockEventInput {
        method,
        latitude: Some(52.52),
        longitude: Some(13.405),
        ip_address: Some("127.0.0.1".to_string()),
        device: Some("test-device".to_string()),
        clock_at,
    }
}

pub fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, hour, min, 0).unwrap()
}
