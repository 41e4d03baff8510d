use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ledger aggregate for one (shift, user) pair. Found-or-created on first
/// clock-in or first code generation, never duplicated.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Clock {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub user_id: Uuid,
    pub created_by_id: Uuid,
    pub require_geo: bool,
    pub require_device_lock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An immutable presence record. Rows are appended once and never rewritten.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClockEvent {
    pub id: Uuid,
    pub clock_id: Uuid,
    #[serde(skip_serializing)]
    pub kind: ClockEventKind,
    pub clock_at: DateTime<Utc>,
    pub method: ClockMethod,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ip_address: Option<String>,
    pub device: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A clock with its in/out events, each collection sorted by `clock_at`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockWithEvents {
    #[serde(flatten)]
    pub clock: Clock,
    pub clock_ins: Vec<ClockEvent>,
    pub clock_outs: Vec<ClockEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockEventKind {
    In,
    Out,
}

impl std::fmt::Display for ClockEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClockEventKind::In => write!(f, "in"),
            ClockEventKind::Out => write!(f, "out"),
        }
    }
}

impl std::str::FromStr for ClockEventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in" => Ok(ClockEventKind::In),
            "out" => Ok(ClockEventKind::Out),
            _ => Err(format!("Invalid clock event kind: {}", s)),
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for ClockEventKind {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for ClockEventKind {
    fn encode_by_ref(
        &self,
        args: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let s = self.to_string();
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&s, args)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for ClockEventKind {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        s.parse::<ClockEventKind>().map_err(|e| e.into())
    }
}

/// How a presence event was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClockMethod {
    Gps,
    Qr,
    Manual,
}

impl std::fmt::Display for ClockMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClockMethod::Gps => write!(f, "gps"),
            ClockMethod::Qr => write!(f, "qr"),
            ClockMethod::Manual => write!(f, "manual"),
        }
    }
}

impl std::str::FromStr for ClockMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gps" => Ok(ClockMethod::Gps),
            "qr" => Ok(ClockMethod::Qr),
            "manual" => Ok(ClockMethod::Manual),
            _ => Err(format!("Invalid clock method: {}", s)),
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for ClockMethod {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for ClockMethod {
    fn encode_by_ref(
        &self,
        args: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let s = self.to_string();
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&s, args)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for ClockMethod {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        s.parse::<ClockMethod>().map_err(|e| e.into())
    }
}

/// Fields recorded with a clock-in or clock-out. `clock_at` defaults to the
/// server time when the caller does not supply one.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockEventInput {
    pub method: ClockMethod,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ip_address: Option<String>,
    pub device: Option<String>,
    pub clock_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeClockInRequest {
    pub code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ip_address: Option<String>,
    pub device: Option<String>,
    pub clock_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClockRulesRequest {
    pub require_geo: Option<bool>,
    pub require_device_lock: Option<bool>,
}
