use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const CODE_VERSION: &str = "v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClockCodeError {
    #[error("malformed code")]
    InvalidFormat,

    #[error("signature mismatch")]
    InvalidSignature,

    #[error("code expired")]
    Expired,

    #[error("code was issued for a different shift")]
    ShiftMismatch,

    #[error("code was issued for a different user")]
    UserMismatch,
}

/// What the signed payload binds together. Carrying shift and user inside the
/// signature is what stops a code from being replayed across shifts or users.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClockCodeClaims {
    clock_id: Uuid,
    shift_id: Uuid,
    user_id: Uuid,
    expires_at: i64, // epoch milliseconds
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedClockCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies short-lived proof-of-presence codes. The signing secret
/// and validity window are injected at construction; clients render the code
/// string as a scannable image.
#[derive(Clone)]
pub struct ClockCodeService {
    secret: Vec<u8>,
    ttl: Duration,
}

impl ClockCodeService {
    pub fn new(secret: impl AsRef<[u8]>, ttl_seconds: i64) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    pub fn issue(
        &self,
        clock_id: Uuid,
        shift_id: Uuid,
        user_id: Uuid,
    ) -> Result<IssuedClockCode, ClockCodeError> {
        self.issue_at(clock_id, shift_id, user_id, Utc::now())
    }

    pub fn issue_at(
        &self,
        clock_id: Uuid,
        shift_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<IssuedClockCode, ClockCodeError> {
        let expires_at = now + self.ttl;
        let claims = ClockCodeClaims {
            clock_id,
            shift_id,
            user_id,
            expires_at: expires_at.timestamp_millis(),
        };

        let payload_bytes =
            serde_json::to_vec(&claims).map_err(|_| ClockCodeError::InvalidFormat)?;
        let payload_part = URL_SAFE_NO_PAD.encode(payload_bytes);

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| ClockCodeError::InvalidFormat)?;
        mac.update(payload_part.as_bytes());
        let sig_part = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(IssuedClockCode {
            code: format!("{}.{}.{}", CODE_VERSION, payload_part, sig_part),
            expires_at,
        })
    }

    /// Returns the embedded clock id. Checks run format, then signature, then
    /// expiry, then shift/user binding; tampering with the payload can only
    /// ever surface as a signature mismatch.
    pub fn verify(
        &self,
        code: &str,
        shift_id: Uuid,
        user_id: Uuid,
    ) -> Result<Uuid, ClockCodeError> {
        self.verify_at(code, shift_id, user_id, Utc::now())
    }

    pub fn verify_at(
        &self,
        code: &str,
        shift_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Uuid, ClockCodeError> {
        let (payload_part, sig_part) = parse_code_parts(code)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| ClockCodeError::InvalidFormat)?;
        mac.update(payload_part.as_bytes());
        let signature = URL_SAFE_NO_PAD
            .decode(sig_part)
            .map_err(|_| ClockCodeError::InvalidFormat)?;
        mac.verify_slice(&signature)
            .map_err(|_| ClockCodeError::InvalidSignature)?;

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|_| ClockCodeError::InvalidFormat)?;
        let claims: ClockCodeClaims =
            serde_json::from_slice(&payload_bytes).map_err(|_| ClockCodeError::InvalidFormat)?;

        if now.timestamp_millis() > claims.expires_at {
            return Err(ClockCodeError::Expired);
        }
        if claims.shift_id != shift_id {
            return Err(ClockCodeError::ShiftMismatch);
        }
        if claims.user_id != user_id {
            return Err(ClockCodeError::UserMismatch);
        }

        Ok(claims.clock_id)
    }
}

fn parse_code_parts(code: &str) -> Result<(&str, &str), ClockCodeError> {
    let parts: Vec<&str> = code.split('.').collect();
    match parts.as_slice() {
        [version, payload, sig] if *version == CODE_VERSION => Ok((payload, sig)),
        _ => Err(ClockCodeError::InvalidFormat),
    }
}
