use actix_web::{
    Error as ActixError, FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized,
    web::Data,
};
use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    Manager,
    Employee,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "ADMIN"),
            UserRole::Manager => write!(f, "MANAGER"),
            UserRole::Employee => write!(f, "EMPLOYEE"),
        }
    }
}

/// The acting principal, resolved from the bearer token on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub role: UserRole,
    pub organization_id: Uuid,
    pub exp: usize, // expiration time
}

impl Claims {
    pub fn new(user_id: Uuid, role: UserRole, organization_id: Uuid, valid_days: i64) -> Self {
        let exp = (Utc::now() + Duration::days(valid_days)).timestamp() as usize;

        Claims {
            sub: user_id,
            role,
            organization_id,
            exp,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_manager(&self) -> bool {
        self.role == UserRole::Manager
    }

    pub fn is_manager_or_admin(&self) -> bool {
        self.is_manager() || self.is_admin()
    }

    pub fn require_manager(&self) -> Result<(), AppError> {
        if self.is_manager_or_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Manager or admin role required".to_string(),
            ))
        }
    }

    pub fn require_same_organization(&self, organization_id: Uuid) -> Result<(), AppError> {
        if self.organization_id == organization_id {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have access to this organization".to_string(),
            ))
        }
    }

    /// Employees may only touch their own records; managers and admins may
    /// touch any record in their organization.
    pub fn require_self_or_manager(&self, user_id: Uuid) -> Result<(), AppError> {
        if self.sub == user_id || self.is_manager_or_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have access to this user's records".to_string(),
            ))
        }
    }

    pub fn sign(&self, secret: &str) -> Result<String> {
        let token = encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_ref()),
        )?;

        Ok(token)
    }

    pub fn verify(token: &str, secret: &str) -> Result<Self> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth_header = req.headers().get("Authorization");

        if let Some(auth_header) = auth_header {
            if let Ok(auth_str) = auth_header.to_str() {
                if let Some(token) = auth_str.strip_prefix("Bearer ") {
                    // Get the config from app data
                    if let Some(config) = req.app_data::<Data<Config>>() {
                        return match Claims::verify(token, &config.jwt_secret) {
                            Ok(claims) => ready(Ok(claims)),
                            Err(_) => ready(Err(ErrorUnauthorized("Invalid token"))),
                        };
                    }
                }
            }
        }

        ready(Err(ErrorUnauthorized(
            "Missing or invalid authorization header",
        )))
    }
}
