use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};

/// User identifiers arrive either as strings (UUIDs) or plain integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Text(String),
    Number(i64),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Text(id) => f.write_str(id),
            UserId::Number(id) => write!(f, "{}", id),
        }
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId::Text(id.to_string())
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId::Number(id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: UserId,
    pub email: String,
    pub user_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// Identity attached to a request once its token has been verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub id: UserId,
    pub email: String,
    pub user_type: String,
    pub is_authenticated: bool,
}

impl From<Claims> for UserContext {
    fn from(claims: Claims) -> Self {
        UserContext {
            id: claims.user_id,
            email: claims.email,
            user_type: claims.user_type,
            is_authenticated: true,
        }
    }
}

pub struct AuthService {
    jwt_config: JwtConfig,
}

impl AuthService {
    pub fn new(jwt_config: JwtConfig) -> Self {
        Self { jwt_config }
    }

    fn secret(&self) -> AppResult<&[u8]> {
        self.jwt_config
            .secret
            .as_deref()
            .map(str::as_bytes)
            .ok_or_else(|| AppError::ConfigError("JWT secret is not configured".to_string()))
    }

    /// HMAC tokens of any width, no clock leeway, `exp` and `nbf` enforced
    /// only when present.
    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.required_spec_claims.clear();
        validation.validate_aud = false;
        validation.validate_nbf = true;
        validation.leeway = 0;
        validation
    }

    pub fn generate_token(
        &self,
        user_id: impl Into<UserId>,
        email: &str,
        user_type: &str,
    ) -> AppResult<String> {
        let now = Utc::now();
        let expire = now + Duration::hours(self.jwt_config.expire_hours);

        let claims = Claims {
            user_id: user_id.into(),
            email: email.to_string(),
            user_type: user_type.to_string(),
            exp: Some(expire.timestamp()),
            iat: Some(now.timestamp()),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret()?),
        )
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {}", e)))
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret()?),
            &Self::validation(),
        )?;

        Ok(token_data.claims)
    }

    /// Resolve a token to a user, or `None` for anything that does not verify.
    pub fn authenticate(&self, token: &str) -> Option<UserContext> {
        match self.verify_token(token) {
            Ok(claims) => Some(UserContext::from(claims)),
            Err(e) => {
                tracing::debug!("Continuing anonymously: {}", e);
                None
            }
        }
    }
}
