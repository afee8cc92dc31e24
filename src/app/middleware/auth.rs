use std::sync::Arc;

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordVerifier};
use axum::http::StatusCode;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use keel_core::auth::auth_middleware;

use crate::app::response::ApiError;
use crate::entity::user;
use crate::integrations::database::{Databases, PRIMARY};

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// The caller behind a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

impl keel_core::auth::AuthenticatableUser for AuthUser {
    type Id = String;

    fn get_id(&self) -> Self::Id {
        self.id.clone()
    }

    fn get_username(&self) -> &str {
        &self.email
    }
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// One year.
const MAX_EXPIRY_MINS: i64 = 365 * 24 * 60;

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// HS256 tokens signed with `SECRET_KEY`; passwords checked against the
/// `user` table on the primary connection.
#[derive(Clone)]
pub struct JwtAuthenticator {
    keys: Arc<Keys>,
    expiry_mins: i64,
    databases: Databases,
}

impl JwtAuthenticator {
    pub fn new(secret: &str, expiry_mins: i64, databases: Databases) -> anyhow::Result<Self> {
        if secret.is_empty() {
            anyhow::bail!("the JWT secret must not be empty");
        }
        if !(1..=MAX_EXPIRY_MINS).contains(&expiry_mins) {
            anyhow::bail!("JWT expiry must be between 1 and {MAX_EXPIRY_MINS} minutes, got {expiry_mins}");
        }

        Ok(JwtAuthenticator {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            }),
            expiry_mins,
            databases,
        })
    }

    pub fn expires_in_secs(&self) -> i64 {
        self.expiry_mins * 60
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.keys.decoding, &Validation::default()).map(|data| data.claims)
    }
}

impl keel_core::auth::Authenticator<AuthUser> for JwtAuthenticator {
    type Credentials = LoginRequest;
    type Token = String;
    type Error = ApiError;

    async fn attempt(&self, credentials: LoginRequest) -> Result<AuthUser, ApiError> {
        credentials.validate()?;

        let connection = self
            .databases
            .get(PRIMARY)
            .ok_or_else(|| ApiError::Unavailable(format!("database `{PRIMARY}` is not configured")))?;

        let found = user::Entity::find()
            .filter(user::Column::Email.eq(credentials.email.as_str()))
            .one(connection)
            .await
            .map_err(|err| ApiError::Unavailable(format!("cannot look up user: {err}")))?;

        let Some(found) = found else {
            tracing::debug!(email = %credentials.email, "login for unknown user");

            return Err(ApiError::Unauthorized);
        };

        let hash = PasswordHash::new(&found.password_hash)
            .map_err(|err| ApiError::Internal(anyhow::anyhow!("stored hash for {} is invalid: {err}", found.id)))?;

        Argon2::default()
            .verify_password(credentials.password.as_bytes(), &hash)
            .map_err(|_| ApiError::Unauthorized)?;

        Ok(AuthUser {
            id: found.id.to_string(),
            email: found.email,
        })
    }

    fn generate_token(&self, user: &AuthUser) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            iat: now,
            exp: now
                .checked_add(self.expires_in_secs())
                .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("token expiry overflows")))?,
        };

        encode(&Header::default(), &claims, &self.keys.encoding)
            .map_err(|err| ApiError::Internal(err.into()))
    }

    fn verify_header_name(&self) -> &'static str {
        "authorization"
    }

    async fn verify(&self, token: &str) -> Result<AuthUser, StatusCode> {
        let token = token
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let claims = self.decode_claims(token).map_err(|err| {
            tracing::debug!(error = %err, "rejected token");
            StatusCode::UNAUTHORIZED
        })?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}
