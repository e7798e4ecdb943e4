use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc, time::Duration};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::user::{self, UserRole};

pub mod policy;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub role: String,
    pub company_id: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated user extracted from a validated JWT, carried through
/// request extensions. Every service operation receives it explicitly;
/// there is no ambient session state.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
    pub role: UserRole,
    pub company_id: Uuid,
    pub token_id: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_manager(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::MaintenanceManager)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    ExpiredToken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User account is inactive")]
    UserInactive,
    #[error("Internal authentication error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::MissingAuth => (StatusCode::UNAUTHORIZED, "AUTH_MISSING"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "AUTH_INVALID_TOKEN"),
            Self::ExpiredToken => (StatusCode::UNAUTHORIZED, "AUTH_EXPIRED_TOKEN"),
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "AUTH_INVALID_CREDENTIALS"),
            Self::UserInactive => (StatusCode::FORBIDDEN, "AUTH_USER_INACTIVE"),
            Self::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "AUTH_INTERNAL_ERROR"),
        };

        let message = match &self {
            Self::InternalError(_) => "Internal authentication error".to_string(),
            other => other.to_string(),
        };

        let body = Json(serde_json::json!({
            "error": { "code": code, "message": message }
        }));

        (status, body).into_response()
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, access_token_expiration: Duration) -> Self {
        Self {
            jwt_secret,
            issuer: "gearguard-auth".to_string(),
            audience: "gearguard-api".to_string(),
            access_token_expiration,
        }
    }
}

/// Issued token pair returned to clients on login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Handles password hashing, token issuance and token validation.
#[derive(Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    db: Arc<DatabaseConnection>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::InternalError(format!("password hashing failed: {e}")))
    }

    pub fn verify_password(&self, hash: &str, password: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AuthError::InternalError(format!("stored hash unreadable: {e}")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Issues an access token for the given user.
    pub fn generate_token(&self, user: &user::Model) -> Result<AccessToken, AuthError> {
        let now = Utc::now();
        let expires_in = self.config.access_token_expiration.as_secs();
        let claims = Claims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            role: user.role.to_string(),
            company_id: user.company_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + expires_in as i64,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::InternalError(format!("token encoding failed: {e}")))?;

        Ok(AccessToken {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in,
        })
    }

    /// Validates a token and returns its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })
    }

    /// Verifies credentials against the user store and issues a token.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(user::Model, AccessToken), AuthError> {
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::InternalError(format!("user lookup failed: {e}")))?;

        let user = found.ok_or(AuthError::InvalidCredentials)?;
        if !user.active {
            return Err(AuthError::UserInactive);
        }
        if !self.verify_password(&user.password_hash, password)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.generate_token(&user)?;
        Ok((user, token))
    }
}

fn auth_user_from_claims(claims: &Claims) -> Result<AuthUser, AuthError> {
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
    let company_id = Uuid::parse_str(&claims.company_id).map_err(|_| AuthError::InvalidToken)?;
    let role = UserRole::from_str(&claims.role).map_err(|_| AuthError::InvalidToken)?;

    Ok(AuthUser {
        user_id,
        name: claims.name.clone(),
        role,
        company_id,
        token_id: claims.jti.clone(),
    })
}

/// Authentication middleware: validates the Bearer token and inserts the
/// resulting [`AuthUser`] into request extensions.
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let token = match header_value.as_deref().and_then(|v| v.strip_prefix("Bearer ")) {
        Some(token) => token.trim().to_string(),
        None => return AuthError::MissingAuth.into_response(),
    };

    match auth_service
        .validate_token(&token)
        .and_then(|claims| auth_user_from_claims(&claims))
    {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        let config = AuthConfig::new("0".repeat(64), Duration::from_secs(3600));
        // Token operations never touch the DB; a lazy SQLite handle is enough.
        let db = Arc::new(DatabaseConnection::Disconnected);
        AuthService::new(config, db)
    }

    fn sample_user() -> user::Model {
        let now = Utc::now();
        user::Model {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            department_id: None,
            name: "Dana Smith".into(),
            email: "dana@example.com".into(),
            password_hash: String::new(),
            role: UserRole::Technician,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn password_hash_roundtrip() {
        let svc = service();
        let hash = svc.hash_password("hunter2-but-longer").unwrap();
        assert!(svc.verify_password(&hash, "hunter2-but-longer").unwrap());
        assert!(!svc.verify_password(&hash, "wrong-password").unwrap());
    }

    #[test]
    fn token_roundtrip_preserves_identity() {
        let svc = service();
        let user = sample_user();
        let token = svc.generate_token(&user).unwrap();

        let claims = svc.validate_token(&token.access_token).unwrap();
        let auth_user = auth_user_from_claims(&claims).unwrap();
        assert_eq!(auth_user.user_id, user.id);
        assert_eq!(auth_user.company_id, user.company_id);
        assert_eq!(auth_user.role, UserRole::Technician);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let svc = service();
        let user = sample_user();
        let mut token = svc.generate_token(&user).unwrap().access_token;
        token.push('x');
        assert!(matches!(
            svc.validate_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }
}
