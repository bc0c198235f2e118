//! User registration and login. Passwords are stored as argon2 hashes and a
//! successful login returns an HS256 JWT.

use crate::{
    db::DbPool,
    entities::user::{self, Entity as UserEntity},
    errors::ServiceError,
    services::equals_ci,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use metrics::counter;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

const TOKEN_ISSUER: &str = "bikeshop-api";
const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterInput {
    #[validate(length(min = 3, max = 64, message = "username must be 3 to 64 characters"))]
    pub username: String,
    #[validate(length(min = 8, max = 128, message = "password must be 8 to 128 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginInput {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisteredUser {
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub jti: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub iss: String,
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::rand_core::OsRng;
    use argon2::password_hash::SaltString;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Signs and checks login tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Arc<str>,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            secret: Arc::from(secret),
            ttl,
        }
    }

    pub fn issue(&self, account: &user::Model) -> Result<TokenResponse, ServiceError> {
        let now = Utc::now().timestamp();
        let ttl = self.ttl.as_secs();
        let claims = Claims {
            sub: account.user_id.to_string(),
            username: account.username.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            nbf: now,
            exp: now + ttl as i64,
            iss: TOKEN_ISSUER.to_string(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("token creation failed: {}", e)))?;

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: ttl,
        })
    }

    /// Checks signature, issuer and expiry.
    pub fn validate(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                ServiceError::Unauthorized("Token expired".to_string())
            }
            _ => ServiceError::Unauthorized("Invalid token".to_string()),
        })
    }
}

#[derive(Clone)]
pub struct AuthService {
    db_pool: Arc<DbPool>,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(db_pool: Arc<DbPool>, tokens: TokenIssuer) -> Self {
        Self { db_pool, tokens }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Creates an account. Usernames are unique ignoring case.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<RegisteredUser, ServiceError> {
        let username = input.username.trim().to_string();
        RegisterInput {
            username: username.clone(),
            password: input.password.clone(),
        }
        .validate()?;

        let db = &*self.db_pool;
        let taken = UserEntity::find()
            .filter(equals_ci(user::Column::Username, &username))
            .one(db)
            .await
            .map_err(|e| ServiceError::db("find_user", e))?;
        if taken.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Username {} is already taken",
                username
            )));
        }

        let password = input.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| ServiceError::InternalError(format!("hashing task failed: {}", e)))?
            .map_err(|e| ServiceError::InternalError(format!("password hashing failed: {}", e)))?;

        let model = user::ActiveModel {
            user_id: Set(Uuid::new_v4()),
            username: Set(username),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(|e| ServiceError::db("create_user", e))?;

        counter!("bikeshop.auth.registrations", 1);
        info!(user_id = %model.user_id, "User registered");
        Ok(RegisteredUser {
            user_id: model.user_id,
            username: model.username,
        })
    }

    /// Checks the credentials and issues a token. Unknown users and wrong
    /// passwords produce the same error.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<TokenResponse, ServiceError> {
        input.validate()?;
        let found = UserEntity::find()
            .filter(equals_ci(user::Column::Username, input.username.trim()))
            .one(&*self.db_pool)
            .await
            .map_err(|e| ServiceError::db("find_user", e))?;

        let Some(account) = found else {
            counter!("bikeshop.auth.login_failures", 1);
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let password = input.password;
        let hash = account.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| ServiceError::InternalError(format!("verify task failed: {}", e)))?;
        if !valid {
            counter!("bikeshop.auth.login_failures", 1);
            warn!(user_id = %account.user_id, "login rejected");
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let response = self.tokens.issue(&account)?;
        counter!("bikeshop.auth.logins", 1);
        info!(user_id = %account.user_id, "User logged in");
        Ok(response)
    }
}
