use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::config::Config;
use crate::db::Database;
use crate::error::{AppError, Result};
use crate::middleware::Claims;
use crate::models::Admin;

pub const TOKEN_TYPE_ADMIN: &str = "admin";

/// SQLSTATE for "undefined function": the store-side credential check has
/// not been provisioned in this database.
const UNDEFINED_FUNCTION: &str = "42883";

pub struct AuthService {
    db: Database,
    config: Config,
}

impl AuthService {
    pub fn new(db: Database, config: Config) -> Self {
        Self { db, config }
    }

    /// Verify credentials through the store-side procedure and issue a
    /// signed admin credential.
    ///
    /// `verify_admin_credentials` is a black box owned by the platform
    /// database: given username and password it returns zero or one active
    /// admin row. Hashing details never reach this service.
    pub async fn login(&self, username: &str, password: &str) -> Result<(Admin, String)> {
        let admin: Option<Admin> = sqlx::query_as(
            "SELECT id, username, email, first_name, last_name, is_active \
             FROM verify_admin_credentials($1, $2)",
        )
        .bind(username)
        .bind(password)
        .fetch_optional(&self.db.pg)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.code().as_deref() == Some(UNDEFINED_FUNCTION) {
                    return AppError::AuthNotConfigured;
                }
            }
            AppError::Database(e)
        })?;

        let admin = admin.ok_or(AppError::InvalidCredentials)?;

        // Best-effort last-login stamp; a failure here must not fail the login.
        if let Err(e) = sqlx::query("SELECT update_admin_last_login($1)")
            .bind(admin.id)
            .execute(&self.db.pg)
            .await
        {
            tracing::warn!(admin_id = %admin.id, error = %e, "failed to record last login");
        }

        let token = Self::issue_token(
            &admin,
            &self.config.auth.jwt_secret,
            self.config.auth.token_ttl_hours,
        )?;

        Ok((admin, token))
    }

    /// Validate a credential and re-fetch its principal, requiring
    /// `is_active = true`. Token identity alone is never enough.
    pub async fn verify_token(&self, token: &str) -> Result<Admin> {
        let claims = Self::decode_token(token, &self.config.auth.jwt_secret)?;

        let admin_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;

        let admin: Admin = sqlx::query_as(
            "SELECT id, username, email, first_name, last_name, is_active \
             FROM admin_users WHERE id = $1 AND is_active = true",
        )
        .bind(admin_id)
        .fetch_optional(&self.db.pg)
        .await?
        .ok_or(AppError::PrincipalInactive)?;

        Ok(admin)
    }

    pub fn issue_token(admin: &Admin, secret: &str, ttl_hours: i64) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::hours(ttl_hours);

        let claims = Claims {
            sub: admin.id.to_string(),
            username: admin.username.clone(),
            email: admin.email.clone(),
            token_type: TOKEN_TYPE_ADMIN.to_string(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token generation failed: {}", e)))
    }

    pub fn decode_token(token: &str, secret: &str) -> Result<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            // Expired vs malformed matters for the log, not the status code.
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    tracing::debug!("rejected expired token")
                }
                kind => tracing::debug!(?kind, "rejected malformed token"),
            }
            AppError::InvalidToken
        })?;

        if data.claims.token_type != TOKEN_TYPE_ADMIN {
            return Err(AppError::WrongTokenType);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn test_admin() -> Admin {
        Admin {
            id: Uuid::new_v4(),
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            first_name: Some("Ana".to_string()),
            last_name: None,
            is_active: true,
        }
    }

    #[test]
    fn issued_token_carries_admin_type_and_24h_expiry() {
        let admin = test_admin();
        let token = AuthService::issue_token(&admin, SECRET, 24).unwrap();
        let claims = AuthService::decode_token(&token, SECRET).unwrap();

        assert_eq!(claims.token_type, TOKEN_TYPE_ADMIN);
        assert_eq!(claims.sub, admin.id.to_string());
        assert_eq!(claims.username, "ana");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn decoding_is_idempotent() {
        let admin = test_admin();
        let token = AuthService::issue_token(&admin, SECRET, 24).unwrap();

        let first = AuthService::decode_token(&token, SECRET).unwrap();
        let second = AuthService::decode_token(&token, SECRET).unwrap();
        assert_eq!(first.sub, second.sub);
        assert_eq!(first.exp, second.exp);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let admin = test_admin();
        let token = AuthService::issue_token(&admin, "other-secret", 24).unwrap();

        assert!(matches!(
            AuthService::decode_token(&token, SECRET),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let admin = test_admin();
        let now = Utc::now();
        let claims = Claims {
            sub: admin.id.to_string(),
            username: admin.username.clone(),
            email: admin.email.clone(),
            token_type: TOKEN_TYPE_ADMIN.to_string(),
            iat: (now - Duration::hours(25)).timestamp() as usize,
            exp: (now - Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            AuthService::decode_token(&token, SECRET),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn rejects_non_admin_token_type() {
        let admin = test_admin();
        let now = Utc::now();
        let claims = Claims {
            sub: admin.id.to_string(),
            username: admin.username.clone(),
            email: admin.email.clone(),
            token_type: "user".to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            AuthService::decode_token(&token, SECRET),
            Err(AppError::WrongTokenType)
        ));
    }
}
