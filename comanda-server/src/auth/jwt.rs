//! JWT token service
//!
//! Token generation, validation and parsing.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use shared::{Actor, Role};
use thiserror::Error;

use crate::db::models::Employee;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    /// Token lifetime in minutes
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, generating an ephemeral secret");
            generate_printable_secret()
        });

        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "comanda-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "comanda-clients".to_string()),
        }
    }
}

/// Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Employee id (subject, "employee:xxx")
    pub sub: String,
    pub username: String,
    /// Display name
    pub name: String,
    /// Role name
    pub role: String,
    /// Expiry timestamp
    pub exp: i64,
    /// Issued-at timestamp
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

/// JWT errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// Generate a printable secret for development use
fn generate_printable_secret() -> String {
    let allowed =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";
    let rng = SystemRandom::new();
    let mut key = String::with_capacity(64);
    for _ in 0..64 {
        let mut byte = [0u8; 1];
        if rng.fill(&mut byte).is_err() {
            return "comanda-development-secret-must-be-replaced".to_string();
        }
        let idx = (byte[0] as usize) % allowed.len();
        key.push(allowed.as_bytes()[idx] as char);
    }
    key
}

/// JWT service
#[derive(Debug, Clone)]
pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// Issue a token for an authenticated employee
    pub fn generate_token(&self, employee: &Employee) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: employee.id_string(),
            username: employee.username.clone(),
            name: employee.display_name.clone(),
            role: employee.role.as_str().to_string(),
            exp: (now + Duration::minutes(self.config.expiration_minutes)).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate a token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
            _ => JwtError::InvalidToken(e.to_string()),
        })
    }

    /// Extract the bearer token from an Authorization header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new(JwtConfig::default())
    }
}

/// Authenticated user context, injected into request extensions by the
/// auth middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Employee id ("employee:xxx")
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
}

impl CurrentUser {
    /// The explicit actor handed to every engine operation
    pub fn actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.display_name.clone(), self.role)
    }
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, JwtError> {
        let role = Role::parse(&claims.role)
            .ok_or_else(|| JwtError::InvalidToken(format!("Unknown role: {}", claims.role)))?;
        Ok(Self {
            id: claims.sub,
            username: claims.username,
            display_name: claims.name,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_employee(role: Role) -> Employee {
        Employee {
            id: Some("employee:w1".parse().unwrap()),
            username: "ana".to_string(),
            display_name: "Ana".to_string(),
            hash_pass: String::new(),
            role,
            is_active: true,
            created_at: 0,
        }
    }

    fn test_service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret-test-secret-test-secret!".to_string(),
            expiration_minutes: 60,
            issuer: "comanda-server".to_string(),
            audience: "comanda-clients".to_string(),
        })
    }

    #[test]
    fn token_roundtrip() {
        let service = test_service();
        let token = service.generate_token(&test_employee(Role::Waiter)).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "employee:w1");
        assert_eq!(claims.role, "waiter");

        let user = CurrentUser::try_from(claims).unwrap();
        assert_eq!(user.role, Role::Waiter);
        assert_eq!(user.actor().name, "Ana");
    }

    #[test]
    fn tampered_token_rejected() {
        let service = test_service();
        let token = service.generate_token(&test_employee(Role::Owner)).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(service.validate_token(&tampered).is_err());
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
