//! User accounts, roles and JWT claims

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Role embedded in the token and stored on the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

/// Row of the `users` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(default)]
    pub id: Option<String>,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Insert payload for `users`
#[derive(Debug, Serialize)]
pub struct NewUserAccount<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
}

/// Self-registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued access token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub role: Role,
}

/// Identity extracted from a verified token
#[derive(Debug, Serialize, ToSchema)]
pub struct Identity {
    pub email: String,
    pub role: Role,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User e-mail
    pub sub: String,
    #[serde(default)]
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Admin access required".to_string()))
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            email: self.sub.clone(),
            role: self.role,
        }
    }
}
