//! Registration, login and token issuance

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand::rngs::OsRng;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        member::{default_member_type, CreateMember},
        user::{NewUserAccount, RegisterRequest, Role, TokenResponse, UserAccount, UserClaims},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a reader: creates the login account (role member) and the
    /// matching member record
    pub async fn register(&self, request: RegisterRequest) -> AppResult<TokenResponse> {
        request.validate()?;

        if self.repository.users.get_by_email(&request.email).await?.is_some() {
            return Err(AppError::Validation("Email already registered".to_string()));
        }

        let password_hash = self.hash_password(&request.password)?;
        let created = self
            .repository
            .users
            .create(&NewUserAccount {
                email: &request.email,
                password_hash: &password_hash,
                role: Role::Member,
            })
            .await?;
        if created.is_empty() {
            return Err(AppError::Internal("Failed to create user".to_string()));
        }

        let full_name = if request.full_name.trim().is_empty() {
            request
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string()
        } else {
            request.full_name.clone()
        };
        let member = CreateMember {
            full_name,
            email: request.email.clone(),
            phone: Some(request.phone.clone()),
            member_type: default_member_type(),
        };
        if self.repository.members.create(&member).await.is_empty() {
            tracing::warn!("User {} registered without a member record", request.email);
        }

        tracing::info!("Registered new member account {}", request.email);
        self.issue_token(&request.email, Role::Member)
    }

    /// Authenticate by e-mail and password
    pub async fn login(&self, email: &str, password: &str) -> AppResult<TokenResponse> {
        let account = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        if !self.verify_password(&account, password) {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        self.issue_token(&account.email, account.role.unwrap_or_default())
    }

    /// Create the configured administrator account if it does not exist yet
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        let (Some(email), Some(password)) = (
            self.config.bootstrap_admin_email.as_deref(),
            self.config.bootstrap_admin_password.as_deref(),
        ) else {
            return Ok(());
        };

        if self.repository.users.get_by_email(email).await?.is_some() {
            return Ok(());
        }

        let password_hash = self.hash_password(password)?;
        self.repository
            .users
            .create(&NewUserAccount {
                email,
                password_hash: &password_hash,
                role: Role::Admin,
            })
            .await?;
        tracing::info!("Created bootstrap admin account {}", email);
        Ok(())
    }

    /// Verify a bearer token
    pub fn verify_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))
    }

    fn issue_token(&self, email: &str, role: Role) -> AppResult<TokenResponse> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: email.to_string(),
            role,
            exp: now + self.config.jwt_expiration_minutes * 60,
            iat: now,
        };

        let access_token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
            role,
        })
    }

    /// A stored hash that is not in PHC format never matches
    fn verify_password(&self, account: &UserAccount, password: &str) -> bool {
        let parsed_hash = match PasswordHash::new(&account.password_hash) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!("Unusable password hash for {}: {}", account.email, e);
                return false;
            }
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repository::tables::{MEMBERS, USERS},
        store::{memory::MemoryTransport, transport::StoreMethod},
    };

    fn service(memory: &MemoryTransport) -> AuthService {
        let config = AuthConfig {
            bootstrap_admin_email: Some("admin@library.com".to_string()),
            bootstrap_admin_password: Some("admin123".to_string()),
            ..AuthConfig::default()
        };
        AuthService::new(Repository::new(memory.store()), config)
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "hunter22".to_string(),
            full_name: String::new(),
            phone: String::new(),
        }
    }

    #[tokio::test]
    async fn test_register_creates_account_and_member() {
        let memory = MemoryTransport::new();
        let auth = service(&memory);

        let token = auth.register(register_request("ada@example.com")).await.unwrap();
        assert_eq!(token.role, Role::Member);
        assert_eq!(token.token_type, "bearer");

        let users = memory.rows(USERS);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["role"], "member");
        assert_ne!(users[0]["password_hash"], "hunter22");

        let members = memory.rows(MEMBERS);
        assert_eq!(members[0]["full_name"], "ada");
        assert_eq!(members[0]["member_type"], "Student");

        let claims = auth.verify_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, "ada@example.com");
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let memory = MemoryTransport::new();
        let auth = service(&memory);
        auth.register(register_request("ada@example.com")).await.unwrap();

        let err = auth.register(register_request("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(memory.rows(USERS).len(), 1);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let memory = MemoryTransport::new();
        let err = service(&memory)
            .register(register_request("not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(memory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_register_surfaces_remote_outage() {
        let memory = MemoryTransport::new();
        memory.fail(StoreMethod::Get, USERS, 1);
        let err = service(&memory)
            .register(register_request("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RemoteUnavailable(_)));
    }

    #[tokio::test]
    async fn test_login() {
        let memory = MemoryTransport::new();
        let auth = service(&memory);
        auth.register(register_request("ada@example.com")).await.unwrap();

        assert!(auth.login("ada@example.com", "hunter22").await.is_ok());
        assert!(matches!(
            auth.login("ada@example.com", "wrong").await,
            Err(AppError::Authentication(_))
        ));
        assert!(matches!(
            auth.login("nobody@example.com", "hunter22").await,
            Err(AppError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_login_with_legacy_hash_is_rejected() {
        let memory = MemoryTransport::new();
        memory.seed(
            USERS,
            vec![serde_json::json!({
                "id": "u1",
                "email": "old@example.com",
                "password_hash": "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8",
                "role": "member"
            })],
        );

        let err = service(&memory).login("old@example.com", "password").await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_bootstrap_admin_is_created_once_with_admin_role() {
        let memory = MemoryTransport::new();
        let auth = service(&memory);

        auth.ensure_bootstrap_admin().await.unwrap();
        auth.ensure_bootstrap_admin().await.unwrap();
        assert_eq!(memory.rows(USERS).len(), 1);

        let token = auth.login("admin@library.com", "admin123").await.unwrap();
        assert_eq!(token.role, Role::Admin);
    }
}
