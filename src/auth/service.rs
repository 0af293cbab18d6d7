use chrono::Duration;
use std::sync::Arc;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, verify_password, PasswordPolicy};
use crate::auth::{AuthError, AuthResponse, JwtService, LoginRequest, RegisterRequest, UserRole};
use crate::config::AppConfig;
use crate::models::{NewUser, UserProfile};
use crate::store::{Store, StoreError};

#[derive(Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    store: Arc<dyn Store>,
    password_policy: PasswordPolicy,
    bcrypt_cost: u32,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("jwt_service", &self.jwt_service)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, config: &AppConfig) -> Self {
        Self {
            jwt_service: JwtService::new(
                &config.jwt_secret,
                Duration::hours(config.token_ttl_hours),
            ),
            store,
            password_policy: PasswordPolicy::default(),
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    /// Register a new account with the `user` role
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let request = RegisterRequest {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            password: request.password,
        };
        request.validate()?;
        validate_password_strength(&request.password, &self.password_policy)?;

        let email = request.email;
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(&request.password, self.bcrypt_cost)?;

        let user = self
            .store
            .insert_user(NewUser {
                name: request.name,
                email,
                password_hash,
                role: UserRole::User,
            })
            .await
            .map_err(|err| match err {
                StoreError::Conflict(_) => AuthError::EmailAlreadyExists,
                other => AuthError::Store(other),
            })?;

        tracing::info!(user_id = %user.id, "account registered");

        let token = self.jwt_service.create_token(user.id)?;
        Ok(AuthResponse {
            success: true,
            token,
            user: user.into(),
        })
    }

    /// Login with email and password
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = request.email.trim().to_lowercase();
        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt_service.create_token(user.id)?;
        Ok(AuthResponse {
            success: true,
            token,
            user: user.into(),
        })
    }

    /// Resolve a token to the account it was issued for, without the credential
    pub async fn authenticate(&self, token: &str) -> Result<UserProfile, AuthError> {
        let user_id = self.jwt_service.extract_user_id(token)?;

        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.into())
    }

    #[cfg(test)]
    fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }
}
