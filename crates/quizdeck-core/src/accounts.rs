//! Account registration, login and lookup.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::access::Caller;
use crate::error::{QuizError, QuizResult};
use crate::model::{NewUser, Role, User, UserView};
use crate::traits::Store;
use crate::validation::{validate_registration, RegistrationDraft};

/// Password hashing and token issuance, supplied by the server layer.
pub trait Credentials: Send + Sync {
    fn hash_password(&self, password: &str) -> anyhow::Result<String>;

    fn verify_password(&self, password: &str, hash: &str) -> bool;

    fn issue_token(&self, user: &User) -> anyhow::Result<String>;
}

/// A login request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// A token and the user it was issued for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub message: String,
    pub access_token: String,
    pub user: UserView,
}

/// Account operations over a backing store.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    credentials: Arc<dyn Credentials>,
    allow_admin_registration: bool,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, credentials: Arc<dyn Credentials>) -> Self {
        Self {
            store,
            credentials,
            allow_admin_registration: true,
        }
    }

    pub fn with_admin_registration(mut self, allowed: bool) -> Self {
        self.allow_admin_registration = allowed;
        self
    }

    pub async fn register(&self, draft: &RegistrationDraft) -> QuizResult<AuthSession> {
        let registration = validate_registration(draft)?;
        if registration.role == Role::Admin && !self.allow_admin_registration {
            return Err(QuizError::Forbidden(
                "Admin registration is disabled".into(),
            ));
        }

        if self
            .store
            .find_by_username(&registration.username)
            .await
            .map_err(QuizError::from_store)?
            .is_some()
        {
            return Err(QuizError::Conflict("Username already exists".into()));
        }
        if self
            .store
            .find_by_email(&registration.email)
            .await
            .map_err(QuizError::from_store)?
            .is_some()
        {
            return Err(QuizError::Conflict("Email already exists".into()));
        }

        let password_hash = self
            .credentials
            .hash_password(&registration.password)
            .map_err(QuizError::Storage)?;
        let user = self
            .store
            .create_user(&NewUser {
                username: registration.username,
                email: registration.email,
                password_hash,
                role: registration.role,
            })
            .await
            .map_err(QuizError::from_store)?;
        tracing::info!(user_id = user.id, role = %user.role, "user registered");

        self.session(&user, "User registered successfully")
    }

    pub async fn login(&self, request: &LoginRequest) -> QuizResult<AuthSession> {
        let login = request.username.as_deref().unwrap_or("").trim();
        let password = request.password.as_deref().unwrap_or("");
        if login.is_empty() {
            return Err(QuizError::Validation("Username or email is required".into()));
        }
        if password.is_empty() {
            return Err(QuizError::Validation("Password is required".into()));
        }

        let user = self
            .store
            .find_by_login(login)
            .await
            .map_err(QuizError::from_store)?;
        let Some(user) = user.filter(|u| self.credentials.verify_password(password, &u.password_hash))
        else {
            tracing::warn!(login, "failed login attempt");
            return Err(QuizError::InvalidCredentials);
        };

        self.session(&user, "Login successful")
    }

    /// The caller's own account.
    pub async fn current_user(&self, caller: &Caller) -> QuizResult<UserView> {
        let identity = caller.require_identity()?;
        self.store
            .get_user(identity.user_id)
            .await
            .map_err(QuizError::from_store)?
            .map(|u| u.view())
            .ok_or_else(|| QuizError::NotFound("User not found".into()))
    }

    fn session(&self, user: &User, message: &str) -> QuizResult<AuthSession> {
        let access_token = self
            .credentials
            .issue_token(user)
            .map_err(QuizError::Storage)?;
        Ok(AuthSession {
            message: message.into(),
            access_token,
            user: user.view(),
        })
    }
}
