//! Authentication
//!
//! Tracks login status and identity through a persisted token set.
//!
//! ## Lifecycle
//!
//! - `login` exchanges credentials for access/refresh tokens, user id and
//!   role, and persists them (access token for 2 days, the rest for 7)
//! - `logout` removes every persisted entry
//! - on start, [`AuthSession::restore`] rebuilds the authenticated flag from
//!   the presence of persisted entries, without asking the server
//!
//! Access checks go through [`is_authorized`].

pub mod credentials;

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use credentials::{CredentialError, CredentialStore};

use crate::gateway::{GatewayError, RemoteGateway};
use credentials::{ACCESS_TOKEN, REFRESH_TOKEN, ROLE_NAME, USER_ID};

/// Lifetime of the access token entry
pub const ACCESS_TOKEN_TTL_DAYS: i64 = 2;
/// Lifetime of refresh token, user id and role entries
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Role that gets a warning on login
const ADMIN_ROLE: &str = "admin";

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
}

/// Role as returned by the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RoleName {
    Entry {
        #[serde(rename = "roleName")]
        role_name: String,
    },
    Plain(String),
}

impl RoleName {
    pub fn as_str(&self) -> &str {
        match self {
            RoleName::Entry { role_name } => role_name,
            RoleName::Plain(name) => name,
        }
    }
}

/// Login response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
    #[serde(default)]
    pub role_name: Vec<RoleName>,
}

/// Result of a login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoginResult {
    pub success: bool,
}

/// Result of a registration attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResult {
    pub success: bool,
    pub message: String,
}

/// Access guard
///
/// Authorized when the in-memory flag is set, or when both an access token
/// and a user id are present in durable storage. The second arm covers a
/// restart that happens before the flag is rebuilt.
pub fn is_authorized(is_authenticated: bool, credentials: &CredentialStore) -> bool {
    is_authenticated || (credentials.contains(ACCESS_TOKEN) && credentials.contains(USER_ID))
}

/// Login state for one user
pub struct AuthSession {
    gateway: Arc<dyn RemoteGateway>,
    credentials: CredentialStore,
    is_authenticated: bool,
    user_id: Option<String>,
    access_token: Option<String>,
    role: Option<String>,
}

impl AuthSession {
    /// Rebuild login state from persisted entries
    pub fn restore(gateway: Arc<dyn RemoteGateway>, credentials: CredentialStore) -> Self {
        let mut session = Self {
            gateway,
            credentials,
            is_authenticated: false,
            user_id: None,
            access_token: None,
            role: None,
        };

        let token = session.credentials.get(ACCESS_TOKEN).map(str::to_string);
        let user_id = session.credentials.get(USER_ID).map(str::to_string);
        if let (Some(token), Some(user_id)) = (token, user_id) {
            session.is_authenticated = true;
            session.access_token = Some(token);
            session.user_id = Some(user_id);
            session.role = session.credentials.get(ROLE_NAME).map(str::to_string);
        }

        session
    }

    /// Exchange credentials for a token set and persist it
    ///
    /// Any failure leaves the session logged out with no entries written.
    pub async fn login(&mut self, email: &str, password: &str) -> LoginResult {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = match self.gateway.login(&request).await {
            Ok(response) => response,
            Err(e) => {
                log_login_failure(&e);
                return LoginResult { success: false };
            }
        };

        let Some(role) = response.role_name.first().map(|r| r.as_str().to_string()) else {
            warn!("Login response for {} carried no role", email);
            return LoginResult { success: false };
        };

        let access_ttl = Duration::days(ACCESS_TOKEN_TTL_DAYS);
        let refresh_ttl = Duration::days(REFRESH_TOKEN_TTL_DAYS);
        let persisted = self.credentials.set_many(&[
            (ACCESS_TOKEN, response.access_token.as_str(), access_ttl),
            (REFRESH_TOKEN, response.refresh_token.as_str(), refresh_ttl),
            (USER_ID, response.user_id.as_str(), refresh_ttl),
            (ROLE_NAME, role.as_str(), refresh_ttl),
        ]);
        if let Err(e) = persisted {
            warn!("Failed to persist credentials: {}", e);
            self.clear_entries();
            return LoginResult { success: false };
        }

        self.is_authenticated = true;
        self.user_id = Some(response.user_id);
        self.access_token = Some(response.access_token);

        if role == ADMIN_ROLE {
            warn!("Sudo mode: logged in as admin, please be careful");
        }
        info!("Logged in as {}", email);
        self.role = Some(role);

        LoginResult { success: true }
    }

    /// Forget the token set
    pub fn logout(&mut self) {
        self.clear_entries();
        self.is_authenticated = false;
        self.user_id = None;
        self.access_token = None;
        self.role = None;
        info!("Logged out");
    }

    /// Create an account
    ///
    /// On failure the message is the server's own when it sent one.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> RegisterResult {
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            role: "USER".to_string(),
        };

        match self.gateway.register(&request).await {
            Ok(()) => RegisterResult {
                success: true,
                message: "Registration successful! You can now log in.".to_string(),
            },
            Err(e) => {
                warn!("Registration failed: {}", e);
                RegisterResult {
                    success: false,
                    message: e
                        .server_message()
                        .unwrap_or_else(|| "Registration failed".to_string()),
                }
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// Whether the access guard lets this session through
    pub fn is_authorized(&self) -> bool {
        is_authorized(self.is_authenticated, &self.credentials)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    fn clear_entries(&mut self) {
        if let Err(e) = self.credentials.clear() {
            warn!("Failed to clear credentials: {}", e);
        }
    }
}

fn log_login_failure(error: &GatewayError) {
    match error {
        GatewayError::Server { status, body } => {
            warn!("Login rejected by server ({}): {}", status, body)
        }
        GatewayError::Network(details) => warn!("No response from server: {}", details),
        other => warn!("Login failed: {}", other),
    }
}
