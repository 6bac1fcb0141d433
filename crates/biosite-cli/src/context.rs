//! Per-invocation state shared by command handlers

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};

use biosite_core::auth::credentials::ACCESS_TOKEN;
use biosite_core::{
    AuthSession, Config, CredentialStore, HttpGateway, Outcome, RemoteGateway, SiteSession,
};

use crate::output::Output;

/// Configuration, gateway and login state for one command
pub struct AppContext {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    gateway: Arc<dyn RemoteGateway>,
    pub auth: AuthSession,
}

impl AppContext {
    /// Load configuration and persisted credentials
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config = Config::load_with_cli_override(config_path.as_ref())
            .context("Failed to load configuration")?;
        let credentials = CredentialStore::open(config.credentials_path())?;

        let token = credentials.get(ACCESS_TOKEN).map(str::to_string);
        let gateway: Arc<dyn RemoteGateway> =
            Arc::new(HttpGateway::new(&config)?.with_token(token));
        let auth = AuthSession::restore(gateway.clone(), credentials);

        Ok(Self {
            config,
            config_path,
            gateway,
            auth,
        })
    }

    /// User id of the logged-in user, or an error pointing at `login`
    pub fn require_user(&self) -> Result<String> {
        if !self.auth.is_authorized() {
            bail!("Not logged in. Run `biosite login` first.");
        }
        match self.auth.user_id() {
            Some(id) => Ok(id.to_string()),
            None => bail!("Session has no user id. Run `biosite login` again."),
        }
    }

    pub fn gateway(&self) -> &dyn RemoteGateway {
        self.gateway.as_ref()
    }

    /// Load the user's biosite into a fresh session
    pub async fn open_session(&self) -> Result<SiteSession> {
        let user_id = self.require_user()?;
        let mut session = SiteSession::new(self.gateway.clone());
        match session.load(&user_id).await {
            Outcome::Success => Ok(session),
            outcome => bail!(outcome
                .message()
                .unwrap_or("Failed to load biosite")
                .to_string()),
        }
    }
}

/// Turn a session outcome into command output
///
/// Success prints the session's notification; anything else is an error.
pub fn finish(session: &SiteSession, outcome: Outcome, output: &Output) -> Result<()> {
    match outcome {
        Outcome::Success => {
            let notification = session.notification();
            if !notification.is_none() {
                output.success(&notification.message);
            }
            Ok(())
        }
        other => bail!(other
            .message()
            .unwrap_or("Operation failed")
            .to_string()),
    }
}

/// Require an existing biosite before editing
pub fn require_biosite(session: &SiteSession) -> Result<()> {
    if session.biosite_id().is_none() {
        bail!("No biosite yet. Run `biosite site create` first.");
    }
    Ok(())
}
