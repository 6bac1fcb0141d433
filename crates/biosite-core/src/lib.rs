//! Biosite Core Library
//!
//! This crate provides the editing core for a link-in-bio page builder:
//! profile text and images, an ordered list of outbound links, and a visual
//! theme, synchronized with a remote REST API.
//!
//! # Architecture
//!
//! - **SiteSession**: in-memory source of truth while editing; edits are
//!   applied optimistically and pushed on save
//! - **RemoteGateway**: async request layer; [`HttpGateway`] talks to the API
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let gateway = Arc::new(HttpGateway::new(&config)?.with_token(token));
//!
//! let mut session = SiteSession::new(gateway);
//! session.load(&user_id).await;
//! session.update_profile_field(ProfileField::Name, "Alex");
//! session.save_biosite().await;
//! ```
//!
//! # Modules
//!
//! - `session`: Site session state and operations (main entry point)
//! - `gateway`: Remote API access
//! - `auth`: Login state and persisted credentials
//! - `models`: Profile, link and theme structures
//! - `notification`: Transient status messages
//! - `preview`: Read-only rendering of a session
//! - `analytics`: Visit and click reports
//! - `config`: Application configuration

pub mod analytics;
pub mod auth;
pub mod config;
pub mod gateway;
pub mod models;
pub mod notification;
pub mod preview;
pub mod session;

pub use analytics::{AnalyticsReport, TimeRange};
pub use auth::credentials::{CredentialError, CredentialStore};
pub use auth::{AuthSession, LoginResult, RegisterResult};
pub use config::Config;
pub use gateway::{GatewayError, GatewayResult, HttpGateway, RemoteGateway};
pub use models::{CityTheme, LinkItem, ProfileData, ProfileField, ThemeConfig, ThemeFont};
pub use notification::{Notification, NotificationKind, NotificationRelay};
pub use preview::{Avatar, Preview};
pub use session::{Outcome, SiteSession};
