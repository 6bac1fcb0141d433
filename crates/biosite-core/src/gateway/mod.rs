//! Remote gateway
//!
//! Stateless request functions against the biosite REST API. Each call makes
//! a single attempt and returns the payload or a [`GatewayError`]; retrying
//! and reporting are left to the caller.
//!
//! ## Endpoints
//!
//! - `GET /biosites/user/{ownerId}`, `POST /biosites`, `PATCH|DELETE /biosites/{id}`
//! - `GET /themes/{id}`, `GET /themes?name=`, `POST /themes/custom`,
//!   `POST /themes/cities/{name}`
//! - `GET /themes/categories`, `GET /themes/cities`, `GET /themes/fonts`
//! - `GET /biosites/analytics/{userId}?timeRange=`
//! - `POST /auth/login`, `POST /auth/register`

mod error;
mod http;
#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;

pub use error::{GatewayError, GatewayResult};
pub use http::HttpGateway;

use crate::analytics::{AnalyticsPayload, TimeRange};
use crate::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::models::{
    BiositePatch, BiositeRecord, CityTheme, NewBiosite, ThemeCategory, ThemeConfig, ThemeFont,
    ThemeRecord,
};

/// Calls the session and auth layers make against the backend
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Biosites owned by a user; the first one is "the" site
    async fn list_biosites(&self, owner_id: &str) -> GatewayResult<Vec<BiositeRecord>>;

    async fn create_biosite(&self, biosite: &NewBiosite) -> GatewayResult<BiositeRecord>;

    async fn update_biosite(&self, id: &str, patch: &BiositePatch)
        -> GatewayResult<BiositeRecord>;

    async fn delete_biosite(&self, id: &str) -> GatewayResult<()>;

    async fn get_theme(&self, id: &str) -> GatewayResult<ThemeRecord>;

    /// Themes whose name matches exactly (zero or one expected)
    async fn find_themes_by_name(&self, name: &str) -> GatewayResult<Vec<ThemeRecord>>;

    async fn create_custom_theme(&self, config: &ThemeConfig) -> GatewayResult<ThemeRecord>;

    /// Materialize (or reuse) a theme record for a named preset
    async fn create_city_theme(&self, city_name: &str) -> GatewayResult<ThemeRecord>;

    async fn theme_categories(&self) -> GatewayResult<Vec<ThemeCategory>>;

    async fn city_themes(&self) -> GatewayResult<Vec<CityTheme>>;

    async fn theme_fonts(&self) -> GatewayResult<Vec<ThemeFont>>;

    /// Aggregate counters; `None` when the user has no site
    async fn analytics(
        &self,
        user_id: &str,
        range: TimeRange,
    ) -> GatewayResult<Option<AnalyticsPayload>>;

    async fn login(&self, request: &LoginRequest) -> GatewayResult<AuthResponse>;

    async fn register(&self, request: &RegisterRequest) -> GatewayResult<()>;
}
