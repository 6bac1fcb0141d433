//! HTTP implementation of the remote gateway

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{GatewayError, GatewayResult, RemoteGateway};
use crate::analytics::{AnalyticsPayload, TimeRange};
use crate::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::config::Config;
use crate::models::{
    BiositePatch, BiositeRecord, CityTheme, NewBiosite, ThemeCategory, ThemeConfig, ThemeFont,
    ThemeRecord,
};

/// Gateway backed by `reqwest`
///
/// Attaches `Authorization: Bearer <token>` when an access token is set.
/// Ids and names are pushed as single path segments, so characters such as
/// `/`, `?` or `#` are percent-encoded rather than changing the route.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: Url,
    access_token: Option<String>,
}

impl HttpGateway {
    /// Create a gateway for the configured API
    pub fn new(config: &Config) -> GatewayResult<Self> {
        let base_url = parse_base(&config.api_url)?;

        let mut builder = reqwest::Client::builder().user_agent(concat!(
            "biosite-cli/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            access_token: None,
        })
    }

    /// Use an access token for subsequent requests
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    /// Base URL requests are issued against
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Append path segments to the base URL, encoding each one
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> (RequestBuilder, String) {
        let url = self.url(segments);
        let path = url.path().to_string();
        let builder = self.client.request(method, url);
        let builder = match self.access_token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        };
        (builder, path)
    }

    /// Send a request and classify the response status
    async fn send(&self, builder: RequestBuilder, path: &str) -> GatewayResult<reqwest::Response> {
        let response = builder.send().await.map_err(|e| {
            warn!("Request to {} failed: {}", path, e);
            GatewayError::from_reqwest(e, path)
        })?;

        let status = response.status();
        debug!("{} -> {}", path, status);
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::from_status(status.as_u16(), body, path))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> GatewayResult<T> {
        let response = self.send(builder, path).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::from_reqwest(e, path))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> GatewayResult<T> {
        let (builder, path) = self.request(Method::GET, segments);
        self.fetch(builder, &path).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> GatewayResult<T> {
        let (builder, path) = self.request(Method::POST, segments);
        self.fetch(builder.json(body), &path).await
    }
}

/// Parse the configured API address into a base that accepts path segments
fn parse_base(api_url: &str) -> GatewayResult<Url> {
    let invalid = |details: String| GatewayError::InvalidUrl {
        url: api_url.to_string(),
        details,
    };
    let url = Url::parse(api_url).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not a hierarchical URL".to_string()));
    }
    Ok(url)
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn list_biosites(&self, owner_id: &str) -> GatewayResult<Vec<BiositeRecord>> {
        self.get(&["biosites", "user", owner_id]).await
    }

    async fn create_biosite(&self, biosite: &NewBiosite) -> GatewayResult<BiositeRecord> {
        self.post(&["biosites"], biosite).await
    }

    async fn update_biosite(
        &self,
        id: &str,
        patch: &BiositePatch,
    ) -> GatewayResult<BiositeRecord> {
        let (builder, path) = self.request(Method::PATCH, &["biosites", id]);
        self.fetch(builder.json(patch), &path).await
    }

    async fn delete_biosite(&self, id: &str) -> GatewayResult<()> {
        let (builder, path) = self.request(Method::DELETE, &["biosites", id]);
        self.send(builder, &path).await.map(|_| ())
    }

    async fn get_theme(&self, id: &str) -> GatewayResult<ThemeRecord> {
        self.get(&["themes", id]).await
    }

    async fn find_themes_by_name(&self, name: &str) -> GatewayResult<Vec<ThemeRecord>> {
        let (builder, path) = self.request(Method::GET, &["themes"]);
        self.fetch(builder.query(&[("name", name)]), &path).await
    }

    async fn create_custom_theme(&self, config: &ThemeConfig) -> GatewayResult<ThemeRecord> {
        self.post(&["themes", "custom"], config).await
    }

    async fn create_city_theme(&self, city_name: &str) -> GatewayResult<ThemeRecord> {
        let (builder, path) = self.request(Method::POST, &["themes", "cities", city_name]);
        self.fetch(builder, &path).await
    }

    async fn theme_categories(&self) -> GatewayResult<Vec<ThemeCategory>> {
        self.get(&["themes", "categories"]).await
    }

    async fn city_themes(&self) -> GatewayResult<Vec<CityTheme>> {
        self.get(&["themes", "cities"]).await
    }

    async fn theme_fonts(&self) -> GatewayResult<Vec<ThemeFont>> {
        self.get(&["themes", "fonts"]).await
    }

    async fn analytics(
        &self,
        user_id: &str,
        range: TimeRange,
    ) -> GatewayResult<Option<AnalyticsPayload>> {
        let (builder, path) = self.request(Method::GET, &["biosites", "analytics", user_id]);
        self.fetch(builder.query(&[("timeRange", range.as_str())]), &path)
            .await
    }

    async fn login(&self, request: &LoginRequest) -> GatewayResult<AuthResponse> {
        self.post(&["auth", "login"], request).await
    }

    async fn register(&self, request: &RegisterRequest) -> GatewayResult<()> {
        let (builder, path) = self.request(Method::POST, &["auth", "register"]);
        self.send(builder.json(request), &path).await.map(|_| ())
    }
}
