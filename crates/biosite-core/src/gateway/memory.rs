//! In-memory gateway for tests
//!
//! Keeps biosites and themes in maps and records every call so tests can
//! assert on exactly what went over the wire.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{GatewayError, GatewayResult, RemoteGateway};
use crate::analytics::{AnalyticsPayload, TimeRange};
use crate::auth::{AuthResponse, LoginRequest, RegisterRequest, RoleName};
use crate::models::{
    BiositePatch, BiositeRecord, CityTheme, NewBiosite, ThemeCategory, ThemeConfig, ThemeFont,
    ThemeRecord,
};

/// A recorded gateway call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListBiosites(String),
    CreateBiosite(NewBiosite),
    UpdateBiosite(String, BiositePatch),
    DeleteBiosite(String),
    GetTheme(String),
    FindThemes(String),
    CreateCustomTheme(ThemeConfig),
    CreateCityTheme(String),
    Categories,
    CityThemes,
    Fonts,
    Analytics(String, TimeRange),
    Login(String),
    Register(String),
}

impl Call {
    /// Whether this call writes to the backend
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Call::CreateBiosite(_)
                | Call::UpdateBiosite(..)
                | Call::DeleteBiosite(_)
                | Call::CreateCustomTheme(_)
                | Call::CreateCityTheme(_)
        )
    }
}

#[derive(Debug, Default)]
struct State {
    biosites: Vec<BiositeRecord>,
    themes: HashMap<String, ThemeRecord>,
    categories: Vec<ThemeCategory>,
    city_themes: Vec<CityTheme>,
    fonts: Vec<ThemeFont>,
    analytics: Option<AnalyticsPayload>,
    name_search: Option<Vec<ThemeRecord>>,
    accounts: HashMap<String, (String, AuthResponse)>,
    next_id: u32,
    failing: bool,
    calls: Vec<Call>,
}

/// Recording in-memory gateway
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    pub fn add_biosite(&self, record: BiositeRecord) {
        self.with_state(|s| s.biosites.push(record));
    }

    pub fn add_theme(&self, id: &str, name: &str, config: ThemeConfig) {
        self.with_state(|s| {
            s.themes.insert(
                id.to_string(),
                ThemeRecord {
                    id: Some(id.to_string()),
                    name: Some(name.to_string()),
                    config: Some(config),
                    preview_url: None,
                },
            );
        });
    }

    pub fn set_catalog(
        &self,
        categories: Vec<ThemeCategory>,
        city_themes: Vec<CityTheme>,
        fonts: Vec<ThemeFont>,
    ) {
        self.with_state(|s| {
            s.categories = categories;
            s.city_themes = city_themes;
            s.fonts = fonts;
        });
    }

    /// Answer every name search with these records, as a loose server search would
    pub fn set_name_search(&self, records: Vec<ThemeRecord>) {
        self.with_state(|s| s.name_search = Some(records));
    }

    pub fn set_analytics(&self, payload: Option<AnalyticsPayload>) {
        self.with_state(|s| s.analytics = payload);
    }

    pub fn add_account(&self, email: &str, password: &str, response: AuthResponse) {
        self.with_state(|s| {
            s.accounts
                .insert(email.to_string(), (password.to_string(), response));
        });
    }

    /// Make every subsequent call fail with a server error
    pub fn fail_all(&self, failing: bool) {
        self.with_state(|s| s.failing = failing);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.with_state(|s| s.calls.clone())
    }

    pub fn clear_calls(&self) {
        self.with_state(|s| s.calls.clear());
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    pub fn theme_count(&self) -> usize {
        self.with_state(|s| s.themes.len())
    }

    pub fn biosite(&self, id: &str) -> Option<BiositeRecord> {
        self.with_state(|s| {
            s.biosites
                .iter()
                .find(|b| b.id.as_deref() == Some(id))
                .cloned()
        })
    }

    /// Record a call and fail it when failure mode is on
    fn record(&self, call: Call) -> GatewayResult<()> {
        self.with_state(|s| {
            s.calls.push(call);
            if s.failing {
                Err(GatewayError::Server {
                    status: 500,
                    body: "internal error".to_string(),
                })
            } else {
                Ok(())
            }
        })
    }

    fn insert_theme(&self, name: &str, config: Option<ThemeConfig>) -> ThemeRecord {
        self.with_state(|s| {
            s.next_id += 1;
            let id = format!("theme-{}", s.next_id);
            let record = ThemeRecord {
                id: Some(id.clone()),
                name: Some(name.to_string()),
                config,
                preview_url: None,
            };
            s.themes.insert(id, record.clone());
            record
        })
    }
}

#[async_trait]
impl RemoteGateway for MemoryGateway {
    async fn list_biosites(&self, owner_id: &str) -> GatewayResult<Vec<BiositeRecord>> {
        self.record(Call::ListBiosites(owner_id.to_string()))?;
        Ok(self.with_state(|s| {
            s.biosites
                .iter()
                .filter(|b| b.owner_id.as_deref() == Some(owner_id))
                .cloned()
                .collect()
        }))
    }

    async fn create_biosite(&self, biosite: &NewBiosite) -> GatewayResult<BiositeRecord> {
        self.record(Call::CreateBiosite(biosite.clone()))?;
        Ok(self.with_state(|s| {
            s.next_id += 1;
            let record = BiositeRecord {
                id: Some(format!("biosite-{}", s.next_id)),
                owner_id: Some(biosite.owner_id.clone()),
                title: Some(biosite.title.clone()),
                slug: Some(biosite.slug.clone()),
                avatar_image: biosite.avatar_image.clone(),
                background_image: biosite.background_image.clone(),
                ..Default::default()
            };
            s.biosites.push(record.clone());
            record
        }))
    }

    async fn update_biosite(
        &self,
        id: &str,
        patch: &BiositePatch,
    ) -> GatewayResult<BiositeRecord> {
        self.record(Call::UpdateBiosite(id.to_string(), patch.clone()))?;
        self.with_state(|s| {
            let record = s
                .biosites
                .iter_mut()
                .find(|b| b.id.as_deref() == Some(id))
                .ok_or_else(|| GatewayError::NotFound {
                    path: format!("/biosites/{}", id),
                })?;
            let patch = patch.clone();
            if patch.title.is_some() {
                record.title = patch.title;
            }
            if patch.description.is_some() {
                record.description = patch.description;
            }
            if patch.slug.is_some() {
                record.slug = patch.slug;
            }
            if patch.avatar_image.is_some() {
                record.avatar_image = patch.avatar_image;
            }
            if patch.background_image.is_some() {
                record.background_image = patch.background_image;
            }
            if patch.theme_id.is_some() {
                record.theme_id = patch.theme_id;
            }
            if patch.fonts.is_some() {
                record.fonts = patch.fonts;
            }
            if patch.links.is_some() {
                record.links = patch.links;
            }
            Ok(record.clone())
        })
    }

    async fn delete_biosite(&self, id: &str) -> GatewayResult<()> {
        self.record(Call::DeleteBiosite(id.to_string()))?;
        self.with_state(|s| {
            let before = s.biosites.len();
            s.biosites.retain(|b| b.id.as_deref() != Some(id));
            if s.biosites.len() == before {
                return Err(GatewayError::NotFound {
                    path: format!("/biosites/{}", id),
                });
            }
            Ok(())
        })
    }

    async fn get_theme(&self, id: &str) -> GatewayResult<ThemeRecord> {
        self.record(Call::GetTheme(id.to_string()))?;
        self.with_state(|s| s.themes.get(id).cloned())
            .ok_or_else(|| GatewayError::NotFound {
                path: format!("/themes/{}", id),
            })
    }

    async fn find_themes_by_name(&self, name: &str) -> GatewayResult<Vec<ThemeRecord>> {
        self.record(Call::FindThemes(name.to_string()))?;
        Ok(self.with_state(|s| {
            if let Some(records) = &s.name_search {
                return records.clone();
            }
            s.themes
                .values()
                .filter(|t| t.name.as_deref() == Some(name))
                .cloned()
                .collect()
        }))
    }

    async fn create_custom_theme(&self, config: &ThemeConfig) -> GatewayResult<ThemeRecord> {
        self.record(Call::CreateCustomTheme(config.clone()))?;
        Ok(self.insert_theme("Custom", Some(config.clone())))
    }

    async fn create_city_theme(&self, city_name: &str) -> GatewayResult<ThemeRecord> {
        self.record(Call::CreateCityTheme(city_name.to_string()))?;
        let preset = self.with_state(|s| {
            s.city_themes
                .iter()
                .find(|t| t.name == city_name)
                .map(|t| t.config.clone())
        });
        let existing = self.with_state(|s| {
            s.themes
                .values()
                .find(|t| t.name.as_deref() == Some(city_name))
                .cloned()
        });
        Ok(existing.unwrap_or_else(|| self.insert_theme(city_name, preset)))
    }

    async fn theme_categories(&self) -> GatewayResult<Vec<ThemeCategory>> {
        self.record(Call::Categories)?;
        Ok(self.with_state(|s| s.categories.clone()))
    }

    async fn city_themes(&self) -> GatewayResult<Vec<CityTheme>> {
        self.record(Call::CityThemes)?;
        Ok(self.with_state(|s| s.city_themes.clone()))
    }

    async fn theme_fonts(&self) -> GatewayResult<Vec<ThemeFont>> {
        self.record(Call::Fonts)?;
        Ok(self.with_state(|s| s.fonts.clone()))
    }

    async fn analytics(
        &self,
        user_id: &str,
        range: TimeRange,
    ) -> GatewayResult<Option<AnalyticsPayload>> {
        self.record(Call::Analytics(user_id.to_string(), range))?;
        Ok(self.with_state(|s| s.analytics.clone()))
    }

    async fn login(&self, request: &LoginRequest) -> GatewayResult<AuthResponse> {
        self.record(Call::Login(request.email.clone()))?;
        self.with_state(|s| match s.accounts.get(&request.email) {
            Some((password, response)) if *password == request.password => Ok(response.clone()),
            _ => Err(GatewayError::Server {
                status: 401,
                body: r#"{"message":"Invalid credentials"}"#.to_string(),
            }),
        })
    }

    async fn register(&self, request: &RegisterRequest) -> GatewayResult<()> {
        self.record(Call::Register(request.email.clone()))?;
        self.with_state(|s| {
            if s.accounts.contains_key(&request.email) {
                return Err(GatewayError::Server {
                    status: 409,
                    body: r#"{"message":["Email already registered"]}"#.to_string(),
                });
            }
            s.next_id += 1;
            let response = AuthResponse {
                access_token: format!("access-{}", s.next_id),
                refresh_token: format!("refresh-{}", s.next_id),
                user_id: format!("user-{}", s.next_id),
                role_name: vec![RoleName::Plain(request.role.clone())],
            };
            s.accounts
                .insert(request.email.clone(), (request.password.clone(), response));
            Ok(())
        })
    }
}
