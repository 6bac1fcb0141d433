//! Site session
//!
//! The single in-memory source of truth for one biosite while it is being
//! edited. Editor front ends mutate it synchronously; persistence goes
//! through the [`RemoteGateway`].
//!
//! ## Guarantees
//!
//! - Profile and link edits apply immediately and never touch the network.
//! - Theme selection is two-phase: the local selection changes first, then
//!   the choice is persisted. A failed persist leaves the selection in place.
//! - No public operation returns an error. Failures set [`SiteSession::error`]
//!   and a transient notification, and are summarized in the returned
//!   [`Outcome`].
//! - Without a biosite id nothing is patched. [`SiteSession::save_biosite`]
//!   refuses outright; [`SiteSession::save_profile`] creates the record first.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = SiteSession::new(gateway);
//! session.load("user-1").await;
//! session.update_profile_field(ProfileField::Name, "Alex");
//! session.save_biosite().await;
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::gateway::{GatewayError, GatewayResult, RemoteGateway};
use crate::models::{
    BiositePatch, BiositeRecord, CityTheme, LinkItem, NewBiosite, ProfileData, ProfileField,
    ThemeCategory, ThemeConfig, ThemeFont, ThemeRecord,
};
use crate::notification::{Notification, NotificationKind, NotificationRelay};
use crate::preview::Preview;

const LOAD_FAILED: &str = "Error loading your biosite. Please try again later.";
const NO_BIOSITE: &str = "No biosite to save. Please create one first.";
const SAVED: &str = "Your biosite has been saved successfully!";
const SAVE_FAILED: &str = "Failed to save your changes. Please try again.";
const THEME_NOT_FOUND: &str = "Theme not found";
const THEME_FAILED: &str = "Failed to apply theme. Please try again.";
const CUSTOM_THEME_FAILED: &str = "Failed to apply custom theme";

/// Result of a session operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The operation completed
    Success,
    /// A precondition was missing; nothing was sent
    Skipped(String),
    /// A referenced theme or biosite does not exist
    NotFound(String),
    /// A gateway call failed
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Message for non-success outcomes
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Success => None,
            Outcome::Skipped(m) | Outcome::NotFound(m) | Outcome::Failed(m) => Some(m),
        }
    }
}

/// Everything `load` fetches, applied in one step
struct Loaded {
    biosite: Option<BiositeRecord>,
    theme: Option<CityTheme>,
    categories: Vec<ThemeCategory>,
    city_themes: Vec<CityTheme>,
    fonts: Vec<ThemeFont>,
}

/// Editable state of one user's biosite
pub struct SiteSession {
    gateway: Arc<dyn RemoteGateway>,
    owner_id: Option<String>,
    biosite_id: Option<String>,
    profile: ProfileData,
    background_image: Option<String>,
    selected_theme: Option<CityTheme>,
    selected_font: Option<ThemeFont>,
    categories: Vec<ThemeCategory>,
    city_themes: Vec<CityTheme>,
    fonts: Vec<ThemeFont>,
    links: Vec<LinkItem>,
    loading: bool,
    error: Option<String>,
    notifications: NotificationRelay,
}

impl SiteSession {
    /// Create a session with default state
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        Self {
            gateway,
            owner_id: None,
            biosite_id: None,
            profile: ProfileData::default(),
            background_image: None,
            selected_theme: None,
            selected_font: None,
            categories: Vec::new(),
            city_themes: Vec::new(),
            fonts: Vec::new(),
            links: Vec::new(),
            loading: false,
            error: None,
            notifications: NotificationRelay::new(),
        }
    }

    // ==================== Loading ====================

    /// Populate the session from the owner's stored biosite and the catalog
    ///
    /// State is only replaced once every fetch succeeds; on failure the
    /// defaults stay and `error` is set.
    pub async fn load(&mut self, owner_id: &str) -> Outcome {
        self.owner_id = Some(owner_id.to_string());
        self.loading = true;
        let result = self.fetch_all(owner_id).await;
        self.loading = false;

        match result {
            Ok(loaded) => {
                self.apply_loaded(loaded);
                info!(
                    "Loaded biosite {:?} with {} link(s)",
                    self.biosite_id,
                    self.links.len()
                );
                Outcome::Success
            }
            Err(e) => {
                warn!("Error loading biosite data: {}", e);
                self.error = Some(LOAD_FAILED.to_string());
                Outcome::Failed(LOAD_FAILED.to_string())
            }
        }
    }

    async fn fetch_all(&self, owner_id: &str) -> GatewayResult<Loaded> {
        let biosite = self
            .gateway
            .list_biosites(owner_id)
            .await?
            .into_iter()
            .next();

        let theme = match biosite.as_ref().and_then(|b| b.theme_id.as_deref()) {
            Some(theme_id) => match self.gateway.get_theme(theme_id).await {
                Ok(record) => record.into_selection(),
                // A dangling theme reference is not fatal
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(e),
            },
            None => None,
        };

        let (categories, city_themes, fonts) = tokio::try_join!(
            self.gateway.theme_categories(),
            self.gateway.city_themes(),
            self.gateway.theme_fonts(),
        )?;

        Ok(Loaded {
            biosite,
            theme,
            categories,
            city_themes,
            fonts,
        })
    }

    fn apply_loaded(&mut self, loaded: Loaded) {
        if let Some(biosite) = loaded.biosite {
            self.biosite_id = biosite.id.clone();
            self.profile = ProfileData::from_record(&biosite);
            self.background_image = biosite.background_image.clone();
            if let Some(links) = biosite.links {
                self.links = links;
            }
            if loaded.theme.is_some() {
                self.selected_theme = loaded.theme;
            }
        }

        self.selected_font = loaded.fonts.first().cloned();
        self.categories = loaded.categories;
        self.city_themes = loaded.city_themes;
        self.fonts = loaded.fonts;
    }

    // ==================== Optimistic edits ====================

    /// Set one profile field; visible to the preview immediately
    pub fn update_profile_field(&mut self, field: ProfileField, value: impl Into<String>) {
        self.profile.set(field, value);
    }

    /// Replace the link list wholesale
    pub fn set_links(&mut self, links: Vec<LinkItem>) {
        self.links = links;
    }

    /// Append a link
    ///
    /// Returns `None` (and changes nothing) when label or url is blank.
    pub fn add_link(&mut self, label: &str, url: &str, icon: Option<&str>) -> Option<&LinkItem> {
        if label.trim().is_empty() || url.trim().is_empty() {
            debug!("Ignoring link without label or url");
            return None;
        }
        let mut links = self.links.clone();
        links.push(LinkItem::new(label, url, icon));
        self.set_links(links);
        self.links.last()
    }

    /// Replace the link with the same id; false if none matched
    pub fn update_link(&mut self, updated: LinkItem) -> bool {
        if !self.links.iter().any(|l| l.id == updated.id) {
            return false;
        }
        let links = self
            .links
            .iter()
            .map(|l| {
                if l.id == updated.id {
                    updated.clone()
                } else {
                    l.clone()
                }
            })
            .collect();
        self.set_links(links);
        true
    }

    /// Remove a link by id; false if none matched
    pub fn remove_link(&mut self, id: &str) -> bool {
        let before = self.links.len();
        let links: Vec<LinkItem> = self.links.iter().filter(|l| l.id != id).cloned().collect();
        let removed = links.len() != before;
        self.set_links(links);
        removed
    }

    /// Select a font from the loaded catalog; false if the id is unknown
    pub fn select_font(&mut self, font_id: &str) -> bool {
        match self.fonts.iter().find(|f| f.id == font_id) {
            Some(font) => {
                self.selected_font = Some(font.clone());
                true
            }
            None => false,
        }
    }

    /// Set the cover image used by the profile save path
    pub fn set_background_image(&mut self, image: Option<String>) {
        self.background_image = image;
    }

    // ==================== Themes ====================

    /// Select a preset by exact name, then persist the choice
    pub async fn apply_theme(&mut self, theme_name: &str) -> Outcome {
        // Phase 1: local selection
        let Some(theme) = self.city_themes.iter().find(|t| t.name == theme_name).cloned() else {
            self.fail(THEME_NOT_FOUND);
            return Outcome::NotFound(THEME_NOT_FOUND.to_string());
        };
        self.selected_theme = Some(theme);

        // Phase 2: persist
        self.loading = true;
        let result = self.persist_city_theme(theme_name).await;
        self.loading = false;

        match result {
            Ok(true) => {
                self.notify_success(&format!("Applied {} theme successfully", theme_name));
                Outcome::Success
            }
            Ok(false) => Outcome::Skipped("Theme selected but no biosite to attach it to".into()),
            Err(e) => {
                warn!("Error applying theme {}: {}", theme_name, e);
                self.fail(THEME_FAILED);
                Outcome::Failed(THEME_FAILED.to_string())
            }
        }
    }

    /// Returns whether a biosite was patched
    async fn persist_city_theme(&self, theme_name: &str) -> GatewayResult<bool> {
        let record = self.gateway.create_city_theme(theme_name).await?;
        let (Some(biosite_id), Some(theme_id)) = (self.biosite_id.as_deref(), record.id) else {
            return Ok(false);
        };

        let patch = BiositePatch {
            theme_id: Some(theme_id),
            fonts: self.selected_font.as_ref().map(|f| f.family.clone()),
            ..Default::default()
        };
        self.gateway.update_biosite(biosite_id, &patch).await?;
        Ok(true)
    }

    /// Select a client-authored theme, then persist it
    pub async fn apply_custom_theme(&mut self, config: ThemeConfig) -> Outcome {
        self.selected_theme = Some(CityTheme::custom(config.clone()));

        self.loading = true;
        let result = self.persist_custom_theme(&config).await;
        self.loading = false;

        match result {
            Ok(true) => {
                self.notify_success("Applied custom theme successfully");
                Outcome::Success
            }
            Ok(false) => Outcome::Skipped("Theme selected but no biosite to attach it to".into()),
            Err(e) => {
                warn!("Error applying custom theme: {}", e);
                self.fail(CUSTOM_THEME_FAILED);
                Outcome::Failed(CUSTOM_THEME_FAILED.to_string())
            }
        }
    }

    async fn persist_custom_theme(&self, config: &ThemeConfig) -> GatewayResult<bool> {
        let record = self.gateway.create_custom_theme(config).await?;
        let (Some(biosite_id), Some(theme_id)) = (self.biosite_id.as_deref(), record.id) else {
            return Ok(false);
        };

        let patch = BiositePatch {
            theme_id: Some(theme_id),
            ..Default::default()
        };
        self.gateway.update_biosite(biosite_id, &patch).await?;
        Ok(true)
    }

    // ==================== Saving ====================

    /// Push profile, links, theme and font in a single patch
    ///
    /// Refuses when no biosite exists; it never creates one.
    pub async fn save_biosite(&mut self) -> Outcome {
        let Some(biosite_id) = self.biosite_id.clone() else {
            self.notifications.show(NotificationKind::Error, NO_BIOSITE);
            return Outcome::Skipped(NO_BIOSITE.to_string());
        };

        self.loading = true;
        let result = self.push_biosite(&biosite_id).await;
        self.loading = false;

        match result {
            Ok(()) => {
                self.error = None;
                self.notify_success(SAVED);
                Outcome::Success
            }
            Err(e) => {
                warn!("Error saving biosite {}: {}", biosite_id, e);
                self.fail(SAVE_FAILED);
                Outcome::Failed(SAVE_FAILED.to_string())
            }
        }
    }

    async fn push_biosite(&self, biosite_id: &str) -> GatewayResult<()> {
        let mut patch = BiositePatch {
            title: Some(self.profile.name.clone()),
            description: Some(self.profile.description.clone()),
            slug: Some(self.profile.site.clone()),
            avatar_image: Some(self.profile.avatar_url.clone()),
            links: Some(self.links.clone()),
            ..Default::default()
        };

        if let Some(ref theme) = self.selected_theme {
            patch.theme_id = self.resolve_theme_id(theme).await?;
        }
        if let Some(ref font) = self.selected_font {
            patch.fonts = Some(font.family.clone());
        }

        self.gateway.update_biosite(biosite_id, &patch).await?;
        Ok(())
    }

    /// Find a stored theme named exactly like the selection, or create one
    ///
    /// A search hit is reused only when its name is present and equal to the
    /// selection's name, byte for byte. Records without a name, or whose
    /// name differs in any way (case included), are ignored.
    async fn resolve_theme_id(&self, theme: &CityTheme) -> GatewayResult<Option<String>> {
        let existing = self
            .gateway
            .find_themes_by_name(&theme.name)
            .await?
            .into_iter()
            .find(|t| t.name.as_deref() == Some(theme.name.as_str()))
            .and_then(|t: ThemeRecord| t.id);

        if existing.is_some() {
            return Ok(existing);
        }

        debug!("No stored theme named {:?}; creating one", theme.name);
        let created = self.gateway.create_custom_theme(&theme.config).await?;
        Ok(created.id)
    }

    /// Create the biosite record and adopt its id
    pub async fn create_biosite(&mut self) -> Outcome {
        let Some(owner_id) = self.owner_id.clone() else {
            self.notifications
                .show(NotificationKind::Error, "User not identified");
            return Outcome::Skipped("User not identified".to_string());
        };

        self.loading = true;
        let result = self.create_record(&owner_id).await;
        self.loading = false;

        match result {
            Ok(id) => {
                info!("Created biosite {}", id);
                self.biosite_id = Some(id);
                self.notify_success("Biosite created successfully");
                Outcome::Success
            }
            Err(e) => {
                warn!("Error creating biosite: {}", e);
                self.fail("Error creating the biosite");
                Outcome::Failed("Error creating the biosite".to_string())
            }
        }
    }

    async fn create_record(&self, owner_id: &str) -> GatewayResult<String> {
        let biosite = NewBiosite {
            owner_id: owner_id.to_string(),
            title: non_empty_or(&self.profile.name, "Mi Biosite"),
            slug: non_empty_or(&self.profile.site, &format!("user-{}", owner_id)),
            avatar_image: Some(self.profile.avatar_url.clone()).filter(|a| !a.is_empty()),
            background_image: self.background_image.clone(),
        };

        let record = self.gateway.create_biosite(&biosite).await?;
        record.id.ok_or_else(|| GatewayError::Decode {
            path: "/biosites".to_string(),
            details: "response carried no id".to_string(),
        })
    }

    /// Profile editor save: create the biosite if needed, otherwise patch
    /// title, slug and images
    pub async fn save_profile(&mut self) -> Outcome {
        let Some(biosite_id) = self.biosite_id.clone() else {
            return self.create_biosite().await;
        };

        let patch = BiositePatch {
            title: Some(self.profile.name.clone()),
            slug: Some(self.profile.site.clone()),
            avatar_image: Some(self.profile.avatar_url.clone()),
            background_image: self.background_image.clone(),
            ..Default::default()
        };

        self.loading = true;
        let result = self.gateway.update_biosite(&biosite_id, &patch).await;
        self.loading = false;

        match result {
            Ok(_) => {
                self.notify_success("Changes saved successfully");
                Outcome::Success
            }
            Err(e) => {
                warn!("Error saving profile: {}", e);
                self.fail("Error saving changes");
                Outcome::Failed("Error saving changes".to_string())
            }
        }
    }

    /// Delete the biosite and reset the profile to blank
    pub async fn delete_biosite(&mut self) -> Outcome {
        let Some(biosite_id) = self.biosite_id.clone() else {
            self.notifications
                .show(NotificationKind::Error, "No biosite to delete");
            return Outcome::Skipped("No biosite to delete".to_string());
        };

        self.loading = true;
        let result = self.gateway.delete_biosite(&biosite_id).await;
        self.loading = false;

        match result {
            Ok(()) => {
                info!("Deleted biosite {}", biosite_id);
                self.biosite_id = None;
                self.profile = ProfileData::blank();
                self.background_image = None;
                self.notify_success("Biosite deleted successfully");
                Outcome::Success
            }
            Err(e) if e.is_not_found() => {
                self.fail("Biosite not found");
                Outcome::NotFound("Biosite not found".to_string())
            }
            Err(e) => {
                warn!("Error deleting biosite {}: {}", biosite_id, e);
                self.fail("Error deleting the biosite");
                Outcome::Failed("Error deleting the biosite".to_string())
            }
        }
    }

    // ==================== Notifications ====================

    pub fn show_notification(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notifications.show(kind, message);
    }

    pub fn clear_notification(&mut self) {
        self.notifications.clear();
    }

    pub fn notification(&self) -> Notification {
        self.notifications.current()
    }

    /// Clear the persistent error banner
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn notify_success(&mut self, message: &str) {
        self.notifications.show(NotificationKind::Success, message);
    }

    /// Record a failure in both the banner and a notification
    fn fail(&mut self, message: &str) {
        self.error = Some(message.to_string());
        self.notifications.show(NotificationKind::Error, message);
    }

    // ==================== Accessors ====================

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    pub fn biosite_id(&self) -> Option<&str> {
        self.biosite_id.as_deref()
    }

    pub fn profile(&self) -> &ProfileData {
        &self.profile
    }

    pub fn background_image(&self) -> Option<&str> {
        self.background_image.as_deref()
    }

    pub fn links(&self) -> &[LinkItem] {
        &self.links
    }

    pub fn selected_theme(&self) -> Option<&CityTheme> {
        self.selected_theme.as_ref()
    }

    pub fn selected_font(&self) -> Option<&ThemeFont> {
        self.selected_font.as_ref()
    }

    pub fn categories(&self) -> &[ThemeCategory] {
        &self.categories
    }

    pub fn city_themes(&self) -> &[CityTheme] {
        &self.city_themes
    }

    pub fn fonts(&self) -> &[ThemeFont] {
        &self.fonts
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Current state as it would render
    pub fn preview(&self) -> Preview {
        Preview::from_session(self)
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
