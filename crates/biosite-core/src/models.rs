//! Data models for the biosite builder
//!
//! Editable state (profile, links, theme selection) plus the wire records
//! exchanged with the backend. Field names follow the API's camelCase.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Icon tag given to links created without one
pub const DEFAULT_LINK_ICON: &str = "link";

/// Name attached to a theme authored client-side
pub const CUSTOM_THEME_NAME: &str = "Custom";

/// Profile fields shown at the top of the page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    pub name: String,
    pub description: String,
    /// Slug or URL of the site
    pub site: String,
    /// Image URL or inline `data:` URL
    pub avatar_url: String,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            name: "User".to_string(),
            description: "Bio Description".to_string(),
            site: "website.com".to_string(),
            avatar_url: String::new(),
        }
    }
}

impl ProfileData {
    /// Profile with every field blank (after the site is deleted)
    pub fn blank() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            site: String::new(),
            avatar_url: String::new(),
        }
    }

    /// Build profile fields from a stored record, falling back to defaults
    pub fn from_record(record: &BiositeRecord) -> Self {
        let defaults = Self::default();
        Self {
            name: non_empty(&record.title).unwrap_or(defaults.name),
            description: non_empty(&record.description).unwrap_or(defaults.description),
            site: non_empty(&record.slug).unwrap_or(defaults.site),
            avatar_url: non_empty(&record.avatar_image).unwrap_or(defaults.avatar_url),
        }
    }

    /// Set a single field
    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProfileField::Name => self.name = value,
            ProfileField::Description => self.description = value,
            ProfileField::Site => self.site = value,
            ProfileField::AvatarUrl => self.avatar_url = value,
        }
    }

    /// Read a single field
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::Description => &self.description,
            ProfileField::Site => &self.site,
            ProfileField::AvatarUrl => &self.avatar_url,
        }
    }
}

/// Editable profile field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Name,
    Description,
    Site,
    AvatarUrl,
}

impl std::str::FromStr for ProfileField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "description" => Ok(Self::Description),
            "site" | "slug" => Ok(Self::Site),
            "avatar" | "avatar_url" => Ok(Self::AvatarUrl),
            other => Err(format!(
                "unknown profile field '{}' (expected name, description, site, avatar)",
                other
            )),
        }
    }
}

/// An outbound link on the page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkItem {
    /// Opaque identifier, unique within the list
    pub id: String,
    pub label: String,
    /// Absolute URL
    pub url: String,
    /// Category tag used to pick an icon
    #[serde(default = "default_icon")]
    pub icon: String,
}

impl LinkItem {
    /// Create a link with a fresh identifier
    ///
    /// The label is trimmed and the URL coerced to an absolute form.
    pub fn new(label: &str, url: &str, icon: Option<&str>) -> Self {
        Self {
            id: format!("link_{}", Uuid::new_v4().simple()),
            label: label.trim().to_string(),
            url: coerce_url(url),
            icon: icon
                .filter(|i| !i.trim().is_empty())
                .unwrap_or(DEFAULT_LINK_ICON)
                .to_string(),
        }
    }
}

fn default_icon() -> String {
    DEFAULT_LINK_ICON.to_string()
}

/// Prefix a scheme onto bare host/path values
pub fn coerce_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Theme palette
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_background: Option<String>,
}

/// Theme font families
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeFonts {
    pub primary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
}

/// A complete theme description
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    pub colors: ThemeColors,
    pub fonts: ThemeFonts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_dark: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_animated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_name: Option<String>,
}

impl ThemeConfig {
    /// Dark starting point for the custom theme builder
    pub fn custom_dark() -> Self {
        Self {
            colors: ThemeColors {
                primary: "#121212".to_string(),
                secondary: "#FFFFFF".to_string(),
                accent: "#E0E0E0".to_string(),
                background: "#1A1A1A".to_string(),
                text: Some("#FFFFFF".to_string()),
                profile_background: Some("#FFFFFF".to_string()),
            },
            fonts: ThemeFonts {
                primary: "Roboto, sans-serif".to_string(),
                secondary: None,
            },
            is_dark: Some(true),
            is_animated: Some(false),
            city_name: None,
        }
    }
}

/// A named theme, either a city preset or the custom selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CityTheme {
    pub name: String,
    pub config: ThemeConfig,
    #[serde(default)]
    pub preview_url: String,
}

impl CityTheme {
    /// Tag an arbitrary config as the custom selection
    pub fn custom(config: ThemeConfig) -> Self {
        Self {
            name: CUSTOM_THEME_NAME.to_string(),
            config,
            preview_url: String::new(),
        }
    }
}

/// Catalog category of themes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThemeCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_dark: bool,
    #[serde(default)]
    pub is_animated: bool,
}

/// Font offered by the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeFont {
    pub id: String,
    pub name: String,
    /// CSS font-family value
    pub family: String,
}

/// Theme record stored by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThemeRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub config: Option<ThemeConfig>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl ThemeRecord {
    /// Convert to a selection, if the record carries a full config
    pub fn into_selection(self) -> Option<CityTheme> {
        let config = self.config?;
        Some(CityTheme {
            name: self.name.unwrap_or_default(),
            config,
            preview_url: self.preview_url.unwrap_or_default(),
        })
    }
}

/// Biosite record as stored by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BiositeRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub theme_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub avatar_image: Option<String>,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub fonts: Option<String>,
    #[serde(default)]
    pub links: Option<Vec<LinkItem>>,
}

/// Partial update of a biosite; unset fields are left out of the body
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BiositePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fonts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkItem>>,
}

/// Body for creating a biosite
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewBiosite {
    pub owner_id: String,
    pub title: String,
    pub slug: String,
    pub avatar_image: Option<String>,
    pub background_image: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_url() {
        assert_eq!(coerce_url("example.com"), "https://example.com");
        assert_eq!(coerce_url("example.com/path"), "https://example.com/path");
        assert_eq!(coerce_url("http://example.com"), "http://example.com");
        assert_eq!(coerce_url("https://example.com"), "https://example.com");
        assert_eq!(coerce_url("  example.com "), "https://example.com");
    }

    #[test]
    fn test_link_new() {
        let link = LinkItem::new("  Blog ", "blog.example.com", None);
        assert_eq!(link.label, "Blog");
        assert_eq!(link.url, "https://blog.example.com");
        assert_eq!(link.icon, "link");
        assert!(link.id.starts_with("link_"));

        let other = LinkItem::new("Blog", "blog.example.com", Some("instagram"));
        assert_ne!(link.id, other.id);
        assert_eq!(other.icon, "instagram");
    }

    #[test]
    fn test_link_icon_defaults_when_missing() {
        let link: LinkItem =
            serde_json::from_str(r#"{"id":"1","label":"Shop","url":"https://shop.example"}"#)
                .unwrap();
        assert_eq!(link.icon, "link");
    }

    #[test]
    fn test_profile_from_record_defaults() {
        let record = BiositeRecord {
            id: Some("b1".to_string()),
            title: Some("Alex".to_string()),
            description: Some(String::new()),
            ..Default::default()
        };

        let profile = ProfileData::from_record(&record);
        assert_eq!(profile.name, "Alex");
        assert_eq!(profile.description, "Bio Description");
        assert_eq!(profile.site, "website.com");
        assert_eq!(profile.avatar_url, "");
    }

    #[test]
    fn test_profile_field_parse() {
        assert_eq!("name".parse::<ProfileField>(), Ok(ProfileField::Name));
        assert_eq!("slug".parse::<ProfileField>(), Ok(ProfileField::Site));
        assert_eq!("avatar".parse::<ProfileField>(), Ok(ProfileField::AvatarUrl));
        assert!("email".parse::<ProfileField>().is_err());
    }

    #[test]
    fn test_patch_skips_unset_fields() {
        let patch = BiositePatch {
            theme_id: Some("t1".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"themeId": "t1"}));
    }

    #[test]
    fn test_theme_config_wire_names() {
        let json = serde_json::to_value(ThemeConfig::custom_dark()).unwrap();
        assert_eq!(json["colors"]["profileBackground"], "#FFFFFF");
        assert_eq!(json["isDark"], true);
        assert!(json.get("cityName").is_none());
    }

    #[test]
    fn test_theme_record_into_selection() {
        let record = ThemeRecord {
            id: Some("t1".to_string()),
            name: Some("Tokyo".to_string()),
            config: Some(ThemeConfig::custom_dark()),
            preview_url: None,
        };
        let selection = record.into_selection().unwrap();
        assert_eq!(selection.name, "Tokyo");
        assert_eq!(selection.preview_url, "");

        assert!(ThemeRecord::default().into_selection().is_none());
    }
}
