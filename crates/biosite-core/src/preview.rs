//! Read-only projection of a session for display
//!
//! Recomputed from current state on every call; nothing here is cached.

use std::fmt;

use serde::Serialize;

use crate::models::{LinkItem, ThemeColors};
use crate::session::SiteSession;

/// Font family used when no font is selected
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

/// Resolved palette with every slot filled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
    pub profile_background: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: "#4c1d95".to_string(),
            secondary: "#7c3aed".to_string(),
            accent: "#a78bfa".to_string(),
            background: "#ffffff".to_string(),
            text: "#374151".to_string(),
            profile_background: "#ffffff".to_string(),
        }
    }
}

impl From<&ThemeColors> for Palette {
    fn from(colors: &ThemeColors) -> Self {
        let defaults = Self::default();
        Self {
            primary: colors.primary.clone(),
            secondary: colors.secondary.clone(),
            accent: colors.accent.clone(),
            background: colors.background.clone(),
            text: colors.text.clone().unwrap_or(defaults.text),
            profile_background: colors
                .profile_background
                .clone()
                .unwrap_or(defaults.profile_background),
        }
    }
}

/// What sits in the avatar circle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Avatar {
    Image(String),
    Initials(String),
}

/// Rendered page state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub display_name: String,
    pub description: String,
    pub site: String,
    pub avatar: Avatar,
    pub theme_name: Option<String>,
    pub palette: Palette,
    pub font_family: String,
    pub links: Vec<LinkItem>,
}

impl Preview {
    /// Derive the preview from the session's current state
    pub fn from_session(session: &SiteSession) -> Self {
        let profile = session.profile();
        let theme = session.selected_theme();

        let avatar = if profile.avatar_url.is_empty() {
            Avatar::Initials(initials(&profile.name))
        } else {
            Avatar::Image(profile.avatar_url.clone())
        };

        Self {
            display_name: profile.name.to_uppercase(),
            description: profile.description.clone(),
            site: profile.site.clone(),
            avatar,
            theme_name: theme.map(|t| t.name.clone()),
            palette: theme
                .map(|t| Palette::from(&t.config.colors))
                .unwrap_or_default(),
            font_family: session
                .selected_font()
                .map(|f| f.family.clone())
                .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
            links: session.links().to_vec(),
        }
    }
}

/// First two characters, uppercased
fn initials(name: &str) -> String {
    name.chars().take(2).collect::<String>().to_uppercase()
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.avatar {
            Avatar::Initials(ref initials) => writeln!(f, "[{}]  {}", initials, self.display_name)?,
            Avatar::Image(_) => writeln!(f, "[img] {}", self.display_name)?,
        }
        writeln!(f, "{}", self.description)?;
        writeln!(f, "{}", self.site)?;
        writeln!(f)?;

        if self.links.is_empty() {
            writeln!(f, "  (no links)")?;
        }
        for link in &self.links {
            writeln!(f, "  > {}  {}", link.label, link.url)?;
        }
        writeln!(f)?;

        write!(
            f,
            "Theme: {}  |  {} on {}  |  Font: {}",
            self.theme_name.as_deref().unwrap_or("Default"),
            self.palette.primary,
            self.palette.background,
            self.font_family
        )
    }
}
