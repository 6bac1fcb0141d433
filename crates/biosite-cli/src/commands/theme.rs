//! Theme and font command handlers

use anyhow::{bail, Result};

use biosite_core::models::{CityTheme, ThemeConfig};

use crate::context::{finish, AppContext};
use crate::output::Output;

/// Colors and font overrides for a custom theme
#[derive(Debug, Default, Clone)]
pub struct CustomThemeArgs {
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub accent: Option<String>,
    pub background: Option<String>,
    pub text: Option<String>,
    pub font: Option<String>,
    pub light: bool,
}

/// List theme categories and city presets
pub async fn list(ctx: &AppContext, output: &Output) -> Result<()> {
    let session = ctx.open_session().await?;
    output.print_themes(
        session.categories(),
        session.city_themes(),
        session.selected_theme(),
    );
    Ok(())
}

/// List available fonts
pub async fn fonts(ctx: &AppContext, output: &Output) -> Result<()> {
    let session = ctx.open_session().await?;
    output.print_fonts(session.fonts(), session.selected_font());
    Ok(())
}

/// Apply a city preset by exact name
pub async fn apply(ctx: &AppContext, name: String, output: &Output) -> Result<()> {
    let mut session = ctx.open_session().await?;
    let outcome = session.apply_theme(&name).await;

    if !outcome.is_success() && session.city_themes().iter().all(|t| t.name != name) {
        let similar: Vec<&str> = session
            .city_themes()
            .iter()
            .map(|t| t.name.as_str())
            .filter(|n| n.eq_ignore_ascii_case(&name))
            .collect();
        if let Some(suggestion) = similar.first() {
            eprintln!("Theme names are case-sensitive. Did you mean '{}'?", suggestion);
        }
    }
    finish(&session, outcome, output)
}

/// Build and apply a custom theme
///
/// Starts from the selected theme, whatever it is called, otherwise from the
/// dark default.
pub async fn custom(ctx: &AppContext, args: CustomThemeArgs, output: &Output) -> Result<()> {
    let mut session = ctx.open_session().await?;

    let config = build_custom(custom_base(session.selected_theme()), args)?;

    let outcome = session.apply_custom_theme(config).await;
    finish(&session, outcome, output)
}

/// Select a font and save
pub async fn set_font(ctx: &AppContext, id: String, output: &Output) -> Result<()> {
    let mut session = ctx.open_session().await?;

    if !session.select_font(&id) {
        let ids: Vec<&str> = session.fonts().iter().map(|f| f.id.as_str()).collect();
        bail!("Unknown font: '{}'\nAvailable fonts: {}", id, ids.join(", "));
    }
    let outcome = session.save_biosite().await;
    finish(&session, outcome, output)
}

/// Palette a custom theme starts from; a preset's city binding is dropped
fn custom_base(selected: Option<&CityTheme>) -> ThemeConfig {
    match selected {
        Some(theme) => ThemeConfig {
            city_name: None,
            ..theme.config.clone()
        },
        None => ThemeConfig::custom_dark(),
    }
}

fn build_custom(mut config: ThemeConfig, args: CustomThemeArgs) -> Result<ThemeConfig> {
    let colors = &mut config.colors;
    for (slot, value) in [
        (&mut colors.primary, args.primary),
        (&mut colors.secondary, args.secondary),
        (&mut colors.accent, args.accent),
        (&mut colors.background, args.background),
    ] {
        if let Some(value) = value {
            *slot = parse_color(&value)?;
        }
    }
    if let Some(text) = args.text {
        colors.text = Some(parse_color(&text)?);
    }
    if let Some(font) = args.font {
        config.fonts.primary = font;
    }
    if args.light {
        config.is_dark = Some(false);
    }
    Ok(config)
}

/// Accept `#rgb` or `#rrggbb`, with or without the leading `#`
fn parse_color(value: &str) -> Result<String> {
    let hex = value.trim().trim_start_matches('#');
    let valid = matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        bail!("Invalid color '{}': expected #rgb or #rrggbb", value);
    }
    Ok(format!("#{}", hex.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#FF00aa").unwrap(), "#ff00aa");
        assert_eq!(parse_color("abc").unwrap(), "#abc");
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("red").is_err());
    }

    #[test]
    fn test_build_custom_overrides_only_given_slots() {
        let args = CustomThemeArgs {
            primary: Some("#ff0000".to_string()),
            text: Some("#000".to_string()),
            light: true,
            ..Default::default()
        };

        let config = build_custom(ThemeConfig::custom_dark(), args).unwrap();
        assert_eq!(config.colors.primary, "#ff0000");
        assert_eq!(config.colors.background, "#1A1A1A");
        assert_eq!(config.colors.text.as_deref(), Some("#000"));
        assert_eq!(config.is_dark, Some(false));
    }

    #[test]
    fn test_custom_base_follows_selection() {
        let mut config = ThemeConfig::custom_dark();
        config.colors.primary = "#123456".to_string();
        config.city_name = Some("Tokyo".to_string());
        let stored = CityTheme {
            name: "Tokyo Nights".to_string(),
            config,
            preview_url: String::new(),
        };

        let base = custom_base(Some(&stored));
        assert_eq!(base.colors.primary, "#123456");
        assert!(base.city_name.is_none());

        assert_eq!(custom_base(None), ThemeConfig::custom_dark());
    }
}
