//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use biosite_core::analytics::AnalyticsReport;
use biosite_core::models::{CityTheme, LinkItem, ProfileData, ThemeCategory, ThemeFont};
use biosite_core::Preview;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print any serializable value as pretty JSON
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize output: {}", e),
        }
    }

    /// Print the profile block
    pub fn print_profile(&self, biosite_id: Option<&str>, profile: &ProfileData) {
        match self.format {
            OutputFormat::Human => {
                println!("Biosite:     {}", biosite_id.unwrap_or("(not created)"));
                println!("Name:        {}", profile.name);
                println!("Description: {}", profile.description);
                println!("Site:        {}", profile.site);
                if profile.avatar_url.is_empty() {
                    println!("Avatar:      (none)");
                } else {
                    println!("Avatar:      {}", truncate(&profile.avatar_url, 60));
                }
            }
            OutputFormat::Json => {
                self.json(&serde_json::json!({
                    "biositeId": biosite_id,
                    "profile": profile,
                }));
            }
            OutputFormat::Quiet => {
                println!("{}", profile.site);
            }
        }
    }

    /// Print the link list in display order
    pub fn print_links(&self, links: &[LinkItem]) {
        match self.format {
            OutputFormat::Human => {
                if links.is_empty() {
                    println!("No links yet.");
                    return;
                }
                for (position, link) in links.iter().enumerate() {
                    println!(
                        "{:>2}. {} | {} | {} [{}]",
                        position + 1,
                        short_id(&link.id),
                        truncate(&link.label, 30),
                        truncate(&link.url, 45),
                        link.icon
                    );
                }
                println!("\n{} link(s)", links.len());
            }
            OutputFormat::Json => self.json(links),
            OutputFormat::Quiet => {
                for link in links {
                    println!("{}", link.id);
                }
            }
        }
    }

    /// Print categories and presets, marking the current selection
    pub fn print_themes(
        &self,
        categories: &[ThemeCategory],
        themes: &[CityTheme],
        selected: Option<&CityTheme>,
    ) {
        match self.format {
            OutputFormat::Human => {
                if !categories.is_empty() {
                    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
                    println!("Categories: {}", names.join(", "));
                    println!();
                }
                if themes.is_empty() {
                    println!("No themes available.");
                    return;
                }
                for theme in themes {
                    let marker = if selected.is_some_and(|s| s.name == theme.name) {
                        "*"
                    } else {
                        " "
                    };
                    let mode = if theme.config.is_dark.unwrap_or(false) {
                        "dark"
                    } else {
                        "light"
                    };
                    println!(
                        "{} {:<20} {} / {}  ({})",
                        marker,
                        theme.name,
                        theme.config.colors.primary,
                        theme.config.colors.background,
                        mode
                    );
                }
                if let Some(theme) = selected.filter(|s| !themes.iter().any(|t| t.name == s.name))
                {
                    println!("* {:<20} (custom)", theme.name);
                }
            }
            OutputFormat::Json => {
                self.json(&serde_json::json!({
                    "categories": categories,
                    "cityThemes": themes,
                    "selected": selected,
                }));
            }
            OutputFormat::Quiet => {
                for theme in themes {
                    println!("{}", theme.name);
                }
            }
        }
    }

    /// Print the font catalog, marking the current selection
    pub fn print_fonts(&self, fonts: &[ThemeFont], selected: Option<&ThemeFont>) {
        match self.format {
            OutputFormat::Human => {
                if fonts.is_empty() {
                    println!("No fonts available.");
                    return;
                }
                for font in fonts {
                    let marker = if selected.is_some_and(|s| s.id == font.id) {
                        "*"
                    } else {
                        " "
                    };
                    println!("{} {:<16} {:<20} {}", marker, font.id, font.name, font.family);
                }
            }
            OutputFormat::Json => self.json(fonts),
            OutputFormat::Quiet => {
                for font in fonts {
                    println!("{}", font.id);
                }
            }
        }
    }

    pub fn print_preview(&self, preview: &Preview) {
        match self.format {
            OutputFormat::Human => println!("{}", preview),
            OutputFormat::Json => self.json(preview),
            OutputFormat::Quiet => println!("{}", preview.display_name),
        }
    }

    pub fn print_report(&self, report: &AnalyticsReport) {
        match self.format {
            OutputFormat::Human => {
                println!("Analytics for {} ({})", report.username, report.time_range);
                println!();
                println!("Views:      {}", report.views);
                println!("Clicks:     {}", report.clicks);
                println!("Click rate: {:.1}%", report.click_rate());

                if !report.click_details.is_empty() {
                    println!();
                    println!("── Clicks by link ──");
                    for detail in &report.click_details {
                        println!("{:>6}  {}", detail.count, truncate(&detail.label, 50));
                    }
                }

                if !report.daily_activity.is_empty() {
                    println!();
                    println!("── Activity ──");
                    let peak = report
                        .daily_activity
                        .iter()
                        .map(|d| d.views)
                        .max()
                        .unwrap_or(0);
                    for day in &report.daily_activity {
                        println!(
                            "{:<8} {:>6} {:>5}  {}",
                            day.day,
                            day.views,
                            day.clicks,
                            bar(day.views, peak, 30)
                        );
                    }
                }
            }
            OutputFormat::Json => self.json(report),
            OutputFormat::Quiet => println!("{} {}", report.views, report.clicks),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// First eight characters of a link id, skipping the `link_` prefix
pub fn short_id(id: &str) -> &str {
    let id = id.strip_prefix("link_").unwrap_or(id);
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Horizontal bar scaled against the peak value
fn bar(value: u64, peak: u64, width: usize) -> String {
    if peak == 0 {
        return String::new();
    }
    let len = (value as f64 / peak as f64 * width as f64).round() as usize;
    "█".repeat(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("ñandú ñandú ñandú", 8), "ñandú...");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("link_0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(10, 10, 4), "████");
        assert_eq!(bar(5, 10, 4), "██");
        assert_eq!(bar(3, 0, 4), "");
    }
}
