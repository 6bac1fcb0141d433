//! Biosite CLI
//!
//! Command-line dashboard for editing a link-in-bio page: profile, links,
//! theme and font, with a text preview and analytics.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use biosite_core::models::ProfileField;
use biosite_core::{Config, TimeRange};

mod commands;
mod context;
mod output;
mod prompt;

use commands::theme::CustomThemeArgs;
use context::AppContext;
use output::{Output, OutputFormat};

/// Log filter variable; a bare level applies to both crates
const LOG_ENV: &str = "BIOSITE_LOG";

#[derive(Parser)]
#[command(name = "biosite")]
#[command(about = "Biosite - edit your link-in-bio page")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        /// Account email (prompted if omitted)
        email: Option<String>,
        /// Password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Create an account
    Register {
        /// Account email
        email: String,
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Show login status
    Status,
    /// Show or edit the profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Manage links
    Link {
        #[command(subcommand)]
        command: LinkCommands,
    },
    /// Browse and apply themes
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },
    /// Choose the page font
    Font {
        #[command(subcommand)]
        command: FontCommands,
    },
    /// Push profile, links, theme and font in one save
    Save,
    /// Print a text preview of the page
    Preview,
    /// Create, delete or open the biosite
    Site {
        #[command(subcommand)]
        command: SiteCommands,
    },
    /// Show views and clicks
    Analytics {
        /// Time range (last7, last30, lastYear)
        #[arg(short, long, default_value = "last7")]
        range: TimeRange,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show profile fields
    Show,
    /// Set a field (name, description, site, avatar) and save
    Set {
        field: ProfileField,
        /// New value (description opens $EDITOR when omitted)
        value: Option<String>,
    },
    /// Use an image file as the avatar and save
    Avatar {
        /// Image file (png, jpg, gif, webp, svg)
        path: PathBuf,
    },
    /// Save name, site and cover, creating the biosite if needed
    Save {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        site: Option<String>,
        /// Cover image URL (empty to remove)
        #[arg(long)]
        cover: Option<String>,
    },
}

#[derive(Subcommand)]
enum LinkCommands {
    /// List links in display order
    #[command(alias = "ls")]
    List,
    /// Add a link
    Add {
        label: String,
        /// URL (https:// is added when missing)
        url: String,
        /// Icon tag
        #[arg(short, long)]
        icon: Option<String>,
    },
    /// Edit a link (interactive unless flags are given)
    Edit {
        /// Link ID (full, prefix, or position)
        id: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Move a link to a new position
    Move {
        /// Link ID (full, prefix, or position)
        id: String,
        /// New 1-based position
        position: usize,
    },
    /// Remove a link
    #[command(alias = "rm")]
    Remove {
        /// Link ID (full, prefix, or position)
        id: String,
    },
}

#[derive(Subcommand)]
enum ThemeCommands {
    /// List categories and city themes
    #[command(alias = "ls")]
    List,
    /// List available fonts
    Fonts,
    /// Apply a city theme by exact name
    Apply { name: String },
    /// Build and apply a custom theme
    Custom {
        #[arg(long)]
        primary: Option<String>,
        #[arg(long)]
        secondary: Option<String>,
        #[arg(long)]
        accent: Option<String>,
        #[arg(long)]
        background: Option<String>,
        #[arg(long)]
        text: Option<String>,
        /// Primary font family
        #[arg(long)]
        font: Option<String>,
        /// Mark the theme as light
        #[arg(long)]
        light: bool,
    },
}

#[derive(Subcommand)]
enum FontCommands {
    /// Select a font by id and save
    Set { id: String },
}

#[derive(Subcommand)]
enum SiteCommands {
    /// Create the biosite
    Create,
    /// Delete the biosite
    Delete {
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Open the published page in the browser
    Open,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, data_dir, public_host, request_timeout_secs, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    init_logging(cli.config.as_ref());

    // Config doesn't need credentials or the API
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let mut ctx = AppContext::load(cli.config.clone())?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&mut ctx, email, password, &output).await
        }
        Commands::Logout => commands::auth::logout(&mut ctx, &output),
        Commands::Register {
            email,
            name,
            password,
        } => commands::auth::register(&ctx, email, name, password, &output).await,
        Commands::Status => commands::auth::status(&ctx, &output),
        Commands::Profile { command } => handle_profile_command(command, &ctx, &output).await,
        Commands::Link { command } => handle_link_command(command, &ctx, &output).await,
        Commands::Theme { command } => handle_theme_command(command, &ctx, &output).await,
        Commands::Font {
            command: FontCommands::Set { id },
        } => commands::theme::set_font(&ctx, id, &output).await,
        Commands::Save => commands::site::save(&ctx, &output).await,
        Commands::Preview => commands::site::preview(&ctx, &output).await,
        Commands::Site { command } => match command {
            SiteCommands::Create => commands::site::create(&ctx, &output).await,
            SiteCommands::Delete { force } => commands::site::delete(&ctx, force, &output).await,
            SiteCommands::Open => commands::site::open(&ctx, &output).await,
        },
        Commands::Analytics { range } => commands::analytics::show(&ctx, range, &output).await,
        Commands::Config { .. } => Ok(()), // Handled above
    }
}

async fn handle_profile_command(
    command: ProfileCommands,
    ctx: &AppContext,
    output: &Output,
) -> Result<()> {
    match command {
        ProfileCommands::Show => commands::profile::show(ctx, output).await,
        ProfileCommands::Set { field, value } => {
            commands::profile::set(ctx, field, value, output).await
        }
        ProfileCommands::Avatar { path } => commands::profile::avatar(ctx, &path, output).await,
        ProfileCommands::Save { name, site, cover } => {
            commands::profile::save(ctx, name, site, cover, output).await
        }
    }
}

async fn handle_link_command(command: LinkCommands, ctx: &AppContext, output: &Output) -> Result<()> {
    match command {
        LinkCommands::List => commands::link::list(ctx, output).await,
        LinkCommands::Add { label, url, icon } => {
            commands::link::add(ctx, label, url, icon, output).await
        }
        LinkCommands::Edit {
            id,
            label,
            url,
            icon,
        } => commands::link::edit(ctx, id, label, url, icon, output).await,
        LinkCommands::Move { id, position } => {
            commands::link::reorder(ctx, id, position, output).await
        }
        LinkCommands::Remove { id } => commands::link::remove(ctx, id, output).await,
    }
}

async fn handle_theme_command(
    command: ThemeCommands,
    ctx: &AppContext,
    output: &Output,
) -> Result<()> {
    match command {
        ThemeCommands::List => commands::theme::list(ctx, output).await,
        ThemeCommands::Fonts => commands::theme::fonts(ctx, output).await,
        ThemeCommands::Apply { name } => commands::theme::apply(ctx, name, output).await,
        ThemeCommands::Custom {
            primary,
            secondary,
            accent,
            background,
            text,
            font,
            light,
        } => {
            let args = CustomThemeArgs {
                primary,
                secondary,
                accent,
                background,
                text,
                font,
                light,
            };
            commands::theme::custom(ctx, args, output).await
        }
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Set up tracing to the configured log file, or stderr
///
/// `BIOSITE_LOG` takes a level (`debug`) or a full filter directive.
fn init_logging(config_path: Option<&PathBuf>) {
    let filter = log_filter(std::env::var(LOG_ENV).ok().as_deref());
    let log_file = Config::load_with_cli_override(config_path)
        .ok()
        .and_then(|config| config.log_file);

    match log_file {
        Some(path) => {
            let file = match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not open log file {:?}: {}", path, e);
                    return;
                }
            };
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}

fn log_filter(value: Option<&str>) -> EnvFilter {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(directive) if directive.contains('=') => EnvFilter::new(directive),
        Some(level) => EnvFilter::new(format!("biosite_core={0},biosite_cli={0}", level)),
        None => EnvFilter::new("biosite_core=warn,biosite_cli=warn"),
    }
}
