//! Whole-site command handlers

use anyhow::{bail, Context, Result};

use crate::context::{finish, AppContext};
use crate::output::{Output, OutputFormat};
use crate::prompt::confirm;

/// Create the biosite from the current (default) profile
pub async fn create(ctx: &AppContext, output: &Output) -> Result<()> {
    let mut session = ctx.open_session().await?;
    if let Some(id) = session.biosite_id() {
        bail!("A biosite already exists: {}", id);
    }

    let outcome = session.create_biosite().await;
    finish(&session, outcome, output)?;
    if output.is_quiet() {
        if let Some(id) = session.biosite_id() {
            println!("{}", id);
        }
    }
    Ok(())
}

/// Delete the biosite after confirmation
pub async fn delete(ctx: &AppContext, force: bool, output: &Output) -> Result<()> {
    let mut session = ctx.open_session().await?;

    if !force && output.should_prompt() {
        println!(
            "Delete biosite '{}' ({} link(s))? This cannot be undone.",
            session.profile().site,
            session.links().len()
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let outcome = session.delete_biosite().await;
    finish(&session, outcome, output)
}

/// Push the stored state back, resolving the theme and font
pub async fn save(ctx: &AppContext, output: &Output) -> Result<()> {
    let mut session = ctx.open_session().await?;
    let outcome = session.save_biosite().await;
    finish(&session, outcome, output)
}

/// Render the page as it currently stands
pub async fn preview(ctx: &AppContext, output: &Output) -> Result<()> {
    let session = ctx.open_session().await?;
    output.print_preview(&session.preview());
    Ok(())
}

/// Open the published page in the browser
pub async fn open(ctx: &AppContext, output: &Output) -> Result<()> {
    let session = ctx.open_session().await?;
    if session.biosite_id().is_none() {
        bail!("No biosite yet. Run `biosite site create` first.");
    }

    let url = ctx.config.public_url(&session.profile().site);
    match output.format {
        OutputFormat::Json => output.json(&serde_json::json!({ "url": url })),
        OutputFormat::Quiet => println!("{}", url),
        OutputFormat::Human => {
            open::that(&url).with_context(|| format!("Failed to open {}", url))?;
            output.success(&format!("Opened {}", url));
        }
    }
    Ok(())
}
