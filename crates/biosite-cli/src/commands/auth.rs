//! Login, logout, registration and status handlers

use anyhow::{bail, Result};

use biosite_core::auth::credentials::{ACCESS_TOKEN, REFRESH_TOKEN};

use crate::context::AppContext;
use crate::output::{Output, OutputFormat};
use crate::prompt::{prompt_password, prompt_required};

/// Log in and persist the token set
pub async fn login(
    ctx: &mut AppContext,
    email: Option<String>,
    password: Option<String>,
    output: &Output,
) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_required("Email")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt_password("Password")?,
    };

    let result = ctx.auth.login(&email, &password).await;
    if !result.success {
        bail!("Login failed. Check your email and password.");
    }

    match output.format {
        OutputFormat::Json => output.json(&serde_json::json!({
            "success": true,
            "userId": ctx.auth.user_id(),
            "role": ctx.auth.role(),
        })),
        OutputFormat::Quiet => {}
        OutputFormat::Human => {
            output.success(&format!("Logged in as {}", email));
            if ctx.auth.role() == Some("admin") {
                println!("⚠ Admin account: changes affect live data.");
            }
        }
    }
    Ok(())
}

/// Forget the persisted token set
pub fn logout(ctx: &mut AppContext, output: &Output) -> Result<()> {
    let was_logged_in = ctx.auth.is_authorized();
    ctx.auth.logout();

    if was_logged_in {
        output.success("Logged out");
    } else {
        output.message("Not logged in.");
    }
    Ok(())
}

/// Create an account
pub async fn register(
    ctx: &AppContext,
    email: String,
    name: String,
    password: Option<String>,
    output: &Output,
) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_password("Password")?,
    };

    let result = ctx.auth.register(&email, &password, &name).await;
    if !result.success {
        bail!(result.message);
    }

    match output.format {
        OutputFormat::Json => output.json(&result),
        _ => output.success(&result.message),
    }
    Ok(())
}

/// Show login state
pub fn status(ctx: &AppContext, output: &Output) -> Result<()> {
    let authorized = ctx.auth.is_authorized();
    let credentials = ctx.auth.credentials();
    let access_expires = credentials
        .get(ACCESS_TOKEN)
        .and(credentials.expires_at(ACCESS_TOKEN));
    let refresh_expires = credentials
        .get(REFRESH_TOKEN)
        .and(credentials.expires_at(REFRESH_TOKEN));

    match output.format {
        OutputFormat::Json => output.json(&serde_json::json!({
            "loggedIn": authorized,
            "userId": ctx.auth.user_id(),
            "role": ctx.auth.role(),
            "apiUrl": ctx.config.api_url,
            "accessTokenExpires": access_expires,
            "refreshTokenExpires": refresh_expires,
        })),
        OutputFormat::Quiet => {
            println!("{}", if authorized { "logged-in" } else { "logged-out" });
        }
        OutputFormat::Human => {
            println!("Biosite Status");
            println!("==============");
            println!();
            println!("API: {}", ctx.config.api_url);
            println!();
            if !authorized {
                println!("Not logged in.");
                println!("  biosite login");
                return Ok(());
            }
            println!("Logged in:");
            println!("  User: {}", ctx.auth.user_id().unwrap_or("(unknown)"));
            println!("  Role: {}", ctx.auth.role().unwrap_or("(unknown)"));
            if let Some(at) = access_expires {
                println!("  Access token expires:  {}", at.format("%Y-%m-%d %H:%M UTC"));
            }
            if let Some(at) = refresh_expires {
                println!("  Refresh token expires: {}", at.format("%Y-%m-%d %H:%M UTC"));
            }
        }
    }
    Ok(())
}
