//! Analytics command handler

use anyhow::Result;

use biosite_core::analytics::{fetch_report, TimeRange};

use crate::context::AppContext;
use crate::output::Output;

/// Show views and clicks for the selected range
pub async fn show(ctx: &AppContext, range: TimeRange, output: &Output) -> Result<()> {
    let user_id = ctx.require_user()?;
    let report = fetch_report(ctx.gateway(), &user_id, range).await;
    output.print_report(&report);
    Ok(())
}
