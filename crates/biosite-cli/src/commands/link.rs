//! Link command handlers

use anyhow::{bail, Result};

use biosite_core::models::{coerce_url, LinkItem};

use crate::context::{finish, require_biosite, AppContext};
use crate::output::{short_id, Output};
use crate::prompt::{confirm, prompt_with_default};

/// List links in display order
pub async fn list(ctx: &AppContext, output: &Output) -> Result<()> {
    let session = ctx.open_session().await?;
    output.print_links(session.links());
    Ok(())
}

/// Append a link and save
pub async fn add(
    ctx: &AppContext,
    label: String,
    url: String,
    icon: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut session = ctx.open_session().await?;
    require_biosite(&session)?;

    if session.add_link(&label, &url, icon.as_deref()).is_none() {
        bail!("A link needs both a label and a URL");
    }
    let outcome = session.save_biosite().await;
    finish(&session, outcome, output)
}

/// Edit a link, prompting for fields not given as flags
pub async fn edit(
    ctx: &AppContext,
    id: String,
    label: Option<String>,
    url: Option<String>,
    icon: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut session = ctx.open_session().await?;
    require_biosite(&session)?;

    let mut link = find_link(session.links(), &id)?.clone();
    let interactive = label.is_none() && url.is_none() && icon.is_none();

    if interactive {
        println!("Editing link: {}", short_id(&link.id));
        println!("Press Enter to keep current value, or type new value.\n");
        if let Some(value) = prompt_with_default("Label", &link.label)? {
            link.label = value;
        }
        if let Some(value) = prompt_with_default("URL", &link.url)? {
            link.url = coerce_url(&value);
        }
        if let Some(value) = prompt_with_default("Icon", &link.icon)? {
            link.icon = value;
        }
    } else {
        if let Some(value) = label {
            link.label = value.trim().to_string();
        }
        if let Some(value) = url {
            link.url = coerce_url(&value);
        }
        if let Some(value) = icon {
            link.icon = value;
        }
    }

    if link.label.is_empty() || link.url.is_empty() {
        bail!("A link needs both a label and a URL");
    }

    session.update_link(link);
    let outcome = session.save_biosite().await;
    finish(&session, outcome, output)
}

/// Move a link to a 1-based position and save
pub async fn reorder(ctx: &AppContext, id: String, position: usize, output: &Output) -> Result<()> {
    let mut session = ctx.open_session().await?;
    require_biosite(&session)?;

    let links = move_link(session.links(), &id, position)?;
    session.set_links(links);
    let outcome = session.save_biosite().await;
    finish(&session, outcome, output)
}

/// Remove a link and save
pub async fn remove(ctx: &AppContext, id: String, output: &Output) -> Result<()> {
    let mut session = ctx.open_session().await?;
    require_biosite(&session)?;

    let link = find_link(session.links(), &id)?.clone();
    if output.should_prompt() {
        println!("Remove link: {} - {}", short_id(&link.id), link.label);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    session.remove_link(&link.id);
    let outcome = session.save_biosite().await;
    finish(&session, outcome, output)
}

/// Find a link by full id, short id prefix, or 1-based position
fn find_link<'a>(links: &'a [LinkItem], id: &str) -> Result<&'a LinkItem> {
    if let Some(link) = links.iter().find(|l| l.id == id) {
        return Ok(link);
    }

    let matches: Vec<&LinkItem> = links
        .iter()
        .filter(|l| l.id.starts_with(id) || short_id(&l.id).starts_with(id))
        .collect();

    match matches.len() {
        1 => Ok(matches[0]),
        0 => match id.parse::<usize>() {
            Ok(position) if position >= 1 && position <= links.len() => Ok(&links[position - 1]),
            _ => bail!("No link found matching: {}", id),
        },
        _ => {
            eprintln!("Multiple links match '{}':", id);
            for link in &matches {
                eprintln!("  {} - {}", short_id(&link.id), link.label);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

fn move_link(links: &[LinkItem], id: &str, position: usize) -> Result<Vec<LinkItem>> {
    if position == 0 || position > links.len() {
        bail!("Position must be between 1 and {}", links.len());
    }
    let target = find_link(links, id)?.id.clone();

    let mut reordered: Vec<LinkItem> = links.iter().filter(|l| l.id != target).cloned().collect();
    let moved = links
        .iter()
        .find(|l| l.id == target)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No link found matching: {}", id))?;
    reordered.insert(position - 1, moved);
    Ok(reordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> Vec<LinkItem> {
        vec![
            LinkItem {
                id: "link_aaaa1111".to_string(),
                label: "Blog".to_string(),
                url: "https://blog.example".to_string(),
                icon: "link".to_string(),
            },
            LinkItem {
                id: "link_aaaa2222".to_string(),
                label: "Shop".to_string(),
                url: "https://shop.example".to_string(),
                icon: "link".to_string(),
            },
            LinkItem {
                id: "link_bbbb3333".to_string(),
                label: "Music".to_string(),
                url: "https://music.example".to_string(),
                icon: "spotify".to_string(),
            },
        ]
    }

    #[test]
    fn test_find_link_by_prefix() {
        let links = links();
        assert_eq!(find_link(&links, "bbbb").unwrap().label, "Music");
        assert_eq!(find_link(&links, "link_aaaa2222").unwrap().label, "Shop");
        assert!(find_link(&links, "aaaa").is_err());
        assert!(find_link(&links, "zzzz").is_err());
    }

    #[test]
    fn test_find_link_by_position() {
        let links = links();
        assert_eq!(find_link(&links, "2").unwrap().label, "Shop");
        assert!(find_link(&links, "4").is_err());
    }

    #[test]
    fn test_move_link() {
        let links = links();
        let moved = move_link(&links, "bbbb", 1).unwrap();
        let labels: Vec<&str> = moved.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Music", "Blog", "Shop"]);

        assert!(move_link(&links, "bbbb", 0).is_err());
        assert!(move_link(&links, "bbbb", 4).is_err());
    }
}
