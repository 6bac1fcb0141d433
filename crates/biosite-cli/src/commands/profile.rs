//! Profile command handlers

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use biosite_core::models::ProfileField;

use crate::context::{finish, require_biosite, AppContext};
use crate::output::Output;
use crate::prompt::edit_text;

/// Largest avatar file accepted for inline embedding
const MAX_AVATAR_BYTES: u64 = 2 * 1024 * 1024;

/// Show the profile fields
pub async fn show(ctx: &AppContext, output: &Output) -> Result<()> {
    let session = ctx.open_session().await?;
    output.print_profile(session.biosite_id(), session.profile());
    Ok(())
}

/// Set one field and save
///
/// Without a value the description opens in $EDITOR.
pub async fn set(
    ctx: &AppContext,
    field: ProfileField,
    value: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut session = ctx.open_session().await?;
    require_biosite(&session)?;

    let value = match value {
        Some(value) => value,
        None if field == ProfileField::Description => edit_text(session.profile().get(field))?,
        None => bail!("A value is required for this field"),
    };

    session.update_profile_field(field, value);
    let outcome = session.save_biosite().await;
    finish(&session, outcome, output)
}

/// Embed an image file as the avatar and save
pub async fn avatar(ctx: &AppContext, path: &Path, output: &Output) -> Result<()> {
    let data_url = encode_avatar(path)?;

    let mut session = ctx.open_session().await?;
    require_biosite(&session)?;
    session.update_profile_field(ProfileField::AvatarUrl, data_url);
    let outcome = session.save_biosite().await;
    finish(&session, outcome, output)
}

/// Profile editor save: apply the given fields, creating the biosite if
/// there is none yet
pub async fn save(
    ctx: &AppContext,
    name: Option<String>,
    site: Option<String>,
    cover: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut session = ctx.open_session().await?;

    if let Some(name) = name {
        session.update_profile_field(ProfileField::Name, name);
    }
    if let Some(site) = site {
        session.update_profile_field(ProfileField::Site, site);
    }
    if let Some(cover) = cover {
        session.set_background_image(Some(cover).filter(|c| !c.is_empty()));
    }

    let outcome = session.save_profile().await;
    finish(&session, outcome, output)
}

/// Read an image and encode it as a `data:` URL
fn encode_avatar(path: &Path) -> Result<String> {
    let metadata =
        fs::metadata(path).with_context(|| format!("Failed to read avatar file: {:?}", path))?;
    if metadata.len() > MAX_AVATAR_BYTES {
        bail!(
            "Avatar file is too large ({} bytes, max {})",
            metadata.len(),
            MAX_AVATAR_BYTES
        );
    }

    let mime = mime_for(path)
        .with_context(|| format!("Unsupported image type: {:?} (use png, jpg, gif, webp or svg)", path))?;
    let bytes = fs::read(path).with_context(|| format!("Failed to read avatar file: {:?}", path))?;

    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for(Path::new("me.PNG")), Some("image/png"));
        assert_eq!(mime_for(Path::new("me.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_for(Path::new("me.txt")), None);
        assert_eq!(mime_for(Path::new("me")), None);
    }

    #[test]
    fn test_encode_avatar() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("avatar.png");
        fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let url = encode_avatar(&path).unwrap();
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_encode_avatar_rejects_unknown_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("avatar.bmp");
        fs::write(&path, b"BM").unwrap();

        assert!(encode_avatar(&path).is_err());
    }
}
