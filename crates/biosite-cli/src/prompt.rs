//! Interactive input
//!
//! Line prompts for login and editing commands, and $EDITOR for longer text
//! such as the profile description.

use anyhow::{bail, Context, Result};
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Editors tried in order when neither $EDITOR nor $VISUAL is set
const FALLBACK_EDITORS: [&str; 3] = ["nano", "vim", "vi"];

/// An editor program plus the arguments it was configured with
#[derive(Debug, PartialEq, Eq)]
struct EditorCommand {
    program: String,
    args: Vec<String>,
}

impl EditorCommand {
    /// Split a value such as `code --wait` into program and arguments
    fn parse(value: &str) -> Option<Self> {
        let mut words = value.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self {
            program,
            args: words.collect(),
        })
    }
}

/// Edit text in the user's editor and return the result
///
/// The text goes through a named temp file that is removed on return,
/// whether or not the editor succeeded. Trailing whitespace is dropped.
pub fn edit_text(initial_content: &str) -> Result<String> {
    let editor = find_editor()?;

    let mut file = tempfile::Builder::new()
        .prefix("biosite-description-")
        .suffix(".txt")
        .tempfile()
        .context("Failed to create temp file")?;
    file.write_all(initial_content.as_bytes())
        .and_then(|_| file.flush())
        .context("Failed to write temp file")?;

    let status = Command::new(&editor.program)
        .args(&editor.args)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor.program))?;
    if !status.success() {
        bail!("Editor '{}' exited with {}", editor.program, status);
    }

    // Editors may replace the file instead of writing in place
    let content = fs::read_to_string(file.path())
        .with_context(|| format!("Failed to read edited file: {}", file.path().display()))?;
    Ok(content.trim_end().to_string())
}

fn find_editor() -> Result<EditorCommand> {
    let configured = ["EDITOR", "VISUAL"]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find_map(|value| EditorCommand::parse(&value));
    if let Some(editor) = configured {
        return Ok(editor);
    }

    let path = env::var_os("PATH").unwrap_or_default();
    FALLBACK_EDITORS
        .iter()
        .find(|name| find_on_path(name, &path).is_some())
        .and_then(|name| EditorCommand::parse(name))
        .context("No editor found. Set $EDITOR, for example: export EDITOR=nano")
}

/// Locate an executable in a PATH-style list of directories
fn find_on_path(name: &str, path: &OsStr) -> Option<PathBuf> {
    env::split_paths(path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Prompt for confirmation
///
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let input = read_line()?.to_lowercase();
    Ok(input == "y" || input == "yes")
}

/// Prompt showing the current value; `None` keeps it
pub fn prompt_with_default(prompt: &str, default: &str) -> Result<Option<String>> {
    if default.is_empty() {
        print!("{}: ", prompt);
    } else {
        print!("{} [{}]: ", prompt, default);
    }
    io::stdout().flush()?;

    let input = read_line()?;
    Ok(non_empty(input))
}

/// Prompt for a value that must be given
pub fn prompt_required(prompt: &str) -> Result<String> {
    if !atty::is(atty::Stream::Stdin) {
        bail!("{} is required", prompt);
    }

    print!("{}: ", prompt);
    io::stdout().flush()?;

    required(prompt, read_line()?)
}

/// Prompt for a secret without echoing it
pub fn prompt_password(prompt: &str) -> Result<String> {
    if !atty::is(atty::Stream::Stdin) {
        bail!("{} is required", prompt);
    }

    let value = rpassword::prompt_password(format!("{}: ", prompt))
        .with_context(|| format!("Failed to read {}", prompt.to_lowercase()))?;
    // Secrets keep surrounding spaces; only an empty answer is refused
    required(prompt, value.trim_end_matches(['\r', '\n']).to_string())
}

fn required(prompt: &str, input: String) -> Result<String> {
    match non_empty(input) {
        Some(value) => Ok(value),
        None => bail!("{} is required", prompt),
    }
}

fn read_line() -> Result<String> {
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn non_empty(input: String) -> Option<String> {
    if input.is_empty() {
        None
    } else {
        Some(input)
    }
}
