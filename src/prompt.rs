//! Interactive fallbacks for values missing from the command line.

use crate::error::{ErrorKind, Result};
use dialoguer::Input;
use exn::ResultExt;
use shoebox_catalog::Category;
use std::path::{Path, PathBuf};

/// Ask for the inbox folder, re-asking until an existing directory is given.
/// An empty answer picks `default`.
pub fn folder(default: &Path) -> Result<PathBuf> {
    let answer: String = Input::new()
        .with_prompt("ZIP folder path")
        .default(default.display().to_string())
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            let path = Path::new(unquote(input));
            match path.is_dir() {
                true => Ok(()),
                false => Err(format!("Folder not found: {}. Please try again.", path.display())),
            }
        })
        .interact_text()
        .or_raise(|| ErrorKind::Prompt)?;
    Ok(PathBuf::from(unquote(&answer)))
}

/// Ask for a category by number or slug, re-asking on invalid input.
pub fn category() -> Result<Category> {
    println!("Select a category:");
    for category in Category::ALL {
        println!("  {}. {} ({})", category.shorthand(), category.display_name(), category.slug());
    }
    let answer: String = Input::new()
        .with_prompt("Category (1-4) or name")
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            input.parse::<Category>().map(|_| ()).map_err(|_| "Invalid category. Please try again.".to_string())
        })
        .interact_text()
        .or_raise(|| ErrorKind::Prompt)?;
    answer.parse::<Category>().or_raise(|| ErrorKind::InvalidCategory(answer.clone()))
}

/// Ask for an explicit `yes` before doing anything destructive.
pub fn confirm(prompt: &str) -> Result<bool> {
    let answer: String = Input::new()
        .with_prompt(format!("{prompt} (yes/no)"))
        .allow_empty(true)
        .interact_text()
        .or_raise(|| ErrorKind::Prompt)?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "yes" | "y")
}

/// Paths pasted from a file manager often come wrapped in quotes.
fn unquote(input: &str) -> &str {
    input.trim().trim_matches(|c| c == '"' || c == '\'')
}
