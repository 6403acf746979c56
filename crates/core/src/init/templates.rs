//! Embedded template files for .prd-kit initialization.
//!
//! This module uses `rust-embed` to embed template files from the project
//! root `templates/` directory into the binary at compile time, so the CLI
//! can generate `.prd-kit/` structures without external file dependencies.

use rust_embed::RustEmbed;

/// Embedded template files from the `templates/` directory.
///
/// The path is calculated relative to the crate root:
/// - `CARGO_MANIFEST_DIR` = `crates/core`
/// - `../../templates` = project root `templates/`
///
/// During development with the `debug-embed` feature, files are read from
/// the filesystem at runtime, allowing for quick iteration without
/// recompilation.
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../templates"]
pub struct TemplateAssets;

/// Get template file content by path.
///
/// # Arguments
/// * `path` - Relative path from templates root (e.g., "config.toml")
///
/// # Returns
/// The file content as a String, or None if the file doesn't exist.
pub fn get_template(path: &str) -> Option<String> {
    TemplateAssets::get(path).map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

/// List all template files under a directory prefix.
pub fn list_templates(prefix: &str) -> Vec<String> {
    TemplateAssets::iter()
        .filter(|path| path.starts_with(prefix))
        .map(|path| path.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_config_template() {
        let config = get_template("config.toml");
        assert!(config.is_some(), "config.toml should be embedded");
        let content = config.expect("config template");
        assert!(content.contains("model ="));
        assert!(content.contains("reasoning-budget"));
    }

    #[test]
    fn test_get_prompts_readme() {
        let readme = get_template("prompts/README.md");
        assert!(readme.is_some(), "prompts/README.md should be embedded");
        assert!(readme.expect("readme").contains("generate.md"));
    }

    #[test]
    fn test_get_nonexistent_template() {
        assert!(get_template("nonexistent.txt").is_none());
    }

    #[test]
    fn test_list_prompt_templates() {
        let prompts = list_templates("prompts/");
        assert!(prompts.contains(&"prompts/README.md".to_string()));
    }
}
