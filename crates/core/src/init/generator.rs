//! Generator for the `.prd-kit/` directory structure.

use crate::init::error::{InitError, InitResult};
use crate::init::templates::{get_template, list_templates};
use std::path::{Path, PathBuf};

/// Options controlling initialization.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Directory in which `.prd-kit/` is created.
    pub target_dir: PathBuf,

    /// Overwrite an existing `.prd-kit/` directory.
    pub force: bool,

    /// Generate only `config.toml`, skipping the prompts directory.
    pub minimal: bool,
}

/// Create the `.prd-kit/` structure from embedded templates.
///
/// Returns the paths of all files written.
///
/// # Errors
///
/// Returns an error if `.prd-kit/` already exists without `force`, a
/// template is missing from the embedded assets, or any file operation
/// fails.
pub async fn generate_prd_kit_structure(options: InitOptions) -> InitResult<Vec<PathBuf>> {
    let kit_dir = options.target_dir.join(".prd-kit");

    if kit_dir.exists() && !options.force {
        return Err(InitError::DirectoryExists(kit_dir));
    }

    create_dir(&kit_dir)?;

    let mut written = Vec::new();
    written.push(write_template("config.toml", &kit_dir.join("config.toml"))?);

    if !options.minimal {
        let prompts_dir = kit_dir.join("prompts");
        create_dir(&prompts_dir)?;

        for template in list_templates("prompts/") {
            let file_name = template.trim_start_matches("prompts/");
            written.push(write_template(&template, &prompts_dir.join(file_name))?);
        }
    }

    tracing::info!(dir = %kit_dir.display(), files = written.len(), "initialized .prd-kit");
    Ok(written)
}

fn create_dir(path: &Path) -> InitResult<()> {
    std::fs::create_dir_all(path).map_err(|source| InitError::DirectoryCreate {
        path: path.to_path_buf(),
        source,
    })
}

fn write_template(template: &str, destination: &Path) -> InitResult<PathBuf> {
    let content =
        get_template(template).ok_or_else(|| InitError::TemplateNotFound(template.to_string()))?;

    std::fs::write(destination, content).map_err(|source| InitError::FileWrite {
        path: destination.to_path_buf(),
        source,
    })?;

    Ok(destination.to_path_buf())
}
