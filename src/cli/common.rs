use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use ghiras::config::Config;

/// `--config` wins over the default location.
pub fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(p) => Config::load_from(&expand_path(p)),
        None => Config::load(),
    }
}

pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

/// Read a photo from disk and work out its mime type.
pub async fn read_image(
    path: &Path,
    max_bytes: u64,
    mime_override: Option<&str>,
) -> Result<(Vec<u8>, String)> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let size = tokio::fs::metadata(path).await?.len();
    if size > max_bytes {
        anyhow::bail!(
            "Image too large ({} bytes > {} bytes): {}",
            size,
            max_bytes,
            path.display()
        );
    }

    let mime_type = match mime_override {
        Some(m) => m.to_string(),
        None => mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .with_context(|| format!("Cannot infer mime type of {}", path.display()))?,
    };

    if !mime_type.starts_with("image/") {
        anyhow::bail!("Not an image ({}): {}", mime_type, path.display());
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok((bytes, mime_type))
}
