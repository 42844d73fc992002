use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::{DateTime, Utc};
use shared::protocol::ScriptInfo;
use tracing::debug;

use crate::{
    catalog::CombinationCatalog,
    parser::{class_display_name, derive_map_name, split_script_name, SCRIPT_EXTENSION},
    CatalogError,
};

pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 5] = ["webp", "png", "jpg", "jpeg", "gif"];
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 50 * 1024 * 1024;

/// Finds the replay script a macro should run.
pub trait ScriptLookup: Send + Sync {
    fn locate(&self, script_name: &str) -> Option<PathBuf>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub path: PathBuf,
    pub media_type: &'static str,
    pub size_bytes: u64,
}

/// Filesystem view over the script and image directories.
#[derive(Debug, Clone)]
pub struct ScriptLibrary {
    script_dir: PathBuf,
    images_dir: PathBuf,
    max_image_bytes: u64,
}

impl ScriptLibrary {
    pub fn new(script_dir: impl Into<PathBuf>, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            script_dir: script_dir.into(),
            images_dir: images_dir.into(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: u64) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// `.ahk` regular files directly inside the script directory, by name.
    fn script_files(&self) -> Result<Vec<(String, fs::Metadata)>, CatalogError> {
        let mut scripts = Vec::new();
        for entry in fs::read_dir(&self.script_dir)? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !name.ends_with(SCRIPT_EXTENSION) {
                continue;
            }
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            scripts.push((name, metadata));
        }
        scripts.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(scripts)
    }

    /// Script metadata, newest first.
    pub fn list_scripts(&self) -> Result<Vec<ScriptInfo>, CatalogError> {
        let mut scripts: Vec<(SystemTime, ScriptInfo)> = self
            .script_files()?
            .into_iter()
            .map(|(name, metadata)| {
                let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                let (class_name, map_name) = match split_script_name(&name) {
                    Some((prefix, map_slug)) => (
                        Some(class_display_name(prefix)),
                        Some(derive_map_name(map_slug)),
                    ),
                    None => (None, None),
                };
                let info = ScriptInfo {
                    size: metadata.len(),
                    modified: DateTime::<Utc>::from(modified).to_rfc3339(),
                    class_name,
                    map_name,
                    name,
                };
                (modified, info)
            })
            .collect();
        scripts.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scripts.into_iter().map(|(_, info)| info).collect())
    }

    pub fn build_catalog(&self) -> Result<CombinationCatalog, CatalogError> {
        let scripts: Vec<(String, bool)> = self
            .script_files()?
            .into_iter()
            .map(|(name, _)| {
                let has_image = self.image_for_stem(script_stem(&name)).is_some();
                (name, has_image)
            })
            .collect();
        let catalog = CombinationCatalog::from_scripts(scripts);
        debug!(
            script_dir = %self.script_dir.display(),
            combinations = catalog.len(),
            "built class/map catalog"
        );
        Ok(catalog)
    }

    fn image_for_stem(&self, stem: &str) -> Option<PathBuf> {
        SUPPORTED_IMAGE_EXTENSIONS
            .iter()
            .map(|ext| self.images_dir.join(format!("{stem}.{ext}")))
            .find(|path| path.is_file())
    }

    /// Background image for a script, looked up by the script's stem.
    pub fn find_image(&self, script_name: &str) -> Result<ImageAsset, CatalogError> {
        let stem: String = script_stem(script_name)
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            .collect();
        if stem.is_empty() || stem.starts_with('.') {
            return Err(CatalogError::NotFound(format!(
                "no image found for script '{script_name}'"
            )));
        }

        let path = self.image_for_stem(&stem).ok_or_else(|| {
            CatalogError::NotFound(format!("no image found for script '{script_name}'"))
        })?;
        let size_bytes = fs::metadata(&path)?.len();
        if size_bytes > self.max_image_bytes {
            return Err(CatalogError::TooLarge {
                path,
                size_bytes,
                limit: self.max_image_bytes,
            });
        }
        let media_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(media_type)
            .unwrap_or("image/jpeg");
        Ok(ImageAsset {
            path,
            media_type,
            size_bytes,
        })
    }
}

impl ScriptLookup for ScriptLibrary {
    fn locate(&self, script_name: &str) -> Option<PathBuf> {
        if script_name.contains(['/', '\\'])
            || script_name.contains("..")
            || !script_name.ends_with(SCRIPT_EXTENSION)
        {
            return None;
        }
        let path = self.script_dir.join(script_name);
        path.is_file().then_some(path)
    }
}

fn script_stem(script_name: &str) -> &str {
    script_name
        .strip_suffix(SCRIPT_EXTENSION)
        .unwrap_or(script_name)
}

pub fn media_type(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
#[path = "tests/library_tests.rs"]
mod tests;
