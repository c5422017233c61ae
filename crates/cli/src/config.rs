use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tagtext_core::RenderOptions;

/// Settings read from a `--config` file.
///
/// ```yaml
/// markdown: true
/// smartypants: false
/// unwrapImages: true
/// maxTagDepth: 8
/// tagDirs:
///   - site/tags
/// ```
///
/// Relative tag directories are resolved against the config file's directory.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Render options; absent keys keep their defaults.
    #[serde(flatten)]
    pub options: RenderOptions,
    /// Template tag directories, highest precedence first.
    pub tag_dirs: Vec<PathBuf>,
}

impl Config {
    /// Load and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config = Self::parse(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for dir in &mut config.tag_dirs {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        Ok(config)
    }

    /// Parse config YAML. An empty document yields the defaults.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
        assert_eq!(Config::parse("  \n").unwrap().options, RenderOptions::default());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = Config::parse("smartypants: false\nmaxTagDepth: 4\n").unwrap();
        assert!(config.options.markdown);
        assert!(!config.options.smartypants);
        assert!(!config.options.unwrap_images);
        assert_eq!(config.options.max_tag_depth, 4);
        assert!(config.tag_dirs.is_empty());
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(Config::parse("markdown: [1, 2]").is_err());
    }

    #[test]
    fn load_resolves_tag_dirs_against_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagtext.yaml");
        fs::write(&path, "unwrapImages: true\ntagDirs:\n  - tags\n  - /abs/tags\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.options.unwrap_images);
        assert_eq!(
            config.tag_dirs,
            vec![dir.path().join("tags"), PathBuf::from("/abs/tags")]
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
