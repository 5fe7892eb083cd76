use crate::config::RepoRef;
use crate::error::GzdevError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const SOURCE_EXTENSION: &str = "list";
pub const KEY_EXTENSION: &str = "gpg";

/// Where installed artifacts live and how they are named:
/// `<dir>/<prefix><repo>_<type>.<ext>`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct InstallLayout {
    pub sources_dir: PathBuf,
    pub keyring_dir: PathBuf,
    pub prefix: String,
}

impl Default for InstallLayout {
    fn default() -> Self {
        Self {
            sources_dir: PathBuf::from("/etc/apt/sources.list.d"),
            keyring_dir: PathBuf::from("/usr/share/keyrings"),
            prefix: "_gzdev_".to_string(),
        }
    }
}

impl InstallLayout {
    fn file_name(&self, repo: &RepoRef, extension: &str) -> String {
        format!("{}{}_{}.{}", self.prefix, repo.name, repo.repo_type, extension)
    }

    pub fn source_path(&self, repo: &RepoRef) -> PathBuf {
        self.sources_dir.join(self.file_name(repo, SOURCE_EXTENSION))
    }

    pub fn key_path(&self, repo: &RepoRef) -> PathBuf {
        self.keyring_dir.join(self.file_name(repo, KEY_EXTENSION))
    }

    /// Matches every artifact file name with the given extension.
    pub fn artifact_pattern(&self, extension: &str) -> Result<Regex, GzdevError> {
        let pattern = format!(
            "^{}.+\\.{}$",
            regex::escape(&self.prefix),
            regex::escape(extension)
        );
        Regex::new(&pattern)
            .map_err(|e| eyre::eyre!("invalid artifact pattern {pattern}: {e}").into())
    }

    /// Recovers the repository reference from an artifact file name. Types
    /// never contain `_`, so the last one separates name and type.
    pub fn parse_file_name(&self, file_name: &str, extension: &str) -> Option<RepoRef> {
        let stem = file_name
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(extension)?
            .strip_suffix('.')?;
        let (name, repo_type) = stem.rsplit_once('_')?;
        if name.is_empty() || repo_type.is_empty() {
            return None;
        }
        Some(RepoRef::new(name, repo_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_default_paths() {
        let layout = InstallLayout::default();
        let repo = RepoRef::new("osrf", "stable");
        assert_eq!(
            layout.source_path(&repo),
            Path::new("/etc/apt/sources.list.d/_gzdev_osrf_stable.list")
        );
        assert_eq!(
            layout.key_path(&repo),
            Path::new("/usr/share/keyrings/_gzdev_osrf_stable.gpg")
        );
    }

    #[test]
    fn test_artifact_pattern() {
        let layout = InstallLayout::default();
        let sources = layout.artifact_pattern(SOURCE_EXTENSION).unwrap();
        assert!(sources.is_match("_gzdev_osrf_stable.list"));
        assert!(!sources.is_match("_gzdev_osrf_stable.gpg"));
        assert!(!sources.is_match("ros2.list"));
        assert!(!sources.is_match("x_gzdev_osrf_stable.list"));
        assert!(!sources.is_match("_gzdev_osrf_stable.list.save"));
    }

    #[test]
    fn test_parse_file_name() {
        let layout = InstallLayout::default();
        assert_eq!(
            layout.parse_file_name("_gzdev_ros_bootstrap_main.list", SOURCE_EXTENSION),
            Some(RepoRef::new("ros_bootstrap", "main"))
        );
        assert_eq!(layout.parse_file_name("_gzdev_osrf.list", SOURCE_EXTENSION), None);
        assert_eq!(layout.parse_file_name("other_osrf_stable.list", SOURCE_EXTENSION), None);
    }

    #[test]
    fn test_file_name_round_trip() {
        let layout = InstallLayout {
            prefix: "_prefix_".to_string(),
            ..InstallLayout::default()
        };
        let repo = RepoRef::new("osrf", "prerelease");
        let path = layout.key_path(&repo);
        let file_name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(layout.parse_file_name(file_name, KEY_EXTENSION), Some(repo));
    }
}
