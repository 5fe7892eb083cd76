use crate::error::GzdevError;
use std::collections::HashMap;
use std::path::Path;

pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Linux distro family (e.g. `ubuntu`) and release codename (e.g. `jammy`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetPlatform {
    pub family: String,
    pub codename: String,
}

impl TargetPlatform {
    pub fn new(family: impl Into<String>, codename: impl Into<String>) -> Self {
        Self {
            family: family.into().to_lowercase(),
            codename: codename.into(),
        }
    }

    pub fn with_codename(self, codename: impl Into<String>) -> Self {
        Self {
            codename: codename.into(),
            ..self
        }
    }
}

impl std::fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.family, self.codename)
    }
}

pub fn detect_platform() -> Result<TargetPlatform, GzdevError> {
    detect_platform_from(Path::new(OS_RELEASE_PATH))
}

pub fn detect_platform_from(os_release: &Path) -> Result<TargetPlatform, GzdevError> {
    let contents =
        std::fs::read_to_string(os_release).map_err(|e| GzdevError::PlatformDetection {
            details: format!("cannot read {}: {}", os_release.display(), e),
        })?;
    parse_os_release(&contents)
}

pub fn parse_os_release(contents: &str) -> Result<TargetPlatform, GzdevError> {
    let fields: HashMap<&str, &str> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().trim_matches(|c| c == '"' || c == '\'')))
        .collect();

    let family = fields
        .get("ID")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| GzdevError::PlatformDetection {
            details: "os-release has no ID field".to_string(),
        })?;
    let codename = ["VERSION_CODENAME", "UBUNTU_CODENAME"]
        .iter()
        .filter_map(|key| fields.get(key))
        .find(|value| !value.is_empty())
        .ok_or_else(|| GzdevError::PlatformDetection {
            details: format!("os-release for {family} has no release codename"),
        })?;

    Ok(TargetPlatform::new(*family, *codename))
}
