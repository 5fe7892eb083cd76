use crate::install::InstallLayout;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project rules, in precedence order
    pub projects: Vec<ProjectRule>,
    pub repositories: Vec<RepositoryDef>,
    #[serde(default)]
    pub install_layout: InstallLayout,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectRule {
    /// Regular expression searched for in the project name
    pub name: ProjectPattern,
    pub repositories: Vec<RepoRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Requirements>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Requirements {
    /// Allowed codenames keyed by linux distro family
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributions: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RepoRef {
    pub name: String,
    #[serde(rename = "type")]
    pub repo_type: String,
}

impl RepoRef {
    pub fn new(name: impl Into<String>, repo_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repo_type: repo_type.into(),
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.repo_type)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryDef {
    pub name: String,
    /// Linux distro family these URLs apply to, e.g. `ubuntu`
    pub linux_distro: String,
    pub types: Vec<RepositoryType>,
    /// Expected key id, looked for in the output of `gpg --show-keys`
    pub key: String,
    pub key_url: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryType {
    pub name: String,
    pub url: String,
}

/// A compiled project name pattern. Invalid expressions are rejected while
/// the configuration is deserialized.
#[derive(Clone, Debug)]
pub struct ProjectPattern(Regex);

impl ProjectPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Unanchored search, so `ignition-math` matches `ignition-math6`.
    pub fn is_match(&self, project: &str) -> bool {
        self.0.is_match(project)
    }
}

impl<'de> Deserialize<'de> for ProjectPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        ProjectPattern::new(&pattern).map_err(|e| {
            serde::de::Error::custom(format!("invalid project pattern '{}': {}", pattern, e))
        })
    }
}

impl Serialize for ProjectPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Compatibility tables for the development environment commands.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentsConfig {
    /// Ignition release name to its default `family:codename` docker image
    pub ignition_releases: BTreeMap<String, String>,
    pub gazebo: GazeboCompatibility,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GazeboCompatibility {
    pub max_version: u32,
    /// ROS distro to the Gazebo version it officially ships with
    pub official_ros: BTreeMap<String, u32>,
    pub compatible: Vec<GazeboRelease>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GazeboRelease {
    pub version: u32,
    pub ros: Vec<String>,
}
