use super::{Config, EnvironmentsConfig};
use crate::error::GzdevError;
use config::Config as ConfigBuilder;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use url::Url;

pub const REPOSITORY_CONFIG: &str = "repository.yaml";
pub const ENVIRONMENTS_CONFIG: &str = "environments.yaml";

/// Default location of a shipped config file: `config/<file>` under the
/// working directory, else next to the `gzdev` executable.
pub fn default_config_path(file_name: &str) -> String {
    let relative = Path::new("config").join(file_name);
    let beside_executable = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&relative)));
    let candidates = std::iter::once(relative.clone()).chain(beside_executable);
    first_existing(candidates)
        .unwrap_or(relative)
        .to_string_lossy()
        .into_owned()
}

fn first_existing(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|candidate| candidate.is_file())
}

fn load_document<T: DeserializeOwned>(config_path: &str) -> Result<T, GzdevError> {
    let config_builder = ConfigBuilder::builder()
        .add_source(config::File::with_name(config_path))
        .build()?;

    config_builder.try_deserialize().map_err(Into::into)
}

pub fn load_config(config_path: &str) -> Result<Config, GzdevError> {
    let app_config: Config = load_document(config_path)?;
    validate_config(&app_config, config_path)?;
    tracing::debug!(
        projects = app_config.projects.len(),
        repositories = app_config.repositories.len(),
        "Loaded repository configuration from {}",
        config_path
    );
    Ok(app_config)
}

pub fn load_environments(config_path: &str) -> Result<EnvironmentsConfig, GzdevError> {
    let environments: EnvironmentsConfig = load_document(config_path)?;
    let invalid = |details: String| GzdevError::ConfigValidation {
        path: config_path.to_string(),
        details,
    };

    for (release, image) in &environments.ignition_releases {
        if image.split_once(':').is_none() {
            return Err(invalid(format!(
                "ignition release {release} must map to a family:codename image, got '{image}'"
            )));
        }
    }
    for release in &environments.gazebo.compatible {
        if release.version == 0 || release.version > environments.gazebo.max_version {
            return Err(invalid(format!(
                "gazebo version {} is outside 1..={}",
                release.version, environments.gazebo.max_version
            )));
        }
    }
    Ok(environments)
}

fn validate_config(app_config: &Config, config_path: &str) -> Result<(), GzdevError> {
    let invalid = |details: String| GzdevError::ConfigValidation {
        path: config_path.to_string(),
        details,
    };
    let check_url = |what: &str, value: &str| {
        Url::parse(value)
            .map(|_| ())
            .map_err(|e| invalid(format!("{what} '{value}' is not a valid URL: {e}")))
    };

    for repository in &app_config.repositories {
        if repository.name.is_empty() || repository.linux_distro.is_empty() {
            return Err(invalid(
                "repositories need a non-empty name and linux_distro".to_string(),
            ));
        }
        check_url(&format!("key_url of {}", repository.name), &repository.key_url)?;
        for repo_type in &repository.types {
            check_url(
                &format!("url of {}/{}", repository.name, repo_type.name),
                &repo_type.url,
            )?;
        }
    }

    for project in &app_config.projects {
        if project.repositories.is_empty() {
            return Err(invalid(format!(
                "project rule '{}' lists no repositories",
                project.name.as_str()
            )));
        }
    }

    Ok(())
}
