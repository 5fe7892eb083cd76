use super::fetch::KeyFetcher;
use super::key::KeyInstaller;
use super::layout::{InstallLayout, SOURCE_EXTENSION};
use super::tools::SystemTools;
use crate::config::RepoRef;
use crate::error::GzdevError;
use crate::platform::TargetPlatform;
use crate::repository::RepositoryCatalog;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// One `deb [signed-by=...] <url> <distro> main` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceEntry {
    pub key_path: PathBuf,
    pub url: String,
    pub distro: String,
}

impl SourceEntry {
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix("deb [signed-by=")?;
        let (key_path, rest) = rest.split_once("] ")?;
        let mut fields = rest.split_whitespace();
        let url = fields.next()?;
        let distro = fields.next()?;
        if fields.next()? != "main" || fields.next().is_some() {
            return None;
        }
        Some(Self {
            key_path: PathBuf::from(key_path),
            url: url.to_string(),
            distro: distro.to_string(),
        })
    }
}

impl Display for SourceEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "deb [signed-by={}] {} {} main",
            self.key_path.display(),
            self.url,
            self.distro
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed { source_path: PathBuf, key_path: PathBuf },
    /// A system path could not be written; nothing was refreshed.
    PermissionDenied { path: PathBuf },
}

/// Installs a repository's key and source list, replacing earlier installs.
pub struct SourceInstaller<'a, F, T> {
    catalog: RepositoryCatalog<'a>,
    layout: &'a InstallLayout,
    keys: KeyInstaller<'a, F, T>,
    tools: &'a T,
}

impl<'a, F: KeyFetcher, T: SystemTools> SourceInstaller<'a, F, T> {
    pub fn new(
        catalog: RepositoryCatalog<'a>,
        layout: &'a InstallLayout,
        fetcher: &'a F,
        tools: &'a T,
        gpg_check: bool,
    ) -> Self {
        Self {
            catalog,
            layout,
            keys: KeyInstaller::new(layout, fetcher, tools, gpg_check),
            tools,
        }
    }

    pub async fn install(
        &self,
        repo: &RepoRef,
        platform: &TargetPlatform,
    ) -> Result<InstallOutcome, GzdevError> {
        let url = self
            .catalog
            .url_of(&repo.name, &repo.repo_type, &platform.family)?;
        let key = self.catalog.key_of(&repo.name)?;
        let key_url = self.catalog.key_url_of(&repo.name)?;

        tracing::info!(repository = %repo, distro = %platform, "Installing repository");
        let (source_path, key_path) = match self.write_artifacts(repo, url, key, key_url, platform).await {
            Ok(paths) => paths,
            Err(GzdevError::Permission { path }) => {
                tracing::warn!(
                    "No permission to make system file modifications ({}). Run the command with sudo.",
                    path.display()
                );
                return Ok(InstallOutcome::PermissionDenied { path });
            }
            Err(err) => return Err(err),
        };

        if let Err(err) = self.tools.refresh_package_index().await {
            tracing::warn!("Package index refresh failed: {}", err);
        }

        Ok(InstallOutcome::Installed {
            source_path,
            key_path,
        })
    }

    async fn write_artifacts(
        &self,
        repo: &RepoRef,
        url: &str,
        key: &str,
        key_url: &str,
        platform: &TargetPlatform,
    ) -> Result<(PathBuf, PathBuf), GzdevError> {
        let key_path = self.keys.install(repo, key_url, key).await?;

        let entry = SourceEntry {
            key_path: key_path.clone(),
            url: url.to_string(),
            distro: platform.codename.clone(),
        };
        let source_path = self.layout.source_path(repo);
        if source_path.is_file() {
            tracing::warn!(
                "gzdev file with the repository already exists in the system: {}. Overwriting to use new signed-by.",
                source_path.display()
            );
        }

        if let Some(parent) = source_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GzdevError::from_io(parent, e))?;
        }
        std::fs::write(&source_path, entry.to_string())
            .map_err(|e| GzdevError::from_io(&source_path, e))?;
        tracing::debug!("Wrote {}: {}", source_path.display(), entry);

        Ok((source_path, key_path))
    }
}

/// An installed source list file found on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstalledSource {
    pub repo: RepoRef,
    pub path: PathBuf,
    /// `None` when the file was edited into something unrecognisable.
    pub entry: Option<SourceEntry>,
}

pub fn list_installed_sources(layout: &InstallLayout) -> Result<Vec<InstalledSource>, GzdevError> {
    let pattern = layout.artifact_pattern(SOURCE_EXTENSION)?;
    let entries = match std::fs::read_dir(&layout.sources_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(GzdevError::from_io(&layout.sources_dir, e)),
    };

    let mut installed = Vec::new();
    for dir_entry in entries {
        let dir_entry = dir_entry?;
        let file_name = dir_entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if !pattern.is_match(file_name) {
            continue;
        }
        let Some(repo) = layout.parse_file_name(file_name, SOURCE_EXTENSION) else {
            continue;
        };
        let path = dir_entry.path();
        let entry = read_source_entry(&path)?;
        installed.push(InstalledSource { repo, path, entry });
    }
    installed.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(installed)
}

fn read_source_entry(path: &Path) -> Result<Option<SourceEntry>, GzdevError> {
    let contents = std::fs::read_to_string(path).map_err(|e| GzdevError::from_io(path, e))?;
    Ok(SourceEntry::parse(&contents))
}
