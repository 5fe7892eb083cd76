use eyre::Result;
use gzdev_lib::config::{
    Config, ProjectPattern, ProjectRule, RepoRef, RepositoryDef, RepositoryType, Requirements,
};
use gzdev_lib::error::GzdevError;
use gzdev_lib::install::{InstallLayout, KeyFetcher, SystemTools};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TEST_KEY: &str = "D2486D2DD83DB69272AFE98867170598AF249743";
pub const TEST_KEY_URL: &str = "https://packages.example.org/gazebo.gpg";
pub const TEST_KEY_BYTES: &[u8] = b"-----BEGIN PGP PUBLIC KEY BLOCK-----\ntest\n-----END PGP PUBLIC KEY BLOCK-----\n";

pub fn test_layout(root: &Path) -> InstallLayout {
    InstallLayout {
        sources_dir: root.join("sources.list.d"),
        keyring_dir: root.join("keyring"),
        prefix: "_prefix_".to_string(),
    }
}

fn rule(pattern: &str, repositories: &[(&str, &str)], requirements: Option<Requirements>) -> ProjectRule {
    ProjectRule {
        name: ProjectPattern::new(pattern).expect("test pattern must compile"),
        repositories: repositories
            .iter()
            .map(|(name, repo_type)| RepoRef::new(*name, *repo_type))
            .collect(),
        requirements,
    }
}

fn ubuntu_only(codenames: &[&str]) -> Option<Requirements> {
    Some(Requirements {
        distributions: Some(BTreeMap::from([(
            "ubuntu".to_string(),
            codenames.iter().map(|c| c.to_string()).collect(),
        )])),
    })
}

pub fn create_test_config(layout: InstallLayout) -> Config {
    Config {
        projects: vec![
            rule("^foo", &[("osrf", "stable")], None),
            rule("^gz-harmonic", &[("osrf", "stable")], ubuntu_only(&["jammy", "noble"])),
            rule("^gz-harmonic", &[("osrf", "prerelease")], None),
            rule("^gz-ionic", &[("osrf", "stable"), ("osrf", "prerelease")], None),
            rule("^bar", &[("osrf", "stable")], ubuntu_only(&["focal"])),
        ],
        repositories: vec![
            RepositoryDef {
                name: "osrf".to_string(),
                linux_distro: "ubuntu".to_string(),
                types: vec![
                    RepositoryType {
                        name: "stable".to_string(),
                        url: "http://example/stable".to_string(),
                    },
                    RepositoryType {
                        name: "prerelease".to_string(),
                        url: "http://example/prerelease".to_string(),
                    },
                ],
                key: TEST_KEY.to_string(),
                key_url: TEST_KEY_URL.to_string(),
            },
            RepositoryDef {
                name: "osrf".to_string(),
                linux_distro: "debian".to_string(),
                types: vec![RepositoryType {
                    name: "stable".to_string(),
                    url: "http://example/debian-stable".to_string(),
                }],
                key: TEST_KEY.to_string(),
                key_url: TEST_KEY_URL.to_string(),
            },
        ],
        install_layout: layout,
    }
}

/// A temp directory holding `config.json` and an empty install layout.
pub fn setup_test_environment() -> Result<(TempDir, PathBuf)> {
    let temp_dir = tempfile::tempdir()?;

    let layout = test_layout(temp_dir.path());
    std::fs::create_dir_all(&layout.sources_dir)?;
    std::fs::create_dir_all(&layout.keyring_dir)?;

    let config = create_test_config(layout);
    let config_path = temp_dir.path().join("config.json");
    std::fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    Ok((temp_dir, config_path))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Serves keys from memory and records every requested URL.
#[derive(Default)]
pub struct FakeKeyFetcher {
    pub keys: HashMap<String, Vec<u8>>,
    pub requests: RefCell<Vec<String>>,
}

impl FakeKeyFetcher {
    pub fn serving_test_key() -> Self {
        Self {
            keys: HashMap::from([(TEST_KEY_URL.to_string(), TEST_KEY_BYTES.to_vec())]),
            ..Self::default()
        }
    }
}

impl KeyFetcher for FakeKeyFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, GzdevError> {
        self.requests.borrow_mut().push(url.to_string());
        self.keys
            .get(url)
            .cloned()
            .ok_or_else(|| GzdevError::KeyDownload {
                url: url.to_string(),
                reason: "HTTP status 404 Not Found".to_string(),
            })
    }
}

/// Stands in for apt-get and gpg.
#[derive(Default)]
pub struct RecordingTools {
    pub gpg_listing: String,
    pub index_refreshes: Cell<usize>,
    pub inspected_keys: RefCell<Vec<PathBuf>>,
}

impl RecordingTools {
    pub fn listing_test_key() -> Self {
        Self {
            gpg_listing: format!("pub   rsa4096 2017-01-01 [SC]\n      {TEST_KEY}\nuid  OSRF\n"),
            ..Self::default()
        }
    }
}

impl SystemTools for RecordingTools {
    async fn refresh_package_index(&self) -> Result<(), GzdevError> {
        self.index_refreshes.set(self.index_refreshes.get() + 1);
        Ok(())
    }

    async fn show_keys(&self, key_path: &Path) -> Result<String, GzdevError> {
        self.inspected_keys.borrow_mut().push(key_path.to_path_buf());
        Ok(self.gpg_listing.clone())
    }
}
