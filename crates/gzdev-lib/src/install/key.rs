use super::fetch::KeyFetcher;
use super::layout::InstallLayout;
use super::tools::SystemTools;
use crate::config::RepoRef;
use crate::error::GzdevError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Downloads a repository signing key into the keyring directory.
pub struct KeyInstaller<'a, F, T> {
    layout: &'a InstallLayout,
    fetcher: &'a F,
    tools: &'a T,
    gpg_check: bool,
}

impl<'a, F: KeyFetcher, T: SystemTools> KeyInstaller<'a, F, T> {
    pub fn new(layout: &'a InstallLayout, fetcher: &'a F, tools: &'a T, gpg_check: bool) -> Self {
        Self {
            layout,
            fetcher,
            tools,
            gpg_check,
        }
    }

    /// Always fetches a fresh copy; an existing key file is removed first.
    pub async fn install(
        &self,
        repo: &RepoRef,
        key_url: &str,
        expected_key: &str,
    ) -> Result<PathBuf, GzdevError> {
        let key_path = self.layout.key_path(repo);
        if key_path.exists() {
            tracing::warn!(
                "keyring gpg file already exists in the system: {}. Overwriting to grab the new one.",
                key_path.display()
            );
            std::fs::remove_file(&key_path).map_err(|e| GzdevError::from_io(&key_path, e))?;
        }

        let key_bytes = self.fetcher.fetch(key_url).await?;

        if let Some(parent) = key_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GzdevError::from_io(parent, e))?;
        }
        // Staged next to the final path so only a verified key becomes trusted.
        let staged_path = staged_key_path(&key_path);
        std::fs::write(&staged_path, &key_bytes)
            .map_err(|e| GzdevError::from_io(&staged_path, e))?;

        if let Err(err) = self.verify(repo, &staged_path, expected_key).await {
            if let Err(e) = std::fs::remove_file(&staged_path) {
                tracing::warn!("Failed to remove {}: {}", staged_path.display(), e);
            }
            return Err(match err {
                GzdevError::KeyMismatch { key, .. } => GzdevError::KeyMismatch {
                    key,
                    path: key_path,
                },
                other => other,
            });
        }

        std::fs::rename(&staged_path, &key_path).map_err(|e| GzdevError::from_io(&key_path, e))?;
        tracing::debug!(
            repository = %repo,
            bytes = key_bytes.len(),
            "Stored signing key at {}",
            key_path.display()
        );

        Ok(key_path)
    }

    async fn verify(
        &self,
        repo: &RepoRef,
        key_file: &Path,
        expected_key: &str,
    ) -> Result<(), GzdevError> {
        if !self.gpg_check {
            return Ok(());
        }
        let listing = self.tools.show_keys(key_file).await?;
        if !listing.contains(expected_key) {
            return Err(GzdevError::KeyMismatch {
                key: expected_key.to_string(),
                path: key_file.to_path_buf(),
            });
        }
        tracing::debug!(repository = %repo, key = expected_key, "Signing key verified");
        Ok(())
    }
}

fn staged_key_path(key_path: &Path) -> PathBuf {
    let mut file_name = key_path.file_name().map(OsString::from).unwrap_or_default();
    file_name.push(".partial");
    key_path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::testing::{FakeFetcher, FakeTools, temp_layout};

    const KEY_URL: &str = "https://example.org/gazebo.gpg";

    #[tokio::test]
    async fn test_install_writes_key_bytes_verbatim() {
        let (_dir, layout) = temp_layout();
        let fetcher = FakeFetcher::with_key(KEY_URL, b"\x99\x01binary-key");
        let tools = FakeTools::default();
        let repo = RepoRef::new("osrf", "stable");

        let key_path = KeyInstaller::new(&layout, &fetcher, &tools, false)
            .install(&repo, KEY_URL, "ABC")
            .await
            .unwrap();

        assert_eq!(key_path, layout.key_path(&repo));
        assert_eq!(std::fs::read(&key_path).unwrap(), b"\x99\x01binary-key");
        assert_eq!(tools.show_keys_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_install_replaces_stale_key() {
        let (_dir, layout) = temp_layout();
        let repo = RepoRef::new("osrf", "stable");
        std::fs::write(layout.key_path(&repo), b"stale").unwrap();
        let fetcher = FakeFetcher::with_key(KEY_URL, b"fresh");
        let tools = FakeTools::default();

        KeyInstaller::new(&layout, &fetcher, &tools, false)
            .install(&repo, KEY_URL, "ABC")
            .await
            .unwrap();

        assert_eq!(std::fs::read(layout.key_path(&repo)).unwrap(), b"fresh");
        assert_eq!(fetcher.calls.borrow().as_slice(), [KEY_URL]);
    }

    #[tokio::test]
    async fn test_download_failure_is_fatal() {
        let (_dir, layout) = temp_layout();
        let fetcher = FakeFetcher::default();
        let tools = FakeTools::default();

        let result = KeyInstaller::new(&layout, &fetcher, &tools, false)
            .install(&RepoRef::new("osrf", "stable"), KEY_URL, "ABC")
            .await;

        assert!(matches!(result, Err(GzdevError::KeyDownload { .. })));
    }

    #[tokio::test]
    async fn test_gpg_check_accepts_matching_key() {
        let (_dir, layout) = temp_layout();
        let fetcher = FakeFetcher::with_key(KEY_URL, b"key");
        let tools = FakeTools::listing("pub   rsa4096 2017-01-01\n      D2486D2DD83DB69272AFE98867170598AF249743\n");

        KeyInstaller::new(&layout, &fetcher, &tools, true)
            .install(
                &RepoRef::new("osrf", "stable"),
                KEY_URL,
                "D2486D2DD83DB69272AFE98867170598AF249743",
            )
            .await
            .unwrap();

        assert_eq!(tools.show_keys_calls.get(), 1);
    }

    #[tokio::test]
    async fn test_gpg_check_rejects_mismatched_key() {
        let (_dir, layout) = temp_layout();
        let fetcher = FakeFetcher::with_key(KEY_URL, b"key");
        let tools = FakeTools::listing("pub   rsa4096\n      0000000000000000\n");

        let result = KeyInstaller::new(&layout, &fetcher, &tools, true)
            .install(&RepoRef::new("osrf", "stable"), KEY_URL, "D2486D2DD83DB692")
            .await;

        assert!(matches!(result, Err(GzdevError::KeyMismatch { .. })));
    }

    #[tokio::test]
    async fn test_rejected_key_does_not_stay_trusted() {
        let (_dir, layout) = temp_layout();
        let repo = RepoRef::new("osrf", "stable");
        let trusted = FakeTools::listing("pub   rsa4096\n      GOODKEY\n");
        KeyInstaller::new(&layout, &FakeFetcher::with_key(KEY_URL, b"good"), &trusted, true)
            .install(&repo, KEY_URL, "GOODKEY")
            .await
            .unwrap();
        assert!(layout.key_path(&repo).exists());

        let untrusted = FakeTools::listing("pub   rsa4096\n      OTHERKEY\n");
        let result = KeyInstaller::new(&layout, &FakeFetcher::with_key(KEY_URL, b"evil"), &untrusted, true)
            .install(&repo, KEY_URL, "GOODKEY")
            .await;

        assert!(
            matches!(&result, Err(GzdevError::KeyMismatch { path, .. }) if *path == layout.key_path(&repo)),
            "{result:?}"
        );
        assert!(!layout.key_path(&repo).exists());
        let leftovers: Vec<_> = std::fs::read_dir(&layout.keyring_dir).unwrap().collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }
}
