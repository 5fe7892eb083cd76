use crate::error::GzdevError;
use itertools::Itertools;
use std::future::Future;
use std::path::Path;
use tokio::process::Command;

/// Host binaries the installers shell out to.
pub trait SystemTools {
    /// `apt-get update`
    fn refresh_package_index(&self) -> impl Future<Output = Result<(), GzdevError>>;

    /// `gpg --show-keys <file>`, returning its standard output.
    fn show_keys(&self, key_path: &Path) -> impl Future<Output = Result<String, GzdevError>>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HostTools;

impl SystemTools for HostTools {
    async fn refresh_package_index(&self) -> Result<(), GzdevError> {
        run_command(&["apt-get".to_string(), "update".to_string()]).await
    }

    async fn show_keys(&self, key_path: &Path) -> Result<String, GzdevError> {
        let command = format!("gpg --show-keys {}", key_path.display());
        let output = Command::new("gpg")
            .arg("--show-keys")
            .arg(key_path)
            .output()
            .await
            .map_err(|e| GzdevError::ExternalCommand {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(GzdevError::ExternalCommand {
                command,
                reason: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Runs a command with inherited stdio, failing on a non-zero exit status.
pub async fn run_command(command: &[String]) -> Result<(), GzdevError> {
    let rendered = command.iter().join(" ");
    let Some((program, args)) = command.split_first() else {
        return Err(GzdevError::ExternalCommand {
            command: rendered,
            reason: "empty command".to_string(),
        });
    };

    tracing::info!("Invoking '{}'", rendered);
    let status = Command::new(program)
        .args(args)
        .status()
        .await
        .map_err(|e| GzdevError::ExternalCommand {
            command: rendered.clone(),
            reason: e.to_string(),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(GzdevError::ExternalCommand {
            command: rendered,
            reason: status.to_string(),
        })
    }
}
