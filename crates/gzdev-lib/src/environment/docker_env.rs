use crate::config::EnvironmentsConfig;
use crate::error::GzdevError;
use crate::install::run_command;
use itertools::Itertools;
use std::path::Path;
use std::time::Duration;

const ROCKER_BASE: [&str; 3] = ["rocker", "--x11", "--user"];

/// Pause so the user can read the rocker command before its output scrolls it away.
const INVOKE_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, Default)]
pub struct DockerEnvRequest {
    pub release: String,
    /// `family:codename`, defaults to the release's entry in the environments config
    pub linux_distro: Option<String>,
    /// Extra rocker arguments, whitespace separated
    pub rocker_args: Option<String>,
    /// `local:container[::local:container ...]`
    pub volumes: Option<String>,
}

/// Picks GPU passthrough flags from the devices present under `dev_root`.
pub fn detect_gpu_args(dev_root: &Path) -> Vec<String> {
    let names = |dir: &Path| -> Vec<String> {
        std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter_map(|e| e.file_name().into_string().ok())
                    .sorted()
                    .collect()
            })
            .unwrap_or_default()
    };

    if names(dev_root).iter().any(|name| name.starts_with("nvidia")) {
        return vec!["--nvidia".to_string()];
    }
    names(&dev_root.join("dri"))
        .into_iter()
        .find(|name| name.starts_with("card"))
        .map(|card| vec!["--devices".to_string(), format!("/dev/dri/{card}")])
        .unwrap_or_default()
}

pub fn build_rocker_command(
    environments: &EnvironmentsConfig,
    request: &DockerEnvRequest,
    gpu_args: &[String],
) -> Result<Vec<String>, GzdevError> {
    let Some(default_distro) = environments.ignition_releases.get(&request.release) else {
        return Err(GzdevError::CliArgumentValidation {
            details: format!(
                "Invalid value given for IGN_RELEASE. Please choose from {}",
                environments.ignition_releases.keys().join(", ")
            ),
        });
    };
    let linux_distro = request.linux_distro.as_ref().unwrap_or(default_distro);
    let Some((_, codename)) = linux_distro.split_once(':') else {
        return Err(GzdevError::CliArgumentValidation {
            details: format!("linux distro '{linux_distro}' must look like ubuntu:focal"),
        });
    };

    let mut command: Vec<String> = ROCKER_BASE.iter().map(|s| s.to_string()).collect();
    command.extend(gpu_args.iter().cloned());
    command.push("--ignition".to_string());
    command.push(format!("{}:{}", request.release, codename));
    if let Some(rocker_args) = &request.rocker_args {
        command.extend(rocker_args.split_whitespace().map(str::to_string));
    }
    if let Some(volumes) = &request.volumes {
        command.push("--vol".to_string());
        command.push(volumes.clone());
    }
    command.push(linux_distro.clone());
    command.push("/bin/bash".to_string());
    Ok(command)
}

pub async fn run_docker_env(command: &[String]) -> Result<(), GzdevError> {
    tokio::time::sleep(INVOKE_DELAY).await;
    if let Err(err) = run_command(command).await {
        tracing::warn!("{}", err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GazeboCompatibility;
    use std::collections::BTreeMap;

    fn environments() -> EnvironmentsConfig {
        EnvironmentsConfig {
            ignition_releases: BTreeMap::from([
                ("citadel".to_string(), "ubuntu:bionic".to_string()),
                ("fortress".to_string(), "ubuntu:focal".to_string()),
            ]),
            gazebo: GazeboCompatibility {
                max_version: 9,
                official_ros: BTreeMap::new(),
                compatible: Vec::new(),
            },
        }
    }

    #[test]
    fn test_default_distro_for_release() {
        let request = DockerEnvRequest {
            release: "citadel".to_string(),
            ..DockerEnvRequest::default()
        };
        let command = build_rocker_command(&environments(), &request, &[]).unwrap();
        assert_eq!(
            command,
            vec![
                "rocker",
                "--x11",
                "--user",
                "--ignition",
                "citadel:bionic",
                "ubuntu:bionic",
                "/bin/bash"
            ]
        );
    }

    #[test]
    fn test_overrides_and_extra_arguments() {
        let request = DockerEnvRequest {
            release: "fortress".to_string(),
            linux_distro: Some("ubuntu:jammy".to_string()),
            rocker_args: Some("--home  --network host".to_string()),
            volumes: Some("/src:/ws/src::/data:/data".to_string()),
        };
        let command =
            build_rocker_command(&environments(), &request, &["--nvidia".to_string()]).unwrap();
        assert_eq!(
            command.join(" "),
            "rocker --x11 --user --nvidia --ignition fortress:jammy --home --network host \
             --vol /src:/ws/src::/data:/data ubuntu:jammy /bin/bash"
        );
    }

    #[test]
    fn test_unknown_release_lists_choices() {
        let request = DockerEnvRequest {
            release: "garden".to_string(),
            ..DockerEnvRequest::default()
        };
        let err = build_rocker_command(&environments(), &request, &[]).unwrap_err();
        assert!(err.to_string().contains("citadel, fortress"), "{err}");
    }

    #[test]
    fn test_unknown_release_fails_even_with_distro() {
        let request = DockerEnvRequest {
            release: "garden".to_string(),
            linux_distro: Some("ubuntu:jammy".to_string()),
            ..DockerEnvRequest::default()
        };
        assert!(matches!(
            build_rocker_command(&environments(), &request, &[]),
            Err(GzdevError::CliArgumentValidation { .. })
        ));
    }

    #[test]
    fn test_malformed_distro() {
        let request = DockerEnvRequest {
            release: "citadel".to_string(),
            linux_distro: Some("bionic".to_string()),
            ..DockerEnvRequest::default()
        };
        assert!(build_rocker_command(&environments(), &request, &[]).is_err());
    }

    #[test]
    fn test_gpu_detection() {
        let dev = tempfile::tempdir().unwrap();
        assert!(detect_gpu_args(dev.path()).is_empty());

        std::fs::create_dir(dev.path().join("dri")).unwrap();
        std::fs::write(dev.path().join("dri").join("renderD128"), "").unwrap();
        std::fs::write(dev.path().join("dri").join("card1"), "").unwrap();
        assert_eq!(detect_gpu_args(dev.path()), vec!["--devices", "/dev/dri/card1"]);

        std::fs::write(dev.path().join("nvidia0"), "").unwrap();
        assert_eq!(detect_gpu_args(dev.path()), vec!["--nvidia"]);
    }
}
