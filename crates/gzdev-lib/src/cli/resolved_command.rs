use crate::cli::args::{ActionKind, Command};
use crate::cli::params::{DockerEnvParams, RepositoryParams, SpawnParams};
use crate::config::{RepoRef, load_config, load_environments};
use crate::environment::{
    DockerEnvRequest, SpawnRequest, build_rocker_command, detect_gpu_args, plan_spawn,
};
use crate::error::GzdevError;
use crate::orchestrator::{EnableTarget, RepositoryAction, RepositoryRequest};
use crate::platform::{TargetPlatform, detect_platform};
use std::path::Path;

#[derive(Debug, Clone)]
pub enum ResolvedCommand {
    Repository(RepositoryParams),
    DockerEnv(DockerEnvParams),
    Spawn(SpawnParams),
}

pub fn resolve_command(command: Command) -> Result<ResolvedCommand, GzdevError> {
    resolve_command_on(command, detect_platform, Path::new("/dev"))
}

/// Like [`resolve_command`], with the host probes supplied by the caller.
pub fn resolve_command_on(
    command: Command,
    host_platform: impl FnOnce() -> Result<TargetPlatform, GzdevError>,
    dev_root: &Path,
) -> Result<ResolvedCommand, GzdevError> {
    match command {
        Command::Repository {
            config_path,
            action,
            repo_name,
            repo_type,
            project,
            force_linux_distro,
            gpg_check,
            pre_cleanup,
        } => {
            let app_config = load_config(&config_path)?;

            let repo = RepoRef::new(repo_name, repo_type);
            let action = match action {
                ActionKind::Enable => {
                    let mut platform = host_platform()?;
                    if let Some(codename) = force_linux_distro {
                        if codename.trim().is_empty() {
                            return Err(GzdevError::CliArgumentValidation {
                                details: "--force-linux-distro needs a distribution codename"
                                    .to_string(),
                            });
                        }
                        platform = platform.with_codename(codename);
                    }
                    tracing::debug!(distro = %platform, "Target distribution");
                    RepositoryAction::Enable {
                        target: match project {
                            Some(project) => EnableTarget::Project(project),
                            None => EnableTarget::Repository(repo),
                        },
                        platform,
                    }
                }
                ActionKind::Disable => RepositoryAction::Disable(repo),
                ActionKind::List => RepositoryAction::List,
            };

            Ok(ResolvedCommand::Repository(RepositoryParams {
                app_config,
                request: RepositoryRequest {
                    action,
                    gpg_check,
                    pre_cleanup,
                },
            }))
        }
        Command::DockerEnv {
            environments_path,
            release,
            linux_distro,
            rocker_args,
            volumes,
        } => {
            let environments = load_environments(&environments_path)?;
            let request = DockerEnvRequest {
                release,
                linux_distro,
                rocker_args,
                volumes,
            };
            let rocker_command =
                build_rocker_command(&environments, &request, &detect_gpu_args(dev_root))?;
            Ok(ResolvedCommand::DockerEnv(DockerEnvParams { rocker_command }))
        }
        Command::Spawn {
            environments_path,
            gazebo_version,
            ros_distro,
            world_config,
            pull_request,
            confirm,
        } => {
            let environments = load_environments(&environments_path)?;
            let plan = plan_spawn(
                &environments.gazebo,
                &SpawnRequest {
                    gazebo_version,
                    ros_distro,
                    world_config,
                    pull_request,
                    confirm,
                },
            )?;
            Ok(ResolvedCommand::Spawn(SpawnParams { plan }))
        }
    }
}
