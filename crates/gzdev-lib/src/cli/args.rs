use crate::config::{ENVIRONMENTS_CONFIG, REPOSITORY_CONFIG, default_config_path};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionKind {
    /// Enable repository in the system
    Enable,
    /// Disable repository (if present)
    Disable,
    /// List repositories enabled
    List,
}

#[derive(Debug, Clone)]
pub enum Command {
    Repository {
        config_path: String,
        action: ActionKind,
        repo_name: String,
        repo_type: String,
        project: Option<String>,
        force_linux_distro: Option<String>,
        gpg_check: bool,
        pre_cleanup: bool,
    },
    DockerEnv {
        environments_path: String,
        release: String,
        linux_distro: Option<String>,
        rocker_args: Option<String>,
        volumes: Option<String>,
    },
    Spawn {
        environments_path: String,
        gazebo_version: Option<String>,
        ros_distro: Option<String>,
        world_config: Option<String>,
        pull_request: Option<String>,
        confirm: bool,
    },
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "gzdev",
    version,
    about = "Gazebo development tool: set up apt repositories and development environments"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count,
        global = true
    )]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Add or inspect the apt repositories a Gazebo project needs
    Repository {
        #[arg(value_enum)]
        action: ActionKind,

        #[arg(value_name = "REPO_NAME", default_value = "osrf")]
        repo_name: String,

        #[arg(value_name = "REPO_TYPE", default_value = "stable")]
        repo_type: String,

        #[arg(
            long = "project",
            value_name = "PROJECT",
            help = "Enable the repositories configured for a project instead of a single repository"
        )]
        project: Option<String>,

        #[arg(
            long = "force-linux-distro",
            value_name = "CODENAME",
            help = "Use this distribution codename instead of the detected one"
        )]
        force_linux_distro: Option<String>,

        #[arg(long = "gpg-check", help = "Verify downloaded keys with gpg --show-keys")]
        gpg_check: bool,

        #[arg(
            long = "pre-cleanup",
            help = "Remove every gzdev source list and key before running the action"
        )]
        pre_cleanup: bool,

        #[arg(long = "keyserver", value_name = "KEYSERVER", hide = true)]
        keyserver: Option<String>,

        #[arg(
            short = 'c',
            long = "config",
            value_name = "FILE",
            help = "Sets a custom repository config file [default: config/repository.yaml]"
        )]
        config: Option<String>,
    },

    /// Build and run an Ignition docker environment with rocker
    #[command(name = "ign-docker-env")]
    IgnDockerEnv {
        #[arg(value_name = "IGN_RELEASE")]
        release: String,

        #[arg(
            long = "linux-distro",
            value_name = "FAMILY:CODENAME",
            help = "Linux distribution to use in the docker environment, e.g. ubuntu:focal"
        )]
        linux_distro: Option<String>,

        #[arg(
            long = "rocker-args",
            value_name = "ROCKER_ARGS",
            allow_hyphen_values = true,
            help = "Extra rocker arguments, quoted and separated by white space"
        )]
        rocker_args: Option<String>,

        #[arg(
            long = "vol",
            value_name = "LOCAL:CONTAINER",
            help = "Volumes to mount (separate multiple volumes with '::')"
        )]
        volumes: Option<String>,

        #[arg(
            long = "environments",
            value_name = "FILE",
            help = "Sets a custom environments config file [default: config/environments.yaml]"
        )]
        environments: Option<String>,
    },

    /// Spawn a virtual environment ready for development
    Spawn {
        #[arg(long = "gzv", value_name = "NUMBER", help = "Gazebo release version number")]
        gazebo_version: Option<String>,

        #[arg(long = "ros", value_name = "DISTRO", help = "ROS distribution name")]
        ros_distro: Option<String>,

        #[arg(long = "config", value_name = "FILE", help = "World configuration file")]
        world_config: Option<String>,

        #[arg(long = "pr", value_name = "NUMBER", help = "Branch to compile from based on Pull Request #")]
        pull_request: Option<String>,

        #[arg(long = "yes", help = "Confirm selection of unofficial ROS + Gazebo version")]
        confirm: bool,

        #[arg(
            long = "environments",
            value_name = "FILE",
            help = "Sets a custom environments config file [default: config/environments.yaml]"
        )]
        environments: Option<String>,
    },
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let mut env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();
    if let Ok(directive) = "hyper_util=warn".parse() {
        env_filter = env_filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(env_filter)
        .init();

    let command = match cli.command {
        CliCommand::Repository {
            action,
            repo_name,
            repo_type,
            project,
            force_linux_distro,
            gpg_check,
            pre_cleanup,
            keyserver,
            config,
        } => {
            if keyserver.is_some() {
                tracing::warn!("--keyserver option is deprecated. It is safe to remove it");
            }
            Command::Repository {
                config_path: config.unwrap_or_else(|| default_config_path(REPOSITORY_CONFIG)),
                action,
                repo_name,
                repo_type,
                project,
                force_linux_distro,
                gpg_check,
                pre_cleanup,
            }
        }
        CliCommand::IgnDockerEnv {
            release,
            linux_distro,
            rocker_args,
            volumes,
            environments,
        } => Command::DockerEnv {
            environments_path: environments
                .unwrap_or_else(|| default_config_path(ENVIRONMENTS_CONFIG)),
            release,
            linux_distro,
            rocker_args,
            volumes,
        },
        CliCommand::Spawn {
            gazebo_version,
            ros_distro,
            world_config,
            pull_request,
            confirm,
            environments,
        } => Command::Spawn {
            environments_path: environments
                .unwrap_or_else(|| default_config_path(ENVIRONMENTS_CONFIG)),
            gazebo_version,
            ros_distro,
            world_config,
            pull_request,
            confirm,
        },
    };

    Args { command, log_level }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_repository_defaults() {
        let cli = Cli::try_parse_from(["gzdev", "repository", "enable"]).unwrap();
        let CliCommand::Repository {
            action,
            repo_name,
            repo_type,
            gpg_check,
            pre_cleanup,
            config,
            ..
        } = cli.command
        else {
            panic!("expected repository command");
        };
        assert_eq!(action, ActionKind::Enable);
        assert_eq!(repo_name, "osrf");
        assert_eq!(repo_type, "stable");
        assert!(!gpg_check);
        assert!(!pre_cleanup);
        assert_eq!(config, None);
    }

    #[test]
    fn test_repository_project_flags() {
        let cli = Cli::try_parse_from([
            "gzdev",
            "repository",
            "enable",
            "--project=gz-harmonic",
            "--force-linux-distro",
            "jammy",
            "--gpg-check",
            "--pre-cleanup",
        ])
        .unwrap();
        let CliCommand::Repository {
            project,
            force_linux_distro,
            gpg_check,
            pre_cleanup,
            ..
        } = cli.command
        else {
            panic!("expected repository command");
        };
        assert_eq!(project.as_deref(), Some("gz-harmonic"));
        assert_eq!(force_linux_distro.as_deref(), Some("jammy"));
        assert!(gpg_check);
        assert!(pre_cleanup);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        assert!(Cli::try_parse_from(["gzdev", "repository", "purge"]).is_err());
    }

    #[test]
    fn test_docker_env_arguments() {
        let cli = Cli::try_parse_from([
            "gzdev",
            "ign-docker-env",
            "citadel",
            "--rocker-args",
            "--home --dev-helpers",
        ])
        .unwrap();
        let CliCommand::IgnDockerEnv {
            release,
            rocker_args,
            ..
        } = cli.command
        else {
            panic!("expected ign-docker-env command");
        };
        assert_eq!(release, "citadel");
        assert_eq!(rocker_args.as_deref(), Some("--home --dev-helpers"));
    }
}
