mod args;
mod environment;
mod params;
mod repository;
mod resolved_command;

pub use args::{ActionKind, Args, Command, parse_args};
pub use environment::{run_ign_docker_env, run_spawn};
pub use params::{DockerEnvParams, RepositoryParams, SpawnParams};
pub use repository::run_repository;
pub use resolved_command::{ResolvedCommand, resolve_command, resolve_command_on};
