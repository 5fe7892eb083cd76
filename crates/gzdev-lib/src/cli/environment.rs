use crate::cli::{DockerEnvParams, SpawnParams};
use crate::environment::run_docker_env;
use crate::error::GzdevError;

pub async fn run_ign_docker_env(params: DockerEnvParams) -> Result<(), GzdevError> {
    run_docker_env(&params.rocker_command).await
}

pub async fn run_spawn(params: SpawnParams) -> Result<(), GzdevError> {
    tracing::info!("{}", params.plan);
    Ok(())
}
