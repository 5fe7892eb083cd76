use crate::config::Config;
use crate::environment::SpawnPlan;
use crate::orchestrator::RepositoryRequest;

#[derive(Debug, Clone)]
pub struct RepositoryParams {
    pub app_config: Config,
    pub request: RepositoryRequest,
}

#[derive(Debug, Clone)]
pub struct DockerEnvParams {
    pub rocker_command: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SpawnParams {
    pub plan: SpawnPlan,
}
