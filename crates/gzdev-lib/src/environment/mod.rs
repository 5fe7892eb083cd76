mod docker_env;
mod spawn;

pub use docker_env::{DockerEnvRequest, build_rocker_command, detect_gpu_args, run_docker_env};
pub use spawn::{SpawnPlan, SpawnRequest, plan_spawn};
