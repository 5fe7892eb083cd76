use gzdev_lib::cli::{
    ResolvedCommand, parse_args, resolve_command, run_ign_docker_env, run_repository, run_spawn,
};
use gzdev_lib::error::GzdevError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), GzdevError> {
    color_eyre::install()?;

    let args = parse_args();
    let command = resolve_command(args.command)?;

    let run = async {
        match command {
            ResolvedCommand::Repository(params) => run_repository(params).await,
            ResolvedCommand::DockerEnv(params) => run_ign_docker_env(params).await,
            ResolvedCommand::Spawn(params) => run_spawn(params).await,
        }
    };

    tokio::select! {
        result = run => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("gzdev was stopped with a Keyboard Interrupt.");
        }
    }

    Ok(())
}
