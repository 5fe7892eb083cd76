use crate::cli::RepositoryParams;
use crate::error::GzdevError;
use crate::install::{HostTools, HttpKeyFetcher, InstallOutcome};
use crate::orchestrator::{ActionReport, Orchestrator};

pub async fn run_repository(params: RepositoryParams) -> Result<(), GzdevError> {
    let RepositoryParams {
        app_config,
        request,
    } = params;

    let fetcher = HttpKeyFetcher::new()?;
    let tools = HostTools;
    let report = Orchestrator::new(&app_config, &fetcher, &tools)
        .execute(&request)
        .await?;

    match report {
        ActionReport::Enabled(outcomes) => {
            for outcome in outcomes {
                match outcome {
                    InstallOutcome::Installed { source_path, .. } => {
                        tracing::info!("Enabled repository in {}", source_path.display());
                    }
                    InstallOutcome::PermissionDenied { path } => {
                        tracing::info!("Skipped {}, nothing was changed", path.display());
                    }
                }
            }
        }
        ActionReport::DisableSkipped(_) => {}
        ActionReport::Listed(installed) => {
            if installed.is_empty() {
                tracing::info!("No gzdev repositories are enabled");
            }
            for source in installed {
                match source.entry {
                    Some(entry) => println!(
                        "{} {} {} (key {})",
                        source.repo,
                        entry.url,
                        entry.distro,
                        entry.key_path.display()
                    ),
                    None => println!("{} <unrecognised entry in {}>", source.repo, source.path.display()),
                }
            }
        }
    }

    Ok(())
}
