use crate::config::{Config, RepoRef};
use crate::error::GzdevError;
use crate::install::{
    InstallOutcome, InstalledSource, KeyFetcher, SourceInstaller, SystemTools,
    list_installed_sources, remove_installed_artifacts,
};
use crate::platform::TargetPlatform;
use crate::repository::{ProjectResolver, RepositoryCatalog, ResolvedInstallSet};
use std::cell::RefCell;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnableTarget {
    /// Resolve the repositories through the `projects` rules
    Project(String),
    /// Install exactly this repository, bypassing resolution
    Repository(RepoRef),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RepositoryAction {
    /// Only enabling depends on the target distribution.
    Enable {
        target: EnableTarget,
        platform: TargetPlatform,
    },
    Disable(RepoRef),
    List,
}

#[derive(Clone, Debug)]
pub struct RepositoryRequest {
    pub action: RepositoryAction,
    pub gpg_check: bool,
    pub pre_cleanup: bool,
}

/// Progress of the most recent `enable`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OrchestratorState {
    #[default]
    Idle,
    Resolved(ResolvedInstallSet),
    Installed(Vec<InstallOutcome>),
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionReport {
    Enabled(Vec<InstallOutcome>),
    /// Removal is not implemented; the action is accepted and does nothing.
    DisableSkipped(RepoRef),
    Listed(Vec<InstalledSource>),
}

pub struct Orchestrator<'a, F, T> {
    config: &'a Config,
    fetcher: &'a F,
    tools: &'a T,
    state: RefCell<OrchestratorState>,
}

impl<'a, F: KeyFetcher, T: SystemTools> Orchestrator<'a, F, T> {
    pub fn new(config: &'a Config, fetcher: &'a F, tools: &'a T) -> Self {
        Self {
            config,
            fetcher,
            tools,
            state: RefCell::new(OrchestratorState::Idle),
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state.borrow().clone()
    }

    pub async fn execute(&self, request: &RepositoryRequest) -> Result<ActionReport, GzdevError> {
        if request.pre_cleanup {
            remove_installed_artifacts(&self.config.install_layout)?;
        }

        match &request.action {
            RepositoryAction::Enable { target, platform } => {
                self.transition(OrchestratorState::Idle);
                let result = self.enable(target, platform, request.gpg_check).await;
                if let Err(err) = &result {
                    tracing::debug!("enable failed: {}", err);
                    self.transition(OrchestratorState::Failed);
                }
                result.map(ActionReport::Enabled)
            }
            RepositoryAction::Disable(repo) => {
                tracing::warn!("disable feature not implemented yet; {} left untouched", repo);
                Ok(ActionReport::DisableSkipped(repo.clone()))
            }
            RepositoryAction::List => {
                list_installed_sources(&self.config.install_layout).map(ActionReport::Listed)
            }
        }
    }

    async fn enable(
        &self,
        target: &EnableTarget,
        platform: &TargetPlatform,
        gpg_check: bool,
    ) -> Result<Vec<InstallOutcome>, GzdevError> {
        let install_set = match target {
            EnableTarget::Project(project) => ProjectResolver::new(&self.config.projects)
                .resolve_install_set(project, platform)
                .ok_or_else(|| GzdevError::UnknownProject {
                    project: project.clone(),
                })?,
            EnableTarget::Repository(repo) => vec![repo.clone()],
        };
        self.transition(OrchestratorState::Resolved(install_set.clone()));

        let installer = SourceInstaller::new(
            RepositoryCatalog::new(&self.config.repositories),
            &self.config.install_layout,
            self.fetcher,
            self.tools,
            gpg_check,
        );

        // No rollback: repositories installed before a failure stay in place.
        let mut outcomes = Vec::with_capacity(install_set.len());
        for repo in &install_set {
            outcomes.push(installer.install(repo, platform).await?);
        }

        self.transition(OrchestratorState::Installed(outcomes.clone()));
        Ok(outcomes)
    }

    fn transition(&self, next: OrchestratorState) {
        let mut state = self.state.borrow_mut();
        tracing::trace!(from = ?*state, to = ?next, "Orchestrator state change");
        *state = next;
    }
}
