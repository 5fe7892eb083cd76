mod loader;
mod model;

pub use loader::{
    ENVIRONMENTS_CONFIG, REPOSITORY_CONFIG, default_config_path, load_config, load_environments,
};
pub use model::{
    Config, EnvironmentsConfig, GazeboCompatibility, GazeboRelease, ProjectPattern, ProjectRule,
    RepoRef, RepositoryDef, RepositoryType, Requirements,
};
