mod cleanup;
mod fetch;
mod key;
mod layout;
mod source;
mod tools;

pub use cleanup::{remove_all, remove_installed_artifacts};
pub use fetch::{HttpKeyFetcher, KeyFetcher};
pub use key::KeyInstaller;
pub use layout::{InstallLayout, KEY_EXTENSION, SOURCE_EXTENSION};
pub use source::{
    InstallOutcome, InstalledSource, SourceEntry, SourceInstaller, list_installed_sources,
};
pub use tools::{HostTools, SystemTools, run_command};
