pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod install;
pub mod orchestrator;
pub mod platform;
pub mod repository;

pub use config::Config;
pub use error::GzdevError;
