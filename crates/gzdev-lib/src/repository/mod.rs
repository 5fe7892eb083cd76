mod catalog;
mod resolver;

pub use catalog::RepositoryCatalog;
pub use resolver::{ProjectResolver, ResolvedInstallSet, RuleEvaluation, evaluate_rule};
