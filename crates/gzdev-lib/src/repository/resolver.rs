use crate::config::{ProjectRule, RepoRef};
use crate::platform::TargetPlatform;

/// Repositories to install for one project query, in rule order.
pub type ResolvedInstallSet = Vec<RepoRef>;

/// Outcome of testing a single project rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleEvaluation {
    Accepted,
    RejectedByRequirement {
        family: String,
        codename: String,
        allowed: Vec<String>,
    },
    NoPatternMatch,
}

pub fn evaluate_rule(rule: &ProjectRule, project: &str, platform: &TargetPlatform) -> RuleEvaluation {
    if !rule.name.is_match(project) {
        return RuleEvaluation::NoPatternMatch;
    }

    // Missing requirement data never excludes a rule.
    let Some(distributions) = rule
        .requirements
        .as_ref()
        .and_then(|requirements| requirements.distributions.as_ref())
    else {
        return RuleEvaluation::Accepted;
    };
    let Some(allowed) = distributions
        .iter()
        .find(|(family, _)| family.eq_ignore_ascii_case(&platform.family))
        .map(|(_, codenames)| codenames)
    else {
        return RuleEvaluation::Accepted;
    };

    if allowed.iter().any(|codename| *codename == platform.codename) {
        RuleEvaluation::Accepted
    } else {
        RuleEvaluation::RejectedByRequirement {
            family: platform.family.clone(),
            codename: platform.codename.clone(),
            allowed: allowed.clone(),
        }
    }
}

/// First-accepted-wins lookup over the ordered `projects` section.
#[derive(Clone, Copy, Debug)]
pub struct ProjectResolver<'a> {
    projects: &'a [ProjectRule],
}

impl<'a> ProjectResolver<'a> {
    pub fn new(projects: &'a [ProjectRule]) -> Self {
        Self { projects }
    }

    pub fn resolve(&self, project: &str, platform: &TargetPlatform) -> Option<&'a ProjectRule> {
        for rule in self.projects {
            match evaluate_rule(rule, project, platform) {
                RuleEvaluation::Accepted => {
                    tracing::debug!(
                        project,
                        rule = rule.name.as_str(),
                        "Project matched configuration rule"
                    );
                    return Some(rule);
                }
                RuleEvaluation::RejectedByRequirement {
                    family,
                    codename,
                    allowed,
                } => {
                    tracing::debug!(
                        project,
                        rule = rule.name.as_str(),
                        "Rule skipped: {}/{} is not one of {:?}",
                        family,
                        codename,
                        allowed
                    );
                }
                RuleEvaluation::NoPatternMatch => {}
            }
        }
        None
    }

    pub fn resolve_install_set(
        &self,
        project: &str,
        platform: &TargetPlatform,
    ) -> Option<ResolvedInstallSet> {
        self.resolve(project, platform)
            .map(|rule| rule.repositories.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProjectPattern, Requirements};
    use std::collections::BTreeMap;

    fn rule(pattern: &str, repo_type: &str, distributions: Option<&[(&str, &[&str])]>) -> ProjectRule {
        ProjectRule {
            name: ProjectPattern::new(pattern).unwrap(),
            repositories: vec![RepoRef::new("osrf", repo_type)],
            requirements: distributions.map(|entries| Requirements {
                distributions: Some(
                    entries
                        .iter()
                        .map(|(family, codenames)| {
                            (
                                family.to_string(),
                                codenames.iter().map(|c| c.to_string()).collect(),
                            )
                        })
                        .collect::<BTreeMap<_, _>>(),
                ),
            }),
        }
    }

    fn jammy() -> TargetPlatform {
        TargetPlatform::new("ubuntu", "jammy")
    }

    fn test_rules() -> Vec<ProjectRule> {
        vec![
            rule("ignition-math6", "stable", None),
            rule("ignition-transport7", "stable", Some(&[("ubuntu", &["jammy"])])),
            rule("ignition-transport7", "prerelease", None),
            rule("ignition-.*", "regexp", None),
        ]
    }

    fn resolved_type(rules: &[ProjectRule], project: &str, platform: &TargetPlatform) -> Option<String> {
        ProjectResolver::new(rules)
            .resolve_install_set(project, platform)
            .map(|set| set[0].repo_type.clone())
    }

    #[test]
    fn test_direct_match() {
        let rules = test_rules();
        assert_eq!(resolved_type(&rules, "ignition-math6", &jammy()).as_deref(), Some("stable"));
    }

    #[test]
    fn test_non_existent_project() {
        let rules = test_rules();
        assert!(ProjectResolver::new(&rules).resolve("fooooo", &jammy()).is_none());
    }

    #[test]
    fn test_regexp_fallback() {
        let rules = test_rules();
        assert_eq!(resolved_type(&rules, "ignition-plugin", &jammy()).as_deref(), Some("regexp"));
    }

    #[test]
    fn test_pattern_is_searched_not_anchored() {
        let rules = vec![rule("math", "stable", None)];
        assert_eq!(resolved_type(&rules, "ignition-math6", &jammy()).as_deref(), Some("stable"));
    }

    #[test]
    fn test_earlier_rule_takes_precedence() {
        let rules = test_rules();
        assert_eq!(
            resolved_type(&rules, "ignition-transport7", &jammy()).as_deref(),
            Some("stable")
        );
    }

    #[test]
    fn test_requirement_rejection_falls_through_in_order() {
        let rules = test_rules();
        let focal = TargetPlatform::new("ubuntu", "focal");
        assert_eq!(
            resolved_type(&rules, "ignition-transport7", &focal).as_deref(),
            Some("prerelease")
        );
    }

    #[test]
    fn test_no_requirements_accepts_any_distro() {
        let rules = vec![rule("^foo", "stable", None)];
        for codename in ["bionic", "focal", "jammy", "bookworm"] {
            let platform = TargetPlatform::new("ubuntu", codename);
            assert_eq!(resolved_type(&rules, "foo-bar", &platform).as_deref(), Some("stable"));
        }
    }

    #[test]
    fn test_requirement_for_other_family_is_satisfied() {
        let rules = vec![rule("^foo", "stable", Some(&[("debian", &["bookworm"])]))];
        assert_eq!(resolved_type(&rules, "foo-bar", &jammy()).as_deref(), Some("stable"));
    }

    #[test]
    fn test_empty_distributions_map_is_satisfied() {
        let mut rules = vec![rule("^foo", "stable", None)];
        rules[0].requirements = Some(Requirements { distributions: None });
        assert_eq!(resolved_type(&rules, "foo-bar", &jammy()).as_deref(), Some("stable"));
    }

    #[test]
    fn test_requirement_rejects_without_fallback() {
        let rules = vec![rule("^foo", "stable", Some(&[("ubuntu", &["focal"])]))];
        let bionic = TargetPlatform::new("ubuntu", "bionic");
        assert!(ProjectResolver::new(&rules).resolve("foo-bar", &bionic).is_none());
    }

    #[test]
    fn test_evaluation_distinguishes_rejection_from_no_match() {
        let rules = vec![rule("^foo", "stable", Some(&[("ubuntu", &["focal"])]))];
        let bionic = TargetPlatform::new("ubuntu", "bionic");
        assert_eq!(
            evaluate_rule(&rules[0], "foo-bar", &bionic),
            RuleEvaluation::RejectedByRequirement {
                family: "ubuntu".to_string(),
                codename: "bionic".to_string(),
                allowed: vec!["focal".to_string()],
            }
        );
        assert_eq!(evaluate_rule(&rules[0], "bar", &bionic), RuleEvaluation::NoPatternMatch);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let rules = test_rules();
        let resolver = ProjectResolver::new(&rules);
        let first = resolver.resolve("ignition-transport7", &jammy()).map(|r| r as *const _);
        for _ in 0..10 {
            let again = resolver.resolve("ignition-transport7", &jammy()).map(|r| r as *const _);
            assert_eq!(first, again);
        }
    }
}
