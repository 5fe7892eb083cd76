use crate::config::RepositoryDef;
use crate::error::GzdevError;

/// Read-only lookups over the `repositories` section.
///
/// Names may repeat (one entry per linux distro family); the first entry that
/// matches a lookup is authoritative.
#[derive(Clone, Copy, Debug)]
pub struct RepositoryCatalog<'a> {
    repositories: &'a [RepositoryDef],
}

impl<'a> RepositoryCatalog<'a> {
    pub fn new(repositories: &'a [RepositoryDef]) -> Self {
        Self { repositories }
    }

    fn first_named(&self, repo_name: &str) -> Result<&'a RepositoryDef, GzdevError> {
        self.repositories
            .iter()
            .find(|repository| repository.name == repo_name)
            .ok_or_else(|| GzdevError::RepositoryNotFound {
                repository: repo_name.to_string(),
            })
    }

    pub fn key_of(&self, repo_name: &str) -> Result<&'a str, GzdevError> {
        self.first_named(repo_name).map(|r| r.key.as_str())
    }

    pub fn key_url_of(&self, repo_name: &str) -> Result<&'a str, GzdevError> {
        self.first_named(repo_name).map(|r| r.key_url.as_str())
    }

    pub fn url_of(
        &self,
        repo_name: &str,
        repo_type: &str,
        distro_family: &str,
    ) -> Result<&'a str, GzdevError> {
        self.repositories
            .iter()
            .filter(|r| r.name == repo_name && r.linux_distro.eq_ignore_ascii_case(distro_family))
            .find_map(|r| {
                r.types
                    .iter()
                    .find(|t| t.name == repo_type)
                    .map(|t| t.url.as_str())
            })
            .ok_or_else(|| GzdevError::RepositoryTypeNotFound {
                repository: repo_name.to_string(),
                repo_type: repo_type.to_string(),
                distro_family: distro_family.to_string(),
            })
    }
}
