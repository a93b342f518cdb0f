/// Request scopes
///
/// The backend has no global namespace: project operations are scoped by an
/// organization slug and task/comment operations additionally by a project slug.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scope for project operations
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgScope {
    pub organization_slug: String,
}

impl OrgScope {
    pub fn new(organization_slug: impl Into<String>) -> Self {
        Self {
            organization_slug: organization_slug.into(),
        }
    }

    /// Narrows this scope to a single project
    pub fn project(&self, project_slug: impl Into<String>) -> ProjectScope {
        ProjectScope {
            organization_slug: self.organization_slug.clone(),
            project_slug: project_slug.into(),
        }
    }
}

impl fmt::Display for OrgScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.organization_slug)
    }
}

/// Scope for task and comment operations
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectScope {
    pub organization_slug: String,
    pub project_slug: String,
}

impl ProjectScope {
    pub fn new(organization_slug: impl Into<String>, project_slug: impl Into<String>) -> Self {
        Self {
            organization_slug: organization_slug.into(),
            project_slug: project_slug.into(),
        }
    }

    pub fn org(&self) -> OrgScope {
        OrgScope::new(self.organization_slug.clone())
    }
}

impl fmt::Display for ProjectScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.organization_slug, self.project_slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_scope_keeps_org() {
        let scope = OrgScope::new("acme").project("website");
        assert_eq!(scope.org(), OrgScope::new("acme"));
        assert_eq!(scope.to_string(), "acme/website");
    }

    #[test]
    fn test_scope_serializes_as_graphql_variables() {
        let value = serde_json::to_value(ProjectScope::new("acme", "website")).unwrap();
        assert_eq!(value["organizationSlug"], "acme");
        assert_eq!(value["projectSlug"], "website");
    }
}
