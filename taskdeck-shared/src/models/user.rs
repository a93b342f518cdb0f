/// User and organization models
///
/// A user belongs to exactly one organization. The organization is the tenant
/// that scopes every project and task operation, addressed by its slug.
///
/// # Wire shape
///
/// ```json
/// {
///   "id": "3",
///   "username": "kp121",
///   "email": "kp@example.com",
///   "organization": { "slug": "acme", "name": "Acme" }
/// }
/// ```

use serde::{Deserialize, Serialize};

use super::id::EntityId;
use super::scope::OrgScope;

/// Organization (tenant) a user belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Identifier, not always selected by queries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,

    /// URL-safe key used to scope requests
    pub slug: String,

    /// Display name
    pub name: String,
}

/// Authenticated user as returned by `me` and `login`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID
    pub id: EntityId,

    /// Login name
    pub username: String,

    /// Email address, used as comment author and default assignee
    #[serde(default)]
    pub email: String,

    /// Owning organization
    ///
    /// Accounts created outside signup may have none; such sessions cannot
    /// issue scoped operations.
    #[serde(default)]
    pub organization: Option<Organization>,
}

impl User {
    /// Organization scope for project operations, if the user has one
    pub fn org_scope(&self) -> Option<OrgScope> {
        self.organization
            .as_ref()
            .map(|org| OrgScope::new(org.slug.clone()))
    }
}
