use async_trait::async_trait;
use locus_core::AppResult;
use locus_domain::{RoleNode, UserId};

/// Port for the user role assignments endpoint.
#[async_trait]
pub trait UserRoleDirectory: Send + Sync {
    /// Lists the roles directly assigned to a user, with nested inherited roles.
    async fn list_role_assignments(&self, user_id: &UserId) -> AppResult<Vec<RoleNode>>;
}
