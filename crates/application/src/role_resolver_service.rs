use std::collections::HashMap;
use std::sync::Arc;

use locus_core::AppResult;
use locus_domain::{Role, SessionUser, UserId, flatten_inherited_roles};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::UserRoleDirectory;

/// Resolves the flattened, inherited role set of a user.
///
/// Resolved roles are cached per user for the lifetime of the service.
#[derive(Clone)]
pub struct RoleResolverService {
    directory: Arc<dyn UserRoleDirectory>,
    cache: Arc<RwLock<HashMap<UserId, Arc<[Role]>>>>,
}

impl RoleResolverService {
    /// Creates a resolver backed by the user role directory.
    #[must_use]
    pub fn new(directory: Arc<dyn UserRoleDirectory>) -> Self {
        Self {
            directory,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the user's roles including every inherited role.
    ///
    /// An absent user id resolves to no roles without calling the directory.
    pub async fn resolve_inherited_roles(&self, user_id: Option<&UserId>) -> AppResult<Vec<Role>> {
        let Some(user_id) = user_id else {
            return Ok(Vec::new());
        };

        if let Some(cached) = self.cache.read().await.get(user_id) {
            return Ok(cached.to_vec());
        }

        let assignments = self.directory.list_role_assignments(user_id).await?;
        let roles: Arc<[Role]> = flatten_inherited_roles(&assignments).into();

        debug!(
            user_id = %user_id,
            direct_roles = assignments.len(),
            resolved_roles = roles.len(),
            "resolved inherited roles"
        );

        self.cache
            .write()
            .await
            .entry(user_id.clone())
            .or_insert_with(|| Arc::clone(&roles));

        Ok(roles.to_vec())
    }

    /// Returns the roles used for access decisions.
    ///
    /// Falls back to the session's own role list when resolution yields no
    /// roles or fails.
    pub async fn effective_roles(&self, session: &SessionUser) -> Vec<Role> {
        match self.resolve_inherited_roles(session.user_id()).await {
            Ok(roles) if !roles.is_empty() => roles,
            Ok(_) => session.roles().to_vec(),
            Err(error) => {
                warn!(
                    user_id = ?session.user_id().map(UserId::as_str),
                    error = %error,
                    "failed to resolve inherited roles, using session roles"
                );
                session.roles().to_vec()
            }
        }
    }
}
