use async_trait::async_trait;
use locus_application::UserRoleDirectory;
use locus_core::{AppError, AppResult};
use locus_domain::{RoleNode, UserId};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::HttpApiClient;

/// Representation requesting roles with one level of inherited roles each.
const USER_ROLES_REPRESENTATION: &str =
    "custom:(uuid,display,username,roles:(uuid,name,display,inheritedRoles:(uuid,name,display)))";

/// REST `user` resource adapter for role assignments.
#[derive(Clone)]
pub struct RestUserRoleDirectory {
    client: HttpApiClient,
    user_endpoint: Url,
}

impl RestUserRoleDirectory {
    /// Creates an adapter for the REST base found at `rest_path` below the API base.
    pub fn new(client: HttpApiClient, rest_path: &str) -> AppResult<Self> {
        let user_endpoint = client.endpoint(rest_path)?.join("user/").map_err(|error| {
            AppError::Validation(format!("invalid REST path '{rest_path}': {error}"))
        })?;

        Ok(Self {
            client,
            user_endpoint,
        })
    }

    fn user_url(&self, user_id: &UserId) -> AppResult<Url> {
        let mut url = self.user_endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::Internal("user endpoint cannot be a base URL".to_owned()))?
            .pop_if_empty()
            .push(user_id.as_str());
        url.query_pairs_mut()
            .append_pair("v", USER_ROLES_REPRESENTATION);

        Ok(url)
    }
}

#[async_trait]
impl UserRoleDirectory for RestUserRoleDirectory {
    async fn list_role_assignments(&self, user_id: &UserId) -> AppResult<Vec<RoleNode>> {
        let user = self.client.get_json::<Value>(self.user_url(user_id)?).await?;
        let roles = user.get("roles").map(role_nodes).unwrap_or_default();

        debug!(user_id = %user_id, direct_roles = roles.len(), "fetched user roles");
        Ok(roles)
    }
}

/// Reads role nodes leniently: anything other than a list yields no roles.
fn role_nodes(value: &Value) -> Vec<RoleNode> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter(|entry| entry.is_object())
        .map(|entry| RoleNode {
            uuid: string_field(entry, "uuid"),
            name: string_field(entry, "name"),
            display: string_field(entry, "display"),
            inherited_roles: entry
                .get("inheritedRoles")
                .map(role_nodes)
                .unwrap_or_default(),
        })
        .collect()
}

fn string_field(entry: &Value, field: &str) -> Option<String> {
    entry.get(field).and_then(Value::as_str).map(str::to_owned)
}
