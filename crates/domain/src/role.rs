//! Role types and inheritance flattening.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use locus_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Opaque identifier of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a validated user identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("user id must not be empty".to_owned()));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for UserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Identifier of a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(String);

impl RoleId {
    /// Creates a role identifier, rejecting blank values.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation("role id must not be empty".to_owned()));
        }

        Ok(Self(value))
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A resolved role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: String,
    display: Option<String>,
}

impl Role {
    /// Creates a role.
    #[must_use]
    pub fn new(id: RoleId, name: impl Into<String>, display: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            display,
        }
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> &RoleId {
        &self.id
    }

    /// Returns the internal name used for policy matching.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the display label, if the server sent one.
    #[must_use]
    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }
}

/// Role assignment exactly as delivered by the user endpoint.
///
/// Every field is optional because assignments are not validated upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleNode {
    /// Role identifier, if present.
    pub uuid: Option<String>,
    /// Internal role name.
    pub name: Option<String>,
    /// Display label.
    pub display: Option<String>,
    /// Roles this role inherits from.
    pub inherited_roles: Vec<RoleNode>,
}

impl RoleNode {
    fn role_id(&self) -> Option<RoleId> {
        self.uuid
            .as_deref()
            .and_then(|value| RoleId::new(value).ok())
    }

    fn to_role(&self, id: RoleId) -> Role {
        Role::new(
            id,
            self.name.clone().unwrap_or_default(),
            self.display.clone(),
        )
    }
}

/// Flattens role assignments and their inheritance graph.
///
/// Depth-first, first-discovery order. A role id is emitted at most once and
/// never expanded twice, so cyclic inheritance terminates. Nodes without a
/// usable id are skipped together with their subtree.
#[must_use]
pub fn flatten_inherited_roles(assignments: &[RoleNode]) -> Vec<Role> {
    let mut roles = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![assignments.iter()];

    while let Some(siblings) = stack.last_mut() {
        let Some(node) = siblings.next() else {
            stack.pop();
            continue;
        };

        let Some(id) = node.role_id() else {
            continue;
        };

        if !visited.insert(id.clone()) {
            continue;
        }

        roles.push(node.to_role(id));

        if !node.inherited_roles.is_empty() {
            stack.push(node.inherited_roles.iter());
        }
    }

    roles
}
