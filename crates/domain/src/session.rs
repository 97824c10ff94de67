use crate::{Role, UserId};

/// Session context handed over by the authentication layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUser {
    user_id: Option<UserId>,
    roles: Vec<Role>,
}

impl SessionUser {
    /// Creates the session context.
    #[must_use]
    pub fn new(user_id: Option<UserId>, roles: Vec<Role>) -> Self {
        Self { user_id, roles }
    }

    /// Returns the authenticated user id, if the session has one.
    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Returns the minimal role list known to the session.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}
