//! Role-based access policy.
//!
//! Roles form a closed set and the role/operation mapping is a single pure
//! lookup, so a policy change is a one-place edit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    User,
    Viewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreatePatient,
    ViewPatients,
    ManageUsers,
}

impl Role {
    pub fn allows(self, action: Action) -> bool {
        match action {
            Action::CreatePatient => matches!(self, Role::Admin | Role::User),
            Action::ViewPatients => matches!(self, Role::Admin | Role::User | Role::Viewer),
            Action::ManageUsers => matches!(self, Role::Admin),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "User",
            Role::Viewer => "Viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "User" => Ok(Role::User),
            "Viewer" => Ok(Role::Viewer),
            other => Err(ApiError::bad_request(format!(
                "Invalid role '{other}'. Must be one of: Admin, User, Viewer"
            ))),
        }
    }
}

/// Evaluate the policy for one operation, failing with 403 on deny.
pub fn authorize(role: Role, action: Action) -> Result<(), ApiError> {
    if role.allows(action) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "Role {role} is not permitted to perform this operation"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_is_allowed_everything() {
        for action in [Action::CreatePatient, Action::ViewPatients, Action::ManageUsers] {
            assert!(Role::Admin.allows(action));
        }
    }

    #[test]
    fn user_can_create_and_view_but_not_manage() {
        assert!(Role::User.allows(Action::CreatePatient));
        assert!(Role::User.allows(Action::ViewPatients));
        assert!(!Role::User.allows(Action::ManageUsers));
    }

    #[test]
    fn viewer_can_only_view() {
        assert!(!Role::Viewer.allows(Action::CreatePatient));
        assert!(Role::Viewer.allows(Action::ViewPatients));
        assert!(!Role::Viewer.allows(Action::ManageUsers));
    }

    #[test]
    fn authorize_denies_with_forbidden() {
        let err = authorize(Role::Viewer, Action::CreatePatient).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn role_round_trips_through_strings() {
        for role in [Role::Admin, Role::User, Role::Viewer] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("Root".parse::<Role>().is_err());
        assert!("admin".parse::<Role>().is_err()); // case-sensitive
    }
}
