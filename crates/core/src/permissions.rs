//! Staff permission toggle resolution.
//!
//! A toggle overrides a permission for either a whole role or a single
//! user. A user-level toggle beats a role-level one; with neither set,
//! the caller's default applies.

use crate::types::DbId;

/// Well-known staff role names (seed values in the `staff_users` table).
pub mod roles {
    pub const OWNER_ADMIN: &str = "owner_admin";
    pub const RECEPTIONIST: &str = "receptionist";
    pub const BARBER: &str = "barber";
}

/// Well-known permission keys.
pub mod keys {
    pub const EDIT_CLIENT_IDENTITY: &str = "edit_client_identity";
    pub const EXPORT_CAMPAIGNS: &str = "export_campaigns";
}

/// The target of a permission toggle: exactly one of a role or a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleTarget {
    Role(String),
    User(DbId),
}

impl ToggleTarget {
    pub fn role(&self) -> Option<&str> {
        match self {
            ToggleTarget::Role(role) => Some(role),
            ToggleTarget::User(_) => None,
        }
    }

    pub fn user_id(&self) -> Option<DbId> {
        match self {
            ToggleTarget::Role(_) => None,
            ToggleTarget::User(id) => Some(*id),
        }
    }
}

/// Resolve a permission from the toggles that apply to a user.
pub fn resolve_toggle(
    user_toggle: Option<bool>,
    role_toggle: Option<bool>,
    default: bool,
) -> bool {
    user_toggle.or(role_toggle).unwrap_or(default)
}
