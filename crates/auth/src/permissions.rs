use serde::{Deserialize, Serialize};

use ceramerp_core::DomainError;

use crate::Role;

/// Business area of the application (one page route each).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    Dashboard,
    Customers,
    Suppliers,
    Items,
    Warehouses,
    Inventory,
    Purchasing,
    Sales,
    Accounting,
    Treasury,
    Taxes,
}

/// Level of access within an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    View,
    Manage,
}

/// A permission: access level on one area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub area: Area,
    pub access: Access,
}

impl Permission {
    pub const fn view(area: Area) -> Self {
        Self {
            area,
            access: Access::View,
        }
    }

    pub const fn manage(area: Area) -> Self {
        Self {
            area,
            access: Access::Manage,
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let access = match self.access {
            Access::View => "view",
            Access::Manage => "manage",
        };
        write!(f, "{:?}.{}", self.area, access)
    }
}

impl Role {
    /// Highest access this role has on `area`, if any.
    pub fn access(&self, area: Area) -> Option<Access> {
        use Area::*;
        match self {
            Role::Admin | Role::Manager => Some(Access::Manage),
            Role::Accountant => match area {
                Accounting | Treasury | Taxes => Some(Access::Manage),
                _ => Some(Access::View),
            },
            Role::Operator => match area {
                Inventory | Warehouses | Items | Purchasing | Sales => Some(Access::Manage),
                Accounting | Treasury | Taxes => None,
                _ => Some(Access::View),
            },
            Role::Viewer => Some(Access::View),
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        self.access(permission.area)
            .is_some_and(|granted| granted >= permission.access)
    }
}

/// Check a role against a required permission.
///
/// The backend's row-level security remains the authority; this check only
/// keeps the client from offering actions that would be rejected.
pub fn authorize(role: Role, required: Permission) -> Result<(), DomainError> {
    if role.allows(required) {
        Ok(())
    } else {
        Err(DomainError::forbidden(format!(
            "role '{role}' lacks permission '{required}'"
        )))
    }
}
