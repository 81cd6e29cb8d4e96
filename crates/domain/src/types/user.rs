//! Signed-in user profile types
//!
//! The profile returned by `POST /auth/login` and `GET /auth/me`, persisted
//! locally while the session is alive.

use serde::{Deserialize, Serialize};

use crate::impl_wire_enum_conversions;

/// Staff role on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Staff,
    Admin,
}

impl_wire_enum_conversions!(Role {
    Staff => "staff",
    Admin => "admin",
});

/// Department a staff member belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub staff_count: Option<u32>,
}

/// Console user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub department: Option<Department>,
}

impl User {
    /// Human-readable name, falling back to the username
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(name), None) | (None, Some(name)) => Some(name.to_string()),
            (None, None) => self.username.clone(),
        }
    }

    /// Whether the profile carries the admin role
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sparse_profile() {
        let user: User = serde_json::from_str(
            r#"{ "id": 7, "username": "frontdesk", "role": "admin",
                 "department": { "id": 2, "name": "reception" } }"#,
        )
        .unwrap();

        assert_eq!(user.id, 7);
        assert!(user.is_admin());
        assert_eq!(user.department.as_ref().map(|d| d.id), Some(2));
        assert_eq!(user.display_name().as_deref(), Some("frontdesk"));
    }

    #[test]
    fn display_name_prefers_full_name() {
        let user: User = serde_json::from_str(
            r#"{ "id": 1, "username": "lan", "first_name": "Lan", "last_name": "Tran" }"#,
        )
        .unwrap();

        assert_eq!(user.display_name().as_deref(), Some("Lan Tran"));
        assert!(!user.is_admin());
    }
}
