//! Users: the authenticated actor and user list rows

use serde::{Deserialize, Serialize};

use crate::filter::{DepartmentRef, DepartmentScoped, Searchable};

/// User status as reported by the backend
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Locked,
}

/// The authenticated user. Visibility is derived from `roles` and
/// `department_id`, never stored on the actor itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,

    /// Home department
    #[serde(rename = "departmentId")]
    pub department_id: i64,

    /// Role tags, e.g. `ROLE_TRUONG_PHONG`
    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(rename = "fullName", default)]
    pub full_name: String,
}

/// User row from `GET /users`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,

    #[serde(default)]
    pub username: String,

    #[serde(rename = "fullName", default)]
    pub full_name: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(rename = "departmentId", default)]
    pub department_id: Option<i64>,

    /// Department display name (older endpoints only send this)
    #[serde(rename = "departmentName", alias = "department", default)]
    pub department_name: Option<String>,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default)]
    pub status: UserStatus,
}

impl UserRecord {
    /// Label used in lists and recipient pickers
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

impl DepartmentScoped for UserRecord {
    fn department_ref(&self) -> DepartmentRef<'_> {
        DepartmentRef::new(self.department_id, self.department_name.as_deref())
    }
}

impl Searchable for UserRecord {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.username.as_str(), self.full_name.as_str()];
        fields.extend(self.email.as_deref());
        fields.extend(self.phone.as_deref());
        fields
    }
}
