//! Department record as returned by `GET /departments`

use serde::{Deserialize, Serialize};

/// Flat department row. `parent_id` is `None` for top-level departments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentRecord {
    pub id: i64,

    /// Display name
    pub name: String,

    /// Owning department
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<i64>,

    /// Short code, e.g. "P.TC" for Phòng Tài chính
    #[serde(default)]
    pub abbreviation: Option<String>,

    /// Backend department type (ban, phòng, trạm...)
    #[serde(rename = "type", default)]
    pub dept_type: Option<String>,
}

impl DepartmentRecord {
    pub fn new(id: i64, name: impl Into<String>, parent_id: Option<i64>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
            abbreviation: None,
            dept_type: None,
        }
    }
}

/// Department tree node (nested, for display and JSON output)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DepartmentTree {
    pub id: i64,
    pub name: String,
    pub level: usize,
    #[serde(rename = "parentId")]
    pub parent_id: Option<i64>,
    #[serde(rename = "fullPath")]
    pub full_path: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<DepartmentTree>,
}
