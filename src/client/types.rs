//! Response envelopes and query parameters

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Paged list, `{content, totalPages, totalElements}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
}

impl<T> Page<T> {
    /// Single page holding every item
    pub fn single(content: Vec<T>) -> Self {
        let total_elements = content.len() as u64;
        Self {
            content,
            total_pages: 1,
            total_elements,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            total_pages: 0,
            total_elements: 0,
        }
    }
}

/// Strip a `{data: ...}` wrapper if present
pub fn unwrap_envelope(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(serde_json::Value::Null)
        }
        other => other,
    }
}

/// Decode a wrapped or bare object
pub fn decode<T: DeserializeOwned>(value: serde_json::Value) -> AppResult<T> {
    serde_json::from_value(unwrap_envelope(value))
        .map_err(|e| AppError::InvalidResponse(e.to_string()))
}

/// Decode a paged list. A bare array is taken as a single page.
pub fn decode_page<T: DeserializeOwned>(value: serde_json::Value) -> AppResult<Page<T>> {
    match unwrap_envelope(value) {
        serde_json::Value::Array(items) => {
            let content = items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<T>, _>>()
                .map_err(|e| AppError::InvalidResponse(e.to_string()))?;
            Ok(Page::single(content))
        }
        serde_json::Value::Null => Ok(Page::default()),
        other => serde_json::from_value(other).map_err(|e| AppError::InvalidResponse(e.to_string())),
    }
}

/// Paging and keyword parameters shared by list endpoints
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
    pub keyword: Option<String>,
}

impl PageQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            keyword: None,
        }
    }

    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ];
        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            pairs.push(("keyword".to_string(), keyword.trim().to_string()));
        }
        pairs
    }
}

/// Parameters of `GET /users`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub department_id: Option<i64>,
    pub role_id: Option<i64>,
    pub status: Option<String>,
    pub keyword: Option<String>,
    pub page: u32,
    pub size: u32,
}

impl UserQuery {
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.department_id {
            pairs.push(("departmentId".to_string(), id.to_string()));
        }
        if let Some(id) = self.role_id {
            pairs.push(("roleId".to_string(), id.to_string()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status".to_string(), status.clone()));
        }
        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            pairs.push(("keyword".to_string(), keyword.trim().to_string()));
        }
        pairs.push(("page".to_string(), self.page.to_string()));
        pairs.push(("size".to_string(), self.size.to_string()));
        pairs
    }
}
