//! Incoming and outgoing documents

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::filter::{DepartmentRef, DepartmentScoped, Searchable};
use crate::status::{classify, Classified, OutgoingDocumentStatuses, SimpleStatus};

/// Document kind, sent as `documentType` when marking a document read
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Incoming,
    Outgoing,
}

/// Văn bản đến
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingDocument {
    pub id: i64,
    #[serde(default)]
    pub document_number: Option<String>,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    /// Cơ quan ban hành
    #[serde(default)]
    pub issuing_authority: Option<String>,
    #[serde(default)]
    pub received_date: Option<NaiveDate>,
    /// Processing department
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(rename = "department", default)]
    pub department_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}

/// Văn bản đi
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingDocument {
    pub id: i64,
    #[serde(default)]
    pub document_number: Option<String>,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub signer_name: Option<String>,
    #[serde(default)]
    pub issued_date: Option<NaiveDate>,
    /// Drafting department
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(rename = "department", default)]
    pub department_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}

/// Body of `POST /documents/{id}/mark-read`
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub document_type: DocumentType,
}

/// Read-state tabs shown above document lists
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DocumentTab {
    #[default]
    All,
    Unread,
    Read,
}

impl DocumentTab {
    pub fn matches(self, is_read: bool) -> bool {
        match self {
            DocumentTab::All => true,
            DocumentTab::Unread => !is_read,
            DocumentTab::Read => is_read,
        }
    }
}

impl DepartmentScoped for IncomingDocument {
    fn department_ref(&self) -> DepartmentRef<'_> {
        DepartmentRef::new(self.department_id, self.department_name.as_deref())
    }
}

impl Searchable for IncomingDocument {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.document_number.as_deref());
        fields.extend(self.summary.as_deref());
        fields.extend(self.issuing_authority.as_deref());
        fields
    }
}

impl DepartmentScoped for OutgoingDocument {
    fn department_ref(&self) -> DepartmentRef<'_> {
        DepartmentRef::new(self.department_id, self.department_name.as_deref())
    }
}

impl Searchable for OutgoingDocument {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.document_number.as_deref());
        fields.extend(self.summary.as_deref());
        fields.extend(self.signer_name.as_deref());
        fields
    }
}

impl Classified for OutgoingDocument {
    fn simple_status(&self) -> SimpleStatus {
        let status = self.status.as_deref().unwrap_or_default();
        classify::<OutgoingDocumentStatuses>(status, std::iter::empty::<f64>())
    }
}
