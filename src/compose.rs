//! Internal outgoing document composition

use serde::Serialize;

use crate::assignment::{AssignmentSelection, Recipient};
use crate::error::{AppError, AppResult, FieldError};

const MAX_TITLE_CHARS: usize = 500;

/// Draft being composed. Dropped (with its selection) on submit or when the
/// composer navigates away.
#[derive(Clone, Debug, Default)]
pub struct InternalDocumentDraft {
    /// Trích yếu
    pub title: String,
    pub summary: String,
    pub document_number: Option<String>,
    pub urgent: bool,
    pub selection: AssignmentSelection,
}

/// Body of `POST /documents/outgoing` for internal distribution
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalDocumentRequest {
    pub title: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
    pub urgent: bool,
    pub internal: bool,
    pub primary: Recipient,
    pub secondary: Vec<Recipient>,
}

impl InternalDocumentDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field-level validation. All failures are reported together.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push(FieldError::new("title", "Trích yếu không được để trống"));
        } else if title.chars().count() > MAX_TITLE_CHARS {
            errors.push(FieldError::new(
                "title",
                format!("Trích yếu không được vượt quá {} ký tự", MAX_TITLE_CHARS),
            ));
        }

        if self.summary.trim().is_empty() {
            errors.push(FieldError::new("summary", "Nội dung không được để trống"));
        }

        if self.selection.primary().is_none() {
            errors.push(FieldError::new("primary", "Chưa chọn đơn vị/cá nhân chủ trì"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and turn the draft into a request, consuming it
    pub fn submit(self) -> AppResult<InternalDocumentRequest> {
        self.validate().map_err(AppError::Validation)?;
        let primary = self
            .selection
            .primary()
            .ok_or_else(|| AppError::Internal("primary recipient missing after validation".into()))?;
        Ok(InternalDocumentRequest {
            title: self.title.trim().to_string(),
            summary: self.summary.trim().to_string(),
            document_number: self
                .document_number
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            urgent: self.urgent,
            internal: true,
            primary,
            secondary: self.selection.secondary().collect(),
        })
    }
}
