use serde::Serialize;
use thiserror::Error;

/// Inline validation failure for one form field
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Access forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Department reference cannot be resolved: {0}")]
    UnresolvedDepartment(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error classes, decided by how the UI reacts to them
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Toast, fall back to an empty list
    Transport,
    /// Hide the affordance
    Authorization,
    /// Hide the record
    DataShape,
    /// Show next to the field, block submission
    Validation,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Network(_) | AppError::Server { .. } | AppError::Cancelled => {
                ErrorKind::Transport
            }
            AppError::Unauthorized | AppError::Forbidden(_) => ErrorKind::Authorization,
            AppError::UnresolvedDepartment(_) | AppError::InvalidResponse(_) | AppError::Json(_) => {
                ErrorKind::DataShape
            }
            AppError::Validation(_) | AppError::BadRequest(_) => ErrorKind::Validation,
            AppError::NotFound(_) | AppError::Io(_) | AppError::Config(_) | AppError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Short text for a transient notification
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(_) => "Không thể kết nối tới máy chủ".to_string(),
            AppError::Unauthorized => "Phiên đăng nhập đã hết hạn".to_string(),
            AppError::Forbidden(_) => "Bạn không có quyền thực hiện thao tác này".to_string(),
            AppError::NotFound(_) => "Không tìm thấy dữ liệu".to_string(),
            AppError::Validation(errors) => errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "Dữ liệu không hợp lệ".to_string()),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Server { .. } => "Máy chủ gặp sự cố, vui lòng thử lại".to_string(),
            _ => "Đã xảy ra lỗi, vui lòng thử lại".to_string(),
        }
    }

    /// Field errors of a validation failure, empty otherwise
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AppError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

/// Result type alias for application
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(AppError::Unauthorized.kind(), ErrorKind::Authorization);
        assert_eq!(AppError::Forbidden("x".into()).kind(), ErrorKind::Authorization);
        assert_eq!(
            AppError::UnresolvedDepartment("Phòng X".into()).kind(),
            ErrorKind::DataShape
        );
        assert_eq!(AppError::Validation(vec![]).kind(), ErrorKind::Validation);
        assert_eq!(
            AppError::Server { status: 502, message: String::new() }.kind(),
            ErrorKind::Transport
        );
    }

    #[test]
    fn test_validation_message() {
        let err = AppError::Validation(vec![
            FieldError::new("title", "Trích yếu không được để trống"),
            FieldError::new("primary", "Chưa chọn đơn vị chủ trì"),
        ]);
        assert_eq!(err.user_message(), "Trích yếu không được để trống");
        assert_eq!(err.field_errors().len(), 2);
        assert_eq!(err.to_string(), "Validation failed on 2 field(s)");
    }
}
