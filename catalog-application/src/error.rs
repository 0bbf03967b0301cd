use catalog_domain::error::DomainError;
use catalog_domain::validation::ValidationErrors;

/// 应用层错误：调用方只会看到以下几类结果之一
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation: {0}")]
    Validation(ValidationErrors),

    #[error("edit conflict: {0}")]
    EditConflict(String),

    #[error("internal: {0}")]
    Internal(#[source] DomainError),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => AppError::NotFound(err.to_string()),
            DomainError::EditConflict { .. } => AppError::EditConflict(err.to_string()),
            DomainError::Validation { errors } => AppError::Validation(errors),
            other => AppError::Internal(other),
        }
    }
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
