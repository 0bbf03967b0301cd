//! 领域层统一错误定义
//!
//! 聚焦序列化、存储、并发冲突、字段校验与消息消费等最小必要集合，
//! 便于在各实现层统一转换为 `DomainError`。
//!
use crate::persist::StoreError;
use crate::validation::ValidationErrors;
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化/解析 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("parse error: {reason}")]
    Parse { reason: String },

    // --- 仓储/持久化 ---
    #[error("record not found: collection={collection}, id={id}")]
    NotFound { collection: String, id: String },
    #[error("edit conflict: collection={collection}, id={id}, expected_version={expected}")]
    EditConflict {
        collection: String,
        id: String,
        expected: i64,
    },
    #[error(transparent)]
    Store {
        #[from]
        source: StoreError,
    },

    // --- 领域规则 ---
    #[error("validation failed: {errors}")]
    Validation { errors: ValidationErrors },

    // --- 消息消费 ---
    #[error("decode error: {reason}")]
    Decode { reason: String },
    #[error("message source error: {reason}")]
    MessageSource { reason: String },
}

impl DomainError {
    pub fn decode(reason: impl Into<String>) -> Self {
        DomainError::Decode {
            reason: reason.into(),
        }
    }

    pub fn message_source(reason: impl Into<String>) -> Self {
        DomainError::MessageSource {
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }

    pub fn is_edit_conflict(&self) -> bool {
        matches!(self, DomainError::EditConflict { .. })
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        DomainError::Validation { errors }
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

// ---- Cross-crate conversions for infrastructure convenience ----

impl From<uuid::Error> for DomainError {
    fn from(err: uuid::Error) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<std::num::ParseIntError> for DomainError {
    fn from(err: std::num::ParseIntError) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for DomainError {
    fn from(err: chrono::ParseError) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}
