//! 文档存储协议
//!
//! 以 JSON 对象作为文档，按集合组织；`id` 字段为主键。
//! 仓储与集合初始化只依赖本协议，具体后端由上层注入。
//!
use crate::persist::{Filter, FindOptions, IndexModel, Schema};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// 文档：字段名到 JSON 值的映射
pub type Document = serde_json::Map<String, Value>;

/// 主键字段名
pub const ID_FIELD: &str = "id";

/// 存储层错误
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("collection already exists: {collection}")]
    CollectionExists { collection: String },
    #[error("collection not found: {collection}")]
    CollectionNotFound { collection: String },
    #[error("duplicate key: collection={collection}, index={index}, value={value}")]
    DuplicateKey {
        collection: String,
        index: String,
        value: String,
    },
    #[error("document failed validation: collection={collection}, reason={reason}")]
    SchemaViolation { collection: String, reason: String },
    #[error("index conflict: collection={collection}, index={index}")]
    IndexConflict { collection: String, index: String },
    #[error("text search requires a text index: collection={collection}")]
    TextIndexRequired { collection: String },
    #[error("operation timed out: operation={operation}, elapsed_ms={elapsed_ms}")]
    Timeout {
        operation: &'static str,
        elapsed_ms: u128,
    },
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },
    #[error("invalid document: {reason}")]
    InvalidDocument { reason: String },
}

/// 文档存储
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 创建集合并附加结构校验；集合已存在时返回 `CollectionExists`
    async fn create_collection(&self, name: &str, schema: Schema) -> Result<(), StoreError>;

    /// 确保索引存在；同名同定义为幂等操作，同名不同定义返回 `IndexConflict`
    async fn create_indexes(
        &self,
        collection: &str,
        indexes: &[IndexModel],
    ) -> Result<(), StoreError>;

    /// 插入文档；缺少 `id` 时由存储生成，返回最终的 `id`
    async fn insert_one(&self, collection: &str, document: Document) -> Result<Value, StoreError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// 以过滤条件整体替换至多一个文档，返回匹配数量
    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        replacement: Document,
    ) -> Result<u64, StoreError>;

    /// 删除至多一个文档，返回删除数量
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;
}

#[async_trait]
impl<T> DocumentStore for Arc<T>
where
    T: DocumentStore + ?Sized,
{
    async fn create_collection(&self, name: &str, schema: Schema) -> Result<(), StoreError> {
        (**self).create_collection(name, schema).await
    }

    async fn create_indexes(
        &self,
        collection: &str,
        indexes: &[IndexModel],
    ) -> Result<(), StoreError> {
        (**self).create_indexes(collection, indexes).await
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<Value, StoreError> {
        (**self).insert_one(collection, document).await
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        (**self).find_one(collection, filter).await
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        (**self).find(collection, filter, options).await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        (**self).count(collection, filter).await
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        replacement: Document,
    ) -> Result<u64, StoreError> {
        (**self).replace_one(collection, filter, replacement).await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        (**self).delete_one(collection, filter).await
    }
}
