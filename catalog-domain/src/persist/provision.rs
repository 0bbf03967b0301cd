//! 集合初始化（Provisioning）
//!
//! 启动时确保集合存在并带有结构校验器，同时确保声明的索引就绪。
//! “集合已存在”不视为错误；其余失败由调用方按致命错误处理。
//!
use crate::error::DomainResult;
use crate::persist::{DocumentStore, IndexModel, Schema, StoreError};
use bon::Builder;
use std::time::Duration;

/// 集合声明：名称、结构校验器与索引
#[derive(Debug, Clone, Builder)]
pub struct CollectionSpec {
    #[builder(into)]
    pub name: String,
    pub schema: Schema,
    #[builder(default)]
    pub indexes: Vec<IndexModel>,
}

/// 确保集合与索引存在
///
/// 每个存储调用都受 `timeout` 约束，超时返回 `StoreError::Timeout`。
pub async fn provision<S>(store: &S, spec: &CollectionSpec, timeout: Duration) -> DomainResult<()>
where
    S: DocumentStore + ?Sized,
{
    let created = tokio::time::timeout(
        timeout,
        store.create_collection(&spec.name, spec.schema.clone()),
    )
    .await
    .map_err(|_| StoreError::Timeout {
        operation: "create_collection",
        elapsed_ms: timeout.as_millis(),
    })?;

    match created {
        Ok(()) => {
            tracing::info!(collection = %spec.name, "collection created");
        }
        Err(StoreError::CollectionExists { .. }) => {
            tracing::debug!(collection = %spec.name, "collection already exists");
        }
        Err(e) => return Err(e.into()),
    }

    if !spec.indexes.is_empty() {
        tokio::time::timeout(timeout, store.create_indexes(&spec.name, &spec.indexes))
            .await
            .map_err(|_| StoreError::Timeout {
                operation: "create_indexes",
                elapsed_ms: timeout.as_millis(),
            })??;

        tracing::debug!(
            collection = %spec.name,
            indexes = spec.indexes.len(),
            "indexes ensured"
        );
    }

    Ok(())
}
