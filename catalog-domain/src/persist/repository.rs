//! 版本化通用仓储
//!
//! 基于 `DocumentStore` 为任意 `Entity` 提供 CRUD 与分页查询，
//! 更新通过 `(id, version)` 条件替换实现乐观并发控制：
//! 匹配数为零即返回 `EditConflict`，不区分并发修改与并发删除。
//!
use crate::entity::{Entity, Identifier};
use crate::error::{DomainError, DomainResult};
use crate::persist::{
    Document, DocumentStore, Filter, Filters, ID_FIELD, Metadata, Page, StoreError,
};
use crate::validation::Validator;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// 版本字段名
pub const VERSION_FIELD: &str = "version";

/// 默认存储操作超时
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(3);

#[async_trait]
pub trait Repository<E>: Send + Sync
where
    E: Entity,
{
    /// 插入实体；标识未分配时由存储生成，返回最终标识
    async fn create(&self, entity: &E) -> DomainResult<E::Id>;

    async fn get_by_id(&self, id: &E::Id) -> DomainResult<E>;

    /// 过滤 + 排序 + 分页查询
    async fn get_all(&self, filter: Filter, filters: &Filters) -> DomainResult<Page<E>>;

    /// 以实体携带的版本为期望版本做条件替换，写入 `version + 1`，返回写入后的实体
    async fn update(&self, entity: E) -> DomainResult<E>;

    /// 以 `expected_version` 做条件替换，原样写入实体自身的版本
    async fn update_to(&self, entity: &E, expected_version: i64) -> DomainResult<()>;

    async fn delete(&self, id: &E::Id) -> DomainResult<()>;
}

#[async_trait]
impl<E, T> Repository<E> for Arc<T>
where
    E: Entity + 'static,
    T: Repository<E> + ?Sized,
{
    async fn create(&self, entity: &E) -> DomainResult<E::Id> {
        (**self).create(entity).await
    }

    async fn get_by_id(&self, id: &E::Id) -> DomainResult<E> {
        (**self).get_by_id(id).await
    }

    async fn get_all(&self, filter: Filter, filters: &Filters) -> DomainResult<Page<E>> {
        (**self).get_all(filter, filters).await
    }

    async fn update(&self, entity: E) -> DomainResult<E> {
        (**self).update(entity).await
    }

    async fn update_to(&self, entity: &E, expected_version: i64) -> DomainResult<()> {
        (**self).update_to(entity, expected_version).await
    }

    async fn delete(&self, id: &E::Id) -> DomainResult<()> {
        (**self).delete(id).await
    }
}

/// 基于文档存储的仓储实现
pub struct DocumentRepository<S, E> {
    store: S,
    collection: String,
    timeout: Duration,
    _entity: PhantomData<fn() -> E>,
}

impl<S, E> DocumentRepository<S, E>
where
    S: DocumentStore,
    E: Entity,
{
    pub fn new(store: S, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            timeout: DEFAULT_OPERATION_TIMEOUT,
            _entity: PhantomData,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn timed<T, F>(&self, operation: &'static str, fut: F) -> DomainResult<T>
    where
        F: Future<Output = Result<T, StoreError>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                tracing::warn!(
                    collection = %self.collection,
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "store operation timed out"
                );
                Err(StoreError::Timeout {
                    operation,
                    elapsed_ms: self.timeout.as_millis(),
                }
                .into())
            }
        }
    }

    fn id_filter(id: &E::Id) -> DomainResult<Filter> {
        Ok(Filter::by_id(serde_json::to_value(id)?))
    }

    fn not_found(&self, id: &E::Id) -> DomainError {
        DomainError::NotFound {
            collection: self.collection.clone(),
            id: id.to_string(),
        }
    }

    fn edit_conflict(&self, id: &E::Id, expected: i64) -> DomainError {
        DomainError::EditConflict {
            collection: self.collection.clone(),
            id: id.to_string(),
            expected,
        }
    }

    /// 条件替换：匹配 `(id, expected)`，写入 `entity` 的完整内容
    async fn replace_versioned(&self, entity: &E, expected: i64) -> DomainResult<()> {
        let filter = Self::id_filter(entity.id())?.eq(VERSION_FIELD, expected);
        let document = to_document(entity)?;

        let matched = self
            .timed(
                "replace_one",
                self.store.replace_one(&self.collection, &filter, document),
            )
            .await?;

        if matched == 0 {
            tracing::debug!(
                collection = %self.collection,
                id = %entity.id(),
                expected,
                "conditional replace matched nothing"
            );
            return Err(self.edit_conflict(entity.id(), expected));
        }

        Ok(())
    }
}

#[async_trait]
impl<S, E> Repository<E> for DocumentRepository<S, E>
where
    S: DocumentStore,
    E: Entity + 'static,
{
    async fn create(&self, entity: &E) -> DomainResult<E::Id> {
        let mut document = to_document(entity)?;
        if entity.id().is_unassigned() {
            document.remove(ID_FIELD);
        }

        let id = self
            .timed("insert_one", self.store.insert_one(&self.collection, document))
            .await?;

        Ok(serde_json::from_value(id)?)
    }

    async fn get_by_id(&self, id: &E::Id) -> DomainResult<E> {
        let filter = Self::id_filter(id)?;
        let found = self
            .timed("find_one", self.store.find_one(&self.collection, &filter))
            .await?;

        match found {
            Some(document) => from_document(document),
            None => Err(self.not_found(id)),
        }
    }

    async fn get_all(&self, filter: Filter, filters: &Filters) -> DomainResult<Page<E>> {
        let mut v = Validator::new();
        v.check(filters.page > 0, "page", "must be greater than zero");
        v.check(filters.page_size > 0, "page_size", "must be greater than zero");
        v.finish()?;

        let total = self
            .timed("count", self.store.count(&self.collection, &filter))
            .await?;
        if total == 0 {
            return Ok(Page::empty());
        }

        let options = filters.find_options();
        let documents = self
            .timed(
                "find",
                self.store.find(&self.collection, &filter, &options),
            )
            .await?;

        let items = documents
            .into_iter()
            .map(from_document)
            .collect::<DomainResult<Vec<E>>>()?;

        Ok(Page {
            items,
            metadata: Metadata::calculate(total as i64, filters.page, filters.limit()),
        })
    }

    async fn update(&self, entity: E) -> DomainResult<E> {
        let expected = entity.version();
        let next = entity.with_version(expected + 1);
        self.replace_versioned(&next, expected).await?;
        Ok(next)
    }

    async fn update_to(&self, entity: &E, expected_version: i64) -> DomainResult<()> {
        self.replace_versioned(entity, expected_version).await
    }

    async fn delete(&self, id: &E::Id) -> DomainResult<()> {
        let filter = Self::id_filter(id)?;
        let deleted = self
            .timed("delete_one", self.store.delete_one(&self.collection, &filter))
            .await?;

        if deleted == 0 {
            return Err(self.not_found(id));
        }
        Ok(())
    }
}

fn to_document<E: Entity>(entity: &E) -> DomainResult<Document> {
    match serde_json::to_value(entity)? {
        Value::Object(document) => Ok(document),
        other => Err(StoreError::InvalidDocument {
            reason: format!("entity must serialize to an object, got {other}"),
        }
        .into()),
    }
}

fn from_document<E: Entity>(document: Document) -> DomainResult<E> {
    Ok(serde_json::from_value(Value::Object(document))?)
}
