//! 持久化（persist）
//!
//! 定义文档存储协议与基于其上的通用构件，支持：
//! - 文档存储协议（`DocumentStore`）与存储层错误（`StoreError`）；
//! - 过滤、排序与分页（`Filter`/`Filters`/`Metadata`/`Page`）；
//! - 集合结构校验与索引声明（`Schema`/`IndexModel`），以及启动时的集合初始化（`provision`）；
//! - 基于版本号乐观并发控制的通用仓储（`Repository`/`DocumentRepository`）。
//!
//! 该模块聚焦协议与装配逻辑；`memory` 特性提供进程内存储实现。
//!
mod filter;
#[cfg(feature = "memory")]
mod memory;
mod pagination;
mod provision;
mod repository;
mod schema;
mod store;

pub use filter::{Filter, FindOptions, Predicate, Sort, SortDirection};
#[cfg(feature = "memory")]
pub use memory::InMemoryDocumentStore;
pub use pagination::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, Filters, MAX_PAGE, MAX_PAGE_SIZE, Metadata, Page,
};
pub use provision::{CollectionSpec, provision};
pub use repository::{DEFAULT_OPERATION_TIMEOUT, DocumentRepository, Repository, VERSION_FIELD};
pub use schema::{FieldRule, FieldType, IndexKind, IndexModel, Schema};
pub use store::{Document, DocumentStore, ID_FIELD, StoreError};
