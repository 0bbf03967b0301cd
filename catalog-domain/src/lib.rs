//! 目录服务领域层基础库（catalog-domain）
//!
//! 提供目录服务所需的通用抽象与构件：
//! - 实体契约（`entity`）：标识、版本与版本替换能力
//! - 字段校验（`validation`）：按字段收集的校验错误
//! - 文档持久化（`persist`）：存储协议、过滤/分页、结构校验、集合初始化，
//!   以及基于版本号乐观并发控制的通用仓储
//! - 消息消费（`eventing`）：消息源协议、处理器与长驻消费者
//!
//! 本 crate 与具体存储及消息中间件解耦，只定义协议与最小必要的错误类型；
//! `memory` 特性提供进程内的文档存储与消息代理实现，便于测试与本地开发。
//!
//! 典型用法：
//! 1. 使用 `#[entity]` 宏定义实体，声明其 `CollectionSpec`；
//! 2. 启动时调用 `persist::provision` 完成集合与索引初始化；
//! 3. 通过 `DocumentRepository` 读写实体，更新时依赖版本号检测冲突；
//! 4. 实现 `MessageHandler` 并交给 `Consumer` 持续消费外部事件。
//!
pub mod entity;
pub mod error;
#[cfg(feature = "eventing")]
pub mod eventing;
pub mod persist;
pub mod validation;

// 允许在本 crate 内部通过 ::catalog_domain 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::catalog_domain 路径。
extern crate self as catalog_domain;
