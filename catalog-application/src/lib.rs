//! 目录服务应用层（catalog-application）
//!
//! - 领域模型：商品（`Item`）与用户副本（`User`）；
//! - 集合声明与启动初始化（`collections`）；
//! - 商品用例：命令/查询处理器（`item_service`）；
//! - 用户副本同步：`UserUpdated` 事件处理器（`replica`）。
//!
pub mod collections;
pub mod command;
pub mod command_handler;
pub mod context;
pub mod dto;
pub mod error;
pub mod item_service;
pub mod model;
pub mod patch;
pub mod query;
pub mod query_handler;
pub mod replica;

pub use item_service::ItemService;
pub use replica::UserReplicaSync;
