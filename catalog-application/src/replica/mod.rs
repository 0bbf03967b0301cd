//! 用户副本同步
//!
//! 消费身份服务发布的 `UserUpdated` 事件，维护本地 `users` 集合中的非权威副本。
//!
mod event;
mod sync;

pub use event::{USER_UPDATED, UserUpdated};
pub use sync::{SyncOutcome, UserReplicaSync};
