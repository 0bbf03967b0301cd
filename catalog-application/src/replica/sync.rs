use super::{USER_UPDATED, UserUpdated};
use crate::model::User;
use async_trait::async_trait;
use catalog_domain::error::{DomainError, DomainResult};
use catalog_domain::eventing::{Delivery, HandledEventType, MessageHandler};
use catalog_domain::persist::{Repository, StoreError};

/// 单条事件的同步结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// 首次见到该用户，已创建副本
    Created,
    /// 副本已更新到事件版本
    Updated { from: i64, to: i64 },
    /// 事件版本不新于已存储版本，忽略
    Discarded { stored: i64, incoming: i64 },
}

/// 用户副本同步器
///
/// 仅接受版本号严格递增的事件，从而容忍乱序与重复投递（但不容忍丢失）。
/// 写入使用以已读版本为条件的替换，原样保存事件携带的版本号。
pub struct UserReplicaSync<R> {
    users: R,
}

impl<R> UserReplicaSync<R>
where
    R: Repository<User>,
{
    pub fn new(users: R) -> Self {
        Self { users }
    }

    pub async fn apply(&self, event: UserUpdated) -> DomainResult<SyncOutcome> {
        match self.users.get_by_id(&event.id).await {
            Ok(stored) => self.apply_to_existing(stored, event).await,
            Err(e) if e.is_not_found() => {
                let user = User::from(event);
                match self.users.create(&user).await {
                    Ok(_) => Ok(SyncOutcome::Created),
                    // 并发的首次投递：对方已创建，按已存在处理
                    Err(DomainError::Store {
                        source: StoreError::DuplicateKey { .. },
                    }) => {
                        tracing::debug!(user_id = user.id, "replica created concurrently");
                        let stored = self.users.get_by_id(&user.id).await?;
                        self.apply_to_existing(stored, UserUpdated::from(user)).await
                    }
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn apply_to_existing(
        &self,
        mut stored: User,
        event: UserUpdated,
    ) -> DomainResult<SyncOutcome> {
        let from = stored.version;
        if event.version <= from {
            return Ok(SyncOutcome::Discarded {
                stored: from,
                incoming: event.version,
            });
        }

        stored.apply(event);
        self.users.update_to(&stored, from).await?;
        Ok(SyncOutcome::Updated {
            from,
            to: stored.version,
        })
    }
}

impl From<User> for UserUpdated {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            permissions: user.permissions.into_iter().collect(),
            version: user.version,
        }
    }
}

#[async_trait]
impl<R> MessageHandler for UserReplicaSync<R>
where
    R: Repository<User>,
{
    fn handler_name(&self) -> &str {
        "user-replica-sync"
    }

    fn handled_event_type(&self) -> HandledEventType {
        HandledEventType::One(USER_UPDATED.to_string())
    }

    async fn handle(&self, delivery: &Delivery) -> DomainResult<()> {
        let event = UserUpdated::decode(delivery.payload())?;
        let user_id = event.id;

        match self.apply(event).await? {
            SyncOutcome::Created => {
                tracing::info!(user_id, "user replica created");
            }
            SyncOutcome::Updated { from, to } => {
                tracing::info!(user_id, from, to, "user replica updated");
            }
            SyncOutcome::Discarded { stored, incoming } => {
                tracing::debug!(
                    user_id,
                    stored,
                    incoming,
                    redelivered = delivery.redelivered(),
                    "stale user event discarded"
                );
            }
        }
        Ok(())
    }
}
