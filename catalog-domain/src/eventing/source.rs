//! 消息源（MessageSource）
//!
//! 统一“声明队列并订阅、逐条确认”的接口，语义为至少一次投递：
//! 未确认的消息在重新入队后会以 `redelivered = true` 再次投递。
//!
use super::{Delivery, QueueBinding};
use crate::error::DomainResult;
use async_trait::async_trait;
use futures_core::stream::BoxStream;
use std::sync::Arc;

/// 投递流；流结束表示消息源已关闭
pub type DeliveryStream = BoxStream<'static, DomainResult<Delivery>>;

#[async_trait]
pub trait MessageSource: Send + Sync {
    /// 声明持久队列、绑定到事件流并开始接收
    async fn subscribe(&self, binding: &QueueBinding) -> DomainResult<DeliveryStream>;

    async fn ack(&self, delivery: &Delivery) -> DomainResult<()>;

    /// 否认确认；`requeue` 为真时消息重新入队，否则丢弃
    async fn nack(&self, delivery: &Delivery, requeue: bool) -> DomainResult<()>;
}

#[async_trait]
impl<T> MessageSource for Arc<T>
where
    T: MessageSource + ?Sized,
{
    async fn subscribe(&self, binding: &QueueBinding) -> DomainResult<DeliveryStream> {
        (**self).subscribe(binding).await
    }

    async fn ack(&self, delivery: &Delivery) -> DomainResult<()> {
        (**self).ack(delivery).await
    }

    async fn nack(&self, delivery: &Delivery, requeue: bool) -> DomainResult<()> {
        (**self).nack(delivery, requeue).await
    }
}
