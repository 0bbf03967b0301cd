//! 进程内消息代理（InMemoryBroker）
//!
//! 满足 `MessageSource` 协议的轻量实现，模拟持久队列的至少一次投递语义：
//! - `publish`：按 `(exchange, routing_key)` 路由到所有已绑定队列；
//! - `subscribe`：声明队列与绑定，返回 `'static` 投递流；
//! - `ack`/`nack`：确认、丢弃或重新入队（队首，标记为重投递）。
//!
//! 典型用途：测试环境与本地开发。
//!
use super::{Delivery, DeliveryStream, MessageSource, QueueBinding};
use crate::error::{DomainError, DomainResult};
use async_trait::async_trait;
use futures_util::stream;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

#[derive(Default)]
struct QueueState {
    ready: VecDeque<Delivery>,
    unacked: HashMap<u64, Delivery>,
    dead_letters: Vec<Delivery>,
    acked: u64,
    closed: bool,
    failure: Option<String>,
}

#[derive(Default)]
struct Queue {
    state: Mutex<QueueState>,
    notify: Notify,
}

#[derive(Default)]
struct BrokerState {
    queues: HashMap<String, Arc<Queue>>,
    bindings: Vec<(String, String, String)>,
    subscribe_error: Option<String>,
}

/// 进程内消息代理（克隆共享同一份状态）
#[derive(Clone, Default)]
pub struct InMemoryBroker {
    state: Arc<Mutex<BrokerState>>,
    next_tag: Arc<AtomicU64>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明队列与绑定（幂等）
    pub async fn declare(&self, binding: &QueueBinding) {
        let mut state = self.state.lock().await;
        state
            .queues
            .entry(binding.queue().to_string())
            .or_default();

        let key = (
            binding.exchange().to_string(),
            binding.routing_key().to_string(),
            binding.queue().to_string(),
        );
        if !state.bindings.contains(&key) {
            state.bindings.push(key);
        }
    }

    /// 发布消息，返回路由到的队列数量
    pub async fn publish(&self, exchange: &str, routing_key: &str, payload: Vec<u8>) -> usize {
        let targets: Vec<(String, Arc<Queue>)> = {
            let state = self.state.lock().await;
            state
                .bindings
                .iter()
                .filter(|(e, r, _)| e == exchange && r == routing_key)
                .filter_map(|(_, _, q)| state.queues.get(q).map(|queue| (q.clone(), queue.clone())))
                .collect()
        };

        let message_id = Uuid::now_v7().to_string();
        for (name, queue) in &targets {
            let delivery = Delivery::builder()
                .delivery_tag(self.next_tag.fetch_add(1, Ordering::Relaxed) + 1)
                .queue(name.as_str())
                .exchange(exchange)
                .routing_key(routing_key)
                .message_type(routing_key)
                .message_id(message_id.as_str())
                .payload(payload.clone())
                .build();

            queue.state.lock().await.ready.push_back(delivery);
            queue.notify.notify_one();
        }

        targets.len()
    }

    pub async fn publish_json<T: Serialize>(
        &self,
        exchange: &str,
        routing_key: &str,
        message: &T,
    ) -> DomainResult<usize> {
        let payload = serde_json::to_vec(message)?;
        Ok(self.publish(exchange, routing_key, payload).await)
    }

    /// 关闭队列：已就绪的消息投递完毕后投递流结束
    pub async fn close(&self, queue: &str) {
        if let Some(q) = self.queue(queue).await {
            q.state.lock().await.closed = true;
            q.notify.notify_one();
        }
    }

    /// 令队列的投递流产生一次错误
    pub async fn fail(&self, queue: &str, reason: impl Into<String>) {
        if let Some(q) = self.queue(queue).await {
            q.state.lock().await.failure = Some(reason.into());
            q.notify.notify_one();
        }
    }

    /// 之后的订阅请求均失败
    pub async fn reject_subscriptions(&self, reason: impl Into<String>) {
        self.state.lock().await.subscribe_error = Some(reason.into());
    }

    pub async fn ready_count(&self, queue: &str) -> usize {
        match self.queue(queue).await {
            Some(q) => q.state.lock().await.ready.len(),
            None => 0,
        }
    }

    pub async fn unacked_count(&self, queue: &str) -> usize {
        match self.queue(queue).await {
            Some(q) => q.state.lock().await.unacked.len(),
            None => 0,
        }
    }

    pub async fn acked_count(&self, queue: &str) -> u64 {
        match self.queue(queue).await {
            Some(q) => q.state.lock().await.acked,
            None => 0,
        }
    }

    /// 被否认且未重新入队的消息
    pub async fn dead_letters(&self, queue: &str) -> Vec<Delivery> {
        match self.queue(queue).await {
            Some(q) => q.state.lock().await.dead_letters.clone(),
            None => Vec::new(),
        }
    }

    async fn queue(&self, name: &str) -> Option<Arc<Queue>> {
        self.state.lock().await.queues.get(name).cloned()
    }

    async fn take_unacked(&self, delivery: &Delivery) -> DomainResult<(Arc<Queue>, Delivery)> {
        let queue = self.queue(delivery.queue()).await.ok_or_else(|| {
            DomainError::message_source(format!("unknown queue: {}", delivery.queue()))
        })?;

        let taken = queue
            .state
            .lock()
            .await
            .unacked
            .remove(&delivery.delivery_tag());

        match taken {
            Some(d) => Ok((queue, d)),
            None => Err(DomainError::message_source(format!(
                "unknown delivery tag: {}",
                delivery.delivery_tag()
            ))),
        }
    }
}

#[async_trait]
impl MessageSource for InMemoryBroker {
    async fn subscribe(&self, binding: &QueueBinding) -> DomainResult<DeliveryStream> {
        if let Some(reason) = self.state.lock().await.subscribe_error.clone() {
            return Err(DomainError::message_source(reason));
        }

        self.declare(binding).await;
        let queue = self
            .queue(binding.queue())
            .await
            .ok_or_else(|| DomainError::message_source("queue vanished after declare"))?;

        let stream = stream::unfold(queue, |queue| async move {
            loop {
                {
                    let mut state = queue.state.lock().await;
                    if let Some(reason) = state.failure.take() {
                        drop(state);
                        return Some((Err(DomainError::message_source(reason)), queue));
                    }
                    if let Some(delivery) = state.ready.pop_front() {
                        state
                            .unacked
                            .insert(delivery.delivery_tag(), delivery.clone());
                        drop(state);
                        return Some((Ok::<_, DomainError>(delivery), queue));
                    }
                    if state.closed {
                        return None;
                    }
                }
                queue.notify.notified().await;
            }
        });

        Ok(Box::pin(stream))
    }

    async fn ack(&self, delivery: &Delivery) -> DomainResult<()> {
        let (queue, _) = self.take_unacked(delivery).await?;
        queue.state.lock().await.acked += 1;
        Ok(())
    }

    async fn nack(&self, delivery: &Delivery, requeue: bool) -> DomainResult<()> {
        let (queue, original) = self.take_unacked(delivery).await?;

        let mut state = queue.state.lock().await;
        if requeue {
            state.ready.push_front(original.into_redelivered());
            drop(state);
            queue.notify.notify_one();
        } else {
            state.dead_letters.push(original);
        }
        Ok(())
    }
}
