//! 长驻消费者（Consumer）
//!
//! 编排“订阅 → 逐条处理 → 确认”的长驻任务：
//! - 订阅阶段声明持久队列并绑定事件流，失败时直接返回错误；
//! - 消费阶段顺序处理消息，按处理结果确认、丢弃或重新入队；
//! - 取消信号到达后不再接收新消息，正在处理的消息会完成并确认；
//! - 提供关闭、状态查询与等待的 `ConsumerHandle`。
//!
use super::{Delivery, DeliveryStream, MessageHandler, MessageSource, QueueBinding};
use crate::error::{DomainError, DomainResult};
use bon::Builder;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 消费者状态：`Idle → Subscribing → Consuming → Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Idle,
    Subscribing,
    Consuming,
    Stopped,
}

/// 单条消息的处置方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// 确认
    Ack,
    /// 否认并重新入队
    Requeue,
    /// 否认且不重新入队
    Drop,
}

impl Disposition {
    pub fn of(result: &DomainResult<()>) -> Self {
        match result {
            Ok(()) => Disposition::Ack,
            Err(DomainError::Decode { .. }) => Disposition::Drop,
            Err(_) => Disposition::Requeue,
        }
    }
}

#[derive(Builder)]
pub struct Consumer {
    source: Arc<dyn MessageSource>,
    handler: Arc<dyn MessageHandler>,
    binding: QueueBinding,
}

impl Consumer {
    pub fn binding(&self) -> &QueueBinding {
        &self.binding
    }

    /// 订阅并启动消费任务
    ///
    /// 订阅失败时返回错误，不会启动任何任务。
    pub async fn start(self: Arc<Self>) -> DomainResult<ConsumerHandle> {
        let (state_tx, state_rx) = watch::channel(ConsumerState::Idle);
        state_tx.send_replace(ConsumerState::Subscribing);

        let stream = match self.source.subscribe(&self.binding).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!(
                    queue = self.binding.queue(),
                    handler = self.handler.handler_name(),
                    error = %e,
                    "subscribe failed"
                );
                state_tx.send_replace(ConsumerState::Stopped);
                return Err(e);
            }
        };

        tracing::info!(
            queue = self.binding.queue(),
            exchange = self.binding.exchange(),
            routing_key = self.binding.routing_key(),
            handler = self.handler.handler_name(),
            "consumer started"
        );
        state_tx.send_replace(ConsumerState::Consuming);

        let token = CancellationToken::new();
        let task = tokio::spawn(Self::consume_loop(self, stream, token.clone(), state_tx));

        Ok(ConsumerHandle {
            token,
            task: Some(task),
            state: state_rx,
        })
    }

    async fn consume_loop(
        self: Arc<Self>,
        mut stream: DeliveryStream,
        token: CancellationToken,
        state: watch::Sender<ConsumerState>,
    ) -> DomainResult<()> {
        let result = loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    break Ok(());
                }
                next = stream.next() => {
                    match next {
                        Some(Ok(delivery)) => self.dispatch(delivery).await,
                        Some(Err(e)) => {
                            tracing::error!(
                                queue = self.binding.queue(),
                                error = %e,
                                "delivery stream failed"
                            );
                            break Err(e);
                        }
                        None => {
                            tracing::info!(queue = self.binding.queue(), "delivery stream closed");
                            break Ok(());
                        }
                    }
                }
            }
        };

        state.send_replace(ConsumerState::Stopped);
        tracing::info!(queue = self.binding.queue(), "consumer stopped");
        result
    }

    async fn dispatch(&self, delivery: Delivery) {
        let handler = self.handler.handler_name();

        if !self
            .handler
            .handled_event_type()
            .matches(delivery.message_type())
        {
            tracing::debug!(
                handler,
                message_type = delivery.message_type(),
                delivery_tag = delivery.delivery_tag(),
                "skipping unhandled message type"
            );
            self.settle(&delivery, Disposition::Ack).await;
            return;
        }

        let result = self.handler.handle(&delivery).await;
        let disposition = Disposition::of(&result);

        if let Err(e) = &result {
            match disposition {
                Disposition::Drop => tracing::warn!(
                    handler,
                    delivery_tag = delivery.delivery_tag(),
                    error = %e,
                    "dropping undecodable message"
                ),
                _ => tracing::warn!(
                    handler,
                    delivery_tag = delivery.delivery_tag(),
                    redelivered = delivery.redelivered(),
                    error = %e,
                    "handler failed, requeueing"
                ),
            }
        }

        self.settle(&delivery, disposition).await;
    }

    async fn settle(&self, delivery: &Delivery, disposition: Disposition) {
        let settled = match disposition {
            Disposition::Ack => self.source.ack(delivery).await,
            Disposition::Requeue => self.source.nack(delivery, true).await,
            Disposition::Drop => self.source.nack(delivery, false).await,
        };

        if let Err(e) = settled {
            tracing::error!(
                delivery_tag = delivery.delivery_tag(),
                ?disposition,
                error = %e,
                "failed to settle delivery"
            );
        }
    }
}

/// 消费者运行句柄：用于优雅关闭、状态查询与等待任务结束
pub struct ConsumerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<DomainResult<()>>>,
    state: watch::Receiver<ConsumerState>,
}

impl ConsumerHandle {
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub fn state(&self) -> ConsumerState {
        *self.state.borrow()
    }

    /// 等待消费任务进入 `Stopped`（取消、流结束或流错误）
    pub async fn wait_stopped(&self) {
        let mut state = self.state.clone();
        let _ = state.wait_for(|s| *s == ConsumerState::Stopped).await;
    }

    /// 等待消费任务结束，返回其结果
    pub async fn join(mut self) -> DomainResult<()> {
        match self.task.take() {
            Some(task) => task
                .await
                .map_err(|e| DomainError::message_source(format!("consumer task failed: {e}")))?,
            None => Ok(()),
        }
    }
}

impl Drop for ConsumerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
