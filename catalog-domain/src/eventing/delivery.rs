//! 投递消息与队列绑定
//!
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 一次消息投递
///
/// `delivery_tag` 在同一消息源内唯一，确认（ack/nack）时据此定位消息；
/// `redelivered` 表示该消息此前已投递过但未被确认。
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize)]
pub struct Delivery {
    delivery_tag: u64,
    #[builder(into)]
    queue: String,
    #[builder(into)]
    exchange: String,
    #[builder(into)]
    routing_key: String,
    /// 消息类型（事件名）
    #[builder(into)]
    message_type: String,
    #[builder(into)]
    message_id: Option<String>,
    payload: Vec<u8>,
    #[builder(default)]
    redelivered: bool,
    #[builder(default = Utc::now())]
    published_at: DateTime<Utc>,
}

impl Delivery {
    pub fn delivery_tag(&self) -> u64 {
        self.delivery_tag
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn redelivered(&self) -> bool {
        self.redelivered
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    /// 标记为重投递后的副本
    pub fn into_redelivered(self) -> Self {
        Self {
            redelivered: true,
            ..self
        }
    }
}

/// 持久队列与事件流的绑定声明
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct QueueBinding {
    #[builder(into)]
    queue: String,
    #[builder(into)]
    exchange: String,
    #[builder(into)]
    routing_key: String,
    #[builder(default = true)]
    durable: bool,
}

impl QueueBinding {
    pub fn queue(&self) -> &str {
        &self.queue
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    pub fn durable(&self) -> bool {
        self.durable
    }
}
