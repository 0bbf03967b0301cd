//! 消息处理器（MessageHandler）
//!
//! 定义消费某类/多类/全部消息的处理逻辑与元信息（名称、订阅类型）。
//!
use super::Delivery;
use crate::error::DomainResult;
use async_trait::async_trait;

#[derive(Clone, Debug)]
pub enum HandledEventType {
    One(String),
    Many(Vec<String>),
    All,
}

impl HandledEventType {
    pub fn matches(&self, message_type: &str) -> bool {
        match self {
            HandledEventType::One(t) => t == message_type,
            HandledEventType::Many(ts) => ts.iter().any(|t| t == message_type),
            HandledEventType::All => true,
        }
    }
}

/// 消息处理器
///
/// 返回 `Ok` 表示已处理（包括有意丢弃），消息将被确认；
/// 返回 `DomainError::Decode` 表示消息无法解析，不再重投；
/// 其余错误视为暂时性失败，消息重新入队。
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// 处理器名称（用于日志）
    fn handler_name(&self) -> &str;
    /// 返回该处理器支持的消息类型
    fn handled_event_type(&self) -> HandledEventType;
    /// 处理消息
    async fn handle(&self, delivery: &Delivery) -> DomainResult<()>;
}
