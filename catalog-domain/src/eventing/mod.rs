//! 消息消费子系统（eventing）
//!
//! 提供外部事件消费的基础抽象与运行时：
//! - `MessageSource`：声明持久队列、订阅与逐条确认的统一接口；
//! - `MessageHandler`：对某类消息进行处理；
//! - `Consumer`：长驻消费任务，按处理结果确认、丢弃或重新入队，支持优雅关闭。
//!
//! 该模块仅定义协议与运行时，不绑定具体传输实现；`memory` 特性提供进程内代理。
//!
pub mod consumer;
pub mod delivery;
pub mod handler;
#[cfg(feature = "memory")]
pub mod memory;
pub mod source;

pub use consumer::{Consumer, ConsumerHandle, ConsumerState, Disposition};
pub use delivery::{Delivery, QueueBinding};
pub use handler::{HandledEventType, MessageHandler};
#[cfg(feature = "memory")]
pub use memory::InMemoryBroker;
pub use source::{DeliveryStream, MessageSource};
