use bon::Builder;

/// 应用层上下文（Application Context）
///
/// 承载一次应用层调用（命令/查询）所需的横切信息，用于日志关联与审计：
///
/// ```rust
/// use catalog_application::context::AppContext;
///
/// let ctx = AppContext::builder()
///     .correlation_id("cor-123")
///     .actor_id("u-1")
///     .build();
/// assert_eq!(ctx.correlation_id(), "cor-123");
/// ```
#[derive(Clone, Debug, Default, Builder)]
pub struct AppContext {
    /// 关联追踪 ID
    #[builder(into)]
    correlation_id: Option<String>,
    /// 执行者 ID
    #[builder(into)]
    actor_id: Option<String>,
}

impl AppContext {
    pub fn correlation_id(&self) -> &str {
        self.correlation_id.as_deref().unwrap_or("-")
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }
}
