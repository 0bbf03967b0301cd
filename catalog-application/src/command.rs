/// 应用层命令（Command）
///
/// 表达“意图”的写操作请求，通常会修改领域状态。
/// - 建议保持语义化的“动宾结构”命名，如 `CreateItem`、`DeleteItem`。
/// - `Output` 仅承载执行结果所必需的最少信息（如新记录的标识）。
///
/// 关联常量：
/// - `NAME`：命令的稳定名称，用于日志与追踪。避免依赖 `type_name::<T>()`。
pub trait Command: Send + Sync + 'static {
    /// 命令的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;

    /// 命令执行成功后的返回值
    type Output: Send;
}
