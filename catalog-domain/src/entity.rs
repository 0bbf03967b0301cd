//! 实体（Entity）基础抽象
//!
//! 任何可存储的记录只需实现三项能力：标识、版本与“替换版本后的新值”，
//! 仓储据此完成乐观并发控制，无需共同的基类型。
//!
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Display;

/// 实体标识
///
/// 标识在创建时确定且不可变。对于由存储分配的标识，类型可以用一个
/// “未分配”的取值表示尚未入库的实体，仓储在插入时据此交给存储生成。
pub trait Identifier:
    Clone + Display + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// 是否为未分配的标识（默认所有取值均视为已分配）
    fn is_unassigned(&self) -> bool {
        false
    }
}

impl Identifier for i64 {}

impl Identifier for String {
    fn is_unassigned(&self) -> bool {
        self.is_empty()
    }
}

/// 具备唯一标识与版本的实体抽象
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// 实体标识类型
    type Id: Identifier;

    /// 获取实体标识
    fn id(&self) -> &Self::Id;

    /// 获取当前版本（从 1 开始，用于乐观锁与并发控制）
    fn version(&self) -> i64;

    /// 返回替换了版本号的新实体，不修改任何共享状态
    fn with_version(self, version: i64) -> Self;
}
