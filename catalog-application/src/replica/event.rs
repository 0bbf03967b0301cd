use bon::Builder;
use catalog_domain::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

/// 事件类型名（同时作为默认路由键）
pub const USER_UPDATED: &str = "UserUpdated";

/// 身份服务发布的用户变更事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct UserUpdated {
    pub id: i64,
    #[builder(into)]
    pub name: String,
    #[builder(default)]
    pub permissions: Vec<String>,
    pub version: i64,
}

impl UserUpdated {
    /// 解析消息负载；格式错误或版本非正时返回 `DomainError::Decode`
    pub fn decode(payload: &[u8]) -> DomainResult<Self> {
        let event: Self =
            serde_json::from_slice(payload).map_err(|e| DomainError::decode(e.to_string()))?;

        if event.version < 1 {
            return Err(DomainError::decode(format!(
                "version must be >= 1, got {}",
                event.version
            )));
        }
        Ok(event)
    }
}
