//! 部分更新模型
//!
//! `Patch<T>` 区分“未提供”与“提供了新值”：反序列化请求体时，缺失的键为 `Unset`，
//! 出现的键为 `Set`；对不可为空的字段，`null` 会被拒绝。
//!
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Unset,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Patch::Set(v) => Some(v),
            Patch::Unset => None,
        }
    }

    /// 若已提供新值则覆盖 `target`
    pub fn apply_to(self, target: &mut T) {
        if let Patch::Set(v) = self {
            *target = v;
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Unset,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Patch::Set)
    }
}

/// 商品的部分更新
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ItemPatch {
    pub name: Patch<String>,
    pub description: Patch<String>,
    pub price: Patch<f64>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        !(self.name.is_set() || self.description.is_set() || self.price.is_set())
    }
}
