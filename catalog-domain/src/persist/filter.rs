//! 查询过滤与排序
//!
//! 过滤条件为若干谓词的合取（AND）；文本检索在带文本索引的字段上做
//! 大小写不敏感的分词匹配，任一检索词命中即视为匹配。
//!
use crate::persist::ID_FIELD;
use serde_json::Value;

/// 单个过滤谓词
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// 字段等于给定值
    Eq { field: String, value: Value },
    /// 数值字段大于等于给定值
    Gte { field: String, value: f64 },
    /// 数值字段小于等于给定值
    Lte { field: String, value: f64 },
    /// 文本检索（需要集合存在文本索引）
    Text { search: String },
}

/// 过滤条件（谓词合取）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按主键匹配
    pub fn by_id(id: Value) -> Self {
        Self::new().eq(ID_FIELD, id)
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn gte(mut self, field: impl Into<String>, value: f64) -> Self {
        self.predicates.push(Predicate::Gte {
            field: field.into(),
            value,
        });
        self
    }

    pub fn lte(mut self, field: impl Into<String>, value: f64) -> Self {
        self.predicates.push(Predicate::Lte {
            field: field.into(),
            value,
        });
        self
    }

    pub fn text(mut self, search: impl Into<String>) -> Self {
        self.predicates.push(Predicate::Text {
            search: search.into(),
        });
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn has_text(&self) -> bool {
        self.predicates
            .iter()
            .any(|p| matches!(p, Predicate::Text { .. }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// 单字段排序（主键作为次序的最终决胜字段）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// 解析排序键：前缀 `-` 表示降序
    pub fn parse(key: &str) -> Self {
        match key.strip_prefix('-') {
            Some(field) => Self::descending(field),
            None => Self::ascending(key),
        }
    }
}

impl Default for Sort {
    fn default() -> Self {
        Self::ascending(ID_FIELD)
    }
}

/// 查找选项
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub sort: Sort,
    pub skip: u64,
    pub limit: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sort_parse_handles_descending_prefix() {
        assert_eq!(Sort::parse("-price"), Sort::descending("price"));
        assert_eq!(Sort::parse("name"), Sort::ascending("name"));
        assert_eq!(Sort::default(), Sort::ascending("id"));
    }

    #[test]
    fn filter_builder_collects_predicates() {
        let f = Filter::by_id(json!(1)).gte("price", 0.5).text("pen");
        assert_eq!(f.predicates().len(), 3);
        assert!(f.has_text());
        assert!(!Filter::new().has_text());
        assert!(Filter::new().is_empty());
    }
}
