//! 集合结构校验与索引定义
//!
//! `Schema` 描述必填字段、字段类型与数值边界，并可禁止额外字段；
//! 存储在每次写入时执行校验。
//!
use crate::persist::Document;
use bon::Builder;
use serde_json::Value;
use std::collections::BTreeMap;

/// 字段类型
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    /// RFC 3339 格式的时间字符串
    DateTime,
    Array(Box<FieldType>),
    Any,
}

impl FieldType {
    pub fn array_of(item: FieldType) -> Self {
        FieldType::Array(Box::new(item))
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::DateTime => value
                .as_str()
                .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok()),
            FieldType::Array(item) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|v| item.accepts(v))),
            FieldType::Any => true,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::DateTime => "date",
            FieldType::Array(_) => "array",
            FieldType::Any => "any",
        }
    }
}

/// 单字段规则
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub field_type: FieldType,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub description: Option<String>,
}

impl FieldRule {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            minimum: None,
            maximum: None,
            description: None,
        }
    }

    pub fn minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn check(&self, field: &str, value: &Value) -> Result<(), String> {
        if !self.field_type.accepts(value) {
            return Err(format!(
                "field '{field}' must be of type {}",
                self.field_type.name()
            ));
        }
        if let Some(n) = value.as_f64() {
            if let Some(min) = self.minimum
                && n < min
            {
                return Err(format!("field '{field}' must be >= {min}"));
            }
            if let Some(max) = self.maximum
                && n > max
            {
                return Err(format!("field '{field}' must be <= {max}"));
            }
        }
        Ok(())
    }
}

/// 集合结构校验器
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub required: Vec<String>,
    pub properties: BTreeMap<String, FieldRule>,
    pub additional_properties: bool,
}

impl Schema {
    /// 宽松结构：不限制任何字段
    pub fn permissive() -> Self {
        Self {
            additional_properties: true,
            ..Self::default()
        }
    }

    /// 严格结构：仅允许声明过的字段
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn required<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn property(mut self, field: impl Into<String>, rule: FieldRule) -> Self {
        self.properties.insert(field.into(), rule);
        self
    }

    /// 校验文档，返回首个违规原因
    pub fn validate(&self, document: &Document) -> Result<(), String> {
        for field in &self.required {
            if !document.contains_key(field) {
                return Err(format!("missing required field '{field}'"));
            }
        }

        for (field, value) in document {
            match self.properties.get(field) {
                Some(rule) => rule.check(field, value)?,
                None if !self.additional_properties => {
                    return Err(format!("additional field '{field}' is not allowed"));
                }
                None => {}
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Ascending,
    Text,
}

/// 索引定义
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct IndexModel {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub field: String,
    pub kind: IndexKind,
    #[builder(default)]
    pub unique: bool,
}

impl IndexModel {
    /// 单字段唯一索引，命名为 `<field>_1`
    pub fn unique(field: &str) -> Self {
        Self::builder()
            .name(format!("{field}_1"))
            .field(field)
            .kind(IndexKind::Ascending)
            .unique(true)
            .build()
    }

    /// 文本索引，命名为 `<field>_text`
    pub fn text(field: &str) -> Self {
        Self::builder()
            .name(format!("{field}_text"))
            .field(field)
            .kind(IndexKind::Text)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    fn price_schema() -> Schema {
        Schema::strict()
            .required(["id", "price"])
            .property("id", FieldRule::new(FieldType::Any))
            .property(
                "price",
                FieldRule::new(FieldType::Number)
                    .minimum(0.1)
                    .maximum(1000.0),
            )
            .property("tags", FieldRule::new(FieldType::array_of(FieldType::String)))
            .property("at", FieldRule::new(FieldType::DateTime))
    }

    #[test]
    fn accepts_valid_document() {
        let s = price_schema();
        assert!(
            s.validate(&doc(json!({"id": 1, "price": 0.1, "tags": ["a"], "at": "2024-01-01T00:00:00Z"})))
                .is_ok()
        );
        assert!(s.validate(&doc(json!({"id": 1, "price": 1000}))).is_ok());
    }

    #[test]
    fn rejects_bounds_types_and_extra_fields() {
        let s = price_schema();
        assert!(s.validate(&doc(json!({"id": 1}))).is_err());
        assert!(s.validate(&doc(json!({"id": 1, "price": 0.09}))).is_err());
        assert!(s.validate(&doc(json!({"id": 1, "price": 1000.5}))).is_err());
        assert!(s.validate(&doc(json!({"id": 1, "price": "9"}))).is_err());
        assert!(s.validate(&doc(json!({"id": 1, "price": 5, "tags": [1]}))).is_err());
        assert!(s.validate(&doc(json!({"id": 1, "price": 5, "at": "yesterday"}))).is_err());

        let err = s
            .validate(&doc(json!({"id": 1, "price": 5, "color": "red"})))
            .unwrap_err();
        assert!(err.contains("color"));

        assert!(
            Schema::permissive()
                .validate(&doc(json!({"anything": true})))
                .is_ok()
        );
    }

    #[test]
    fn index_names_follow_convention() {
        assert_eq!(IndexModel::unique("name").name, "name_1");
        assert!(IndexModel::unique("name").unique);
        assert_eq!(IndexModel::text("name").name, "name_text");
        assert_eq!(IndexModel::text("name").kind, IndexKind::Text);
    }
}
