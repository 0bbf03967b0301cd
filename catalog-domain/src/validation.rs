//! 字段校验
//!
//! 以“字段名 -> 错误信息”的映射收集校验结果，同一字段只保留第一条信息。
//!
use crate::error::{DomainError, DomainResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// 按字段收集的校验错误
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// 校验器
///
/// ```
/// use catalog_domain::validation::Validator;
///
/// let mut v = Validator::new();
/// v.check(false, "name", "must be provided");
/// v.check(false, "name", "ignored");
/// assert_eq!(v.errors().get("name"), Some("must be provided"));
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条错误（字段已存在错误时忽略）
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .0
            .entry(field.into())
            .or_insert_with(|| message.into());
    }

    /// `ok` 为假时记录错误
    pub fn check(&mut self, ok: bool, field: impl Into<String>, message: impl Into<String>) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// 结束校验：存在错误时返回 `DomainError::Validation`
    pub fn finish(self) -> DomainResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation {
                errors: self.errors,
            })
        }
    }
}

/// 闭区间判断
pub fn between(value: f64, min: f64, max: f64) -> bool {
    value >= min && value <= max
}

pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.iter().any(|p| p == value)
}
