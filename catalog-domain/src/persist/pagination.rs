//! 分页请求与分页元数据
//!
use crate::persist::{FindOptions, Sort};
use crate::validation::{Validator, permitted_value};
use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;

/// 分页请求：页码、每页数量与排序键
///
/// 排序键必须出现在安全列表中，前缀 `-` 表示降序。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: Vec<String>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: "id".to_string(),
            sort_safelist: vec!["id".to_string()],
        }
    }
}

impl Filters {
    pub fn new(page: i64, page_size: i64, sort: impl Into<String>) -> Self {
        Self {
            page,
            page_size,
            sort: sort.into(),
            ..Self::default()
        }
    }

    pub fn with_safelist<I, S>(mut self, safelist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort_safelist = safelist.into_iter().map(Into::into).collect();
        self
    }

    /// 将校验错误写入校验器
    pub fn validate(&self, v: &mut Validator) {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(
            self.page <= MAX_PAGE,
            "page",
            "must be a maximum of 10 million",
        );
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(
            self.page_size <= MAX_PAGE_SIZE,
            "page_size",
            "must be a maximum of 100",
        );
        v.check(
            permitted_value(&self.sort, &self.sort_safelist),
            "sort",
            "invalid sort value",
        );
    }

    /// 实际生效的每页数量（上限 100）
    pub fn limit(&self) -> i64 {
        self.page_size.min(MAX_PAGE_SIZE)
    }

    /// 越界页码饱和到 `i64::MAX`，对应一个空页
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit())
    }

    pub fn sort(&self) -> Sort {
        Sort::parse(&self.sort)
    }

    pub(crate) fn find_options(&self) -> FindOptions {
        FindOptions {
            sort: self.sort(),
            skip: self.offset().max(0) as u64,
            limit: Some(self.limit().max(0) as u64),
        }
    }
}

/// 分页元数据；结果为空时所有字段为零
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl Metadata {
    pub fn calculate(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records <= 0 || page_size <= 0 {
            return Self::default();
        }

        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }
}

/// 一页结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<E> {
    pub items: Vec<E>,
    pub metadata: Metadata,
}

impl<E> Page<E> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            metadata: Metadata::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::SortDirection;

    #[test]
    fn metadata_rounds_last_page_up() {
        let m = Metadata::calculate(45, 2, 20);
        assert_eq!(m.last_page, 3);
        assert_eq!(m.first_page, 1);
        assert_eq!(m.current_page, 2);
        assert_eq!(m.total_records, 45);

        assert_eq!(Metadata::calculate(40, 1, 20).last_page, 2);
        assert_eq!(Metadata::calculate(0, 3, 20), Metadata::default());
    }

    #[test]
    fn offset_and_sort() {
        let f = Filters::new(3, 10, "-price");
        assert_eq!(f.offset(), 20);
        assert_eq!(Filters::new(i64::MAX, 10, "id").offset(), i64::MAX);
        assert_eq!(f.limit(), 10);
        assert_eq!(f.sort().field, "price");
        assert_eq!(f.sort().direction, SortDirection::Descending);

        assert_eq!(Filters::new(1, 500, "id").limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn validate_reports_each_field() {
        let f = Filters::new(0, 101, "_id").with_safelist(["id", "-id"]);
        let mut v = Validator::new();
        f.validate(&mut v);

        let errors = v.errors();
        assert_eq!(errors.get("page"), Some("must be greater than zero"));
        assert_eq!(errors.get("page_size"), Some("must be a maximum of 100"));
        assert_eq!(errors.get("sort"), Some("invalid sort value"));
    }

    #[test]
    fn defaults_are_valid() {
        let mut v = Validator::new();
        Filters::default().validate(&mut v);
        assert!(v.is_valid());
    }
}
