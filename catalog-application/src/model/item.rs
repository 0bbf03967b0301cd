use crate::patch::ItemPatch;
use catalog_domain::error::DomainResult;
use catalog_domain::validation::{Validator, between};
use catalog_macros::{entity, entity_id};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const MIN_PRICE: f64 = 0.1;
pub const MAX_PRICE: f64 = 1000.0;

/// 商品列表允许的排序键
pub const ITEM_SORT_SAFELIST: [&str; 6] = ["id", "name", "price", "-id", "-name", "-price"];

#[entity_id]
pub struct ItemId(Uuid);

/// 商品
///
/// 标识由存储分配；`created_at` 只在创建时设置，`updated_at` 在每次成功更新时刷新。
#[entity(id = ItemId)]
#[derive(PartialEq)]
pub struct Item {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// 创建未入库的商品（版本 1，标识待分配）
    pub fn create(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let item = Self {
            id: ItemId::default(),
            version: 1,
            name: name.into(),
            description: description.into(),
            price,
            created_at: now,
            updated_at: now,
        };
        item.validate()?;
        Ok(item)
    }

    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        self.check(&mut v);
        v.finish()
    }

    pub fn check(&self, v: &mut Validator) {
        v.check(!self.name.is_empty(), "name", "must be provided");
        v.check(
            !self.description.is_empty(),
            "description",
            "must be provided",
        );
        v.check(
            between(self.price, MIN_PRICE, MAX_PRICE),
            "price",
            "must be greater or equal to 0.1 and lower or equal to 1000",
        );
    }

    /// 覆盖补丁中提供的字段并刷新 `updated_at`；版本由仓储维护
    pub fn apply(&mut self, patch: ItemPatch, now: DateTime<Utc>) {
        patch.name.apply_to(&mut self.name);
        patch.description.apply_to(&mut self.description);
        patch.price.apply_to(&mut self.price);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::Patch;
    use catalog_domain::entity::{Entity, Identifier};
    use catalog_domain::error::DomainError;

    fn errors_of(result: DomainResult<Item>) -> Vec<String> {
        match result {
            Err(DomainError::Validation { errors }) => {
                errors.iter().map(|(k, _)| k.to_string()).collect()
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_sets_version_and_timestamps() {
        let now = Utc::now();
        let item = Item::create("Pen", "Blue ink", 2.5, now).unwrap();
        assert_eq!(item.version(), 1);
        assert_eq!(item.created_at, now);
        assert_eq!(item.updated_at, now);
        assert!(item.id().is_unassigned());
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let now = Utc::now();
        assert!(Item::create("a", "b", 0.1, now).is_ok());
        assert!(Item::create("a", "b", 1000.0, now).is_ok());
        assert_eq!(errors_of(Item::create("a", "b", 0.09999, now)), vec!["price"]);
        assert_eq!(errors_of(Item::create("a", "b", 1000.01, now)), vec!["price"]);
    }

    #[test]
    fn empty_strings_are_rejected_together() {
        let errs = errors_of(Item::create("", "", 5.0, Utc::now()));
        assert_eq!(errs, vec!["description", "name"]);
    }

    #[test]
    fn apply_only_touches_supplied_fields() {
        let created = Utc::now();
        let mut item = Item::create("Pen", "Blue ink", 2.5, created).unwrap();
        let later = created + chrono::Duration::seconds(5);

        item.apply(
            ItemPatch {
                price: Patch::Set(3.0),
                ..Default::default()
            },
            later,
        );

        assert_eq!(item.name, "Pen");
        assert_eq!(item.description, "Blue ink");
        assert_eq!(item.price, 3.0);
        assert_eq!(item.created_at, created);
        assert_eq!(item.updated_at, later);
        assert_eq!(item.version, 1);
    }
}
