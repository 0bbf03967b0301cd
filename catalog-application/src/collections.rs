//! 目录服务的集合声明
//!
//! `items` 与 `users` 两个集合在启动时初始化，均使用严格结构校验（禁止额外字段）。
//!
use crate::model::{MAX_PRICE, MIN_PRICE};
use catalog_domain::error::DomainResult;
use catalog_domain::persist::{
    CollectionSpec, DocumentStore, FieldRule, FieldType, IndexModel, Schema, provision,
};
use std::time::Duration;

pub const ITEMS: &str = "items";
pub const USERS: &str = "users";

pub fn items_collection() -> CollectionSpec {
    let schema = Schema::strict()
        .required([
            "id",
            "name",
            "description",
            "price",
            "version",
            "created_at",
            "updated_at",
        ])
        .property(
            "id",
            FieldRule::new(FieldType::String).description("Item identifier"),
        )
        .property(
            "name",
            FieldRule::new(FieldType::String).description("must be a string and is required"),
        )
        .property(
            "description",
            FieldRule::new(FieldType::String).description("must be a string and is required"),
        )
        .property(
            "price",
            FieldRule::new(FieldType::Number)
                .minimum(MIN_PRICE)
                .maximum(MAX_PRICE)
                .description("must be a number between 0.1 and 1000 and is required"),
        )
        .property(
            "version",
            FieldRule::new(FieldType::Integer)
                .minimum(1.0)
                .description("Document version"),
        )
        .property(
            "created_at",
            FieldRule::new(FieldType::DateTime).description("must be a date and is required"),
        )
        .property(
            "updated_at",
            FieldRule::new(FieldType::DateTime).description("must be a date and is required"),
        );

    CollectionSpec::builder()
        .name(ITEMS)
        .schema(schema)
        .indexes(vec![
            IndexModel::unique("name"),
            IndexModel::unique("description"),
            IndexModel::text("name"),
        ])
        .build()
}

pub fn users_collection() -> CollectionSpec {
    let schema = Schema::strict()
        .required(["id", "name", "permissions", "version"])
        .property(
            "id",
            FieldRule::new(FieldType::Integer).description("User identifier"),
        )
        .property(
            "name",
            FieldRule::new(FieldType::String).description("must be a string and is required"),
        )
        .property(
            "permissions",
            FieldRule::new(FieldType::array_of(FieldType::String))
                .description("must be an array of strings and is required"),
        )
        .property(
            "version",
            FieldRule::new(FieldType::Integer)
                .minimum(1.0)
                .description("Document version"),
        );

    CollectionSpec::builder()
        .name(USERS)
        .schema(schema)
        .build()
}

/// 依次初始化 `items` 与 `users`
pub async fn provision_all<S>(store: &S, timeout: Duration) -> DomainResult<()>
where
    S: DocumentStore + ?Sized,
{
    for spec in [items_collection(), users_collection()] {
        provision(store, &spec, timeout).await?;
    }
    Ok(())
}
