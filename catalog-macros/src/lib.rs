use proc_macro::TokenStream;

mod args;
mod derives;
mod entity;
mod entity_id;

/// 实体宏
/// - 追加字段：`id: IdType`, `version: i64`，置于字段最前
/// - 自动实现 `::catalog_domain::entity::Entity`
/// - 参数：`#[entity(id = IdType, debug = true|false)]`
#[proc_macro_attribute]
pub fn entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity::expand(attr, item)
}

/// 实体 ID 宏
/// 用于 `struct ItemId(Uuid);` 形式的标识类型，实现 `Identifier` 及常用转换
#[proc_macro_attribute]
pub fn entity_id(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity_id::expand(attr, item)
}
