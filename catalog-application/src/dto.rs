use crate::model::Item;
use catalog_domain::persist::Page;
use serde::Serialize;

/// 数据传输对象（DTO）
///
/// 作为应用层的输出载体，面向接口/外部系统序列化友好。
pub trait Dto: Serialize + Send + Sync + 'static {}

impl Dto for Item {}

impl Dto for Page<Item> {}
