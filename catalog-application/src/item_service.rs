//! 商品用例（命令与查询）
//!
//! 校验在任何存储交互之前完成；更新依赖仓储的条件写入检测并发冲突，从不重试。
//!
use crate::command::Command;
use crate::command_handler::CommandHandler;
use crate::context::AppContext;
use crate::error::AppError;
use crate::model::{ITEM_SORT_SAFELIST, Item, ItemId, MAX_PRICE, MIN_PRICE};
use crate::patch::ItemPatch;
use crate::query::Query;
use crate::query_handler::QueryHandler;
use async_trait::async_trait;
use bon::Builder;
use catalog_domain::persist::{Filter, Filters, Page, Repository};
use catalog_domain::validation::{Validator, between};
use chrono::Utc;

#[derive(Debug, Clone)]
pub struct CreateItem {
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl Command for CreateItem {
    const NAME: &'static str = "CreateItem";
    type Output = ItemId;
}

#[derive(Debug, Clone)]
pub struct UpdateItem {
    pub id: ItemId,
    pub patch: ItemPatch,
}

impl Command for UpdateItem {
    const NAME: &'static str = "UpdateItem";
    type Output = Item;
}

#[derive(Debug, Clone)]
pub struct DeleteItem {
    pub id: ItemId,
}

impl Command for DeleteItem {
    const NAME: &'static str = "DeleteItem";
    type Output = ();
}

#[derive(Debug, Clone)]
pub struct GetItem {
    pub id: ItemId,
}

impl Query for GetItem {
    const NAME: &'static str = "GetItem";
    type Dto = Item;
}

/// 商品列表查询：名称全文检索、价格区间与分页排序
#[derive(Debug, Clone, Default, Builder)]
pub struct ListItems {
    #[builder(into)]
    pub name: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    #[builder(default)]
    pub filters: Filters,
}

impl Query for ListItems {
    const NAME: &'static str = "ListItems";
    type Dto = Page<Item>;
}

impl ListItems {
    fn validate(&self, filters: &Filters) -> Result<(), AppError> {
        let mut v = Validator::new();
        let range_msg = "must be greater or equal to 0.1 and lower or equal to 1000";

        if let Some(min) = self.min_price {
            v.check(between(min, MIN_PRICE, MAX_PRICE), "min_price", range_msg);
        }
        if let Some(max) = self.max_price {
            v.check(between(max, MIN_PRICE, MAX_PRICE), "max_price", range_msg);
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            v.check(
                max >= min,
                "max_price",
                "must be greater or equal to specified min_price",
            );
        }
        filters.validate(&mut v);

        Ok(v.finish()?)
    }

    fn to_filter(&self) -> Filter {
        let mut filter = Filter::new();
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            filter = filter.text(name);
        }
        if let Some(min) = self.min_price {
            filter = filter.gte("price", min);
        }
        if let Some(max) = self.max_price {
            filter = filter.lte("price", max);
        }
        filter
    }
}

/// 商品服务：实现商品的命令与查询处理器
pub struct ItemService<R> {
    items: R,
}

impl<R> ItemService<R>
where
    R: Repository<Item>,
{
    pub fn new(items: R) -> Self {
        Self { items }
    }
}

#[async_trait]
impl<R> CommandHandler<CreateItem> for ItemService<R>
where
    R: Repository<Item>,
{
    async fn handle(&self, ctx: &AppContext, cmd: CreateItem) -> Result<ItemId, AppError> {
        let item = Item::create(cmd.name, cmd.description, cmd.price, Utc::now())?;
        let id = self.items.create(&item).await?;

        tracing::info!(
            command = CreateItem::NAME,
            correlation_id = ctx.correlation_id(),
            item_id = %id,
            "item created"
        );
        Ok(id)
    }
}

#[async_trait]
impl<R> CommandHandler<UpdateItem> for ItemService<R>
where
    R: Repository<Item>,
{
    async fn handle(&self, ctx: &AppContext, cmd: UpdateItem) -> Result<Item, AppError> {
        let mut item = self.items.get_by_id(&cmd.id).await?;
        item.apply(cmd.patch, Utc::now());
        item.validate()?;

        let updated = self.items.update(item).await.inspect_err(|e| {
            tracing::debug!(
                command = UpdateItem::NAME,
                correlation_id = ctx.correlation_id(),
                item_id = %cmd.id,
                error = %e,
                "item update rejected"
            );
        })?;

        tracing::info!(
            command = UpdateItem::NAME,
            correlation_id = ctx.correlation_id(),
            item_id = %updated.id,
            version = updated.version,
            "item updated"
        );
        Ok(updated)
    }
}

#[async_trait]
impl<R> CommandHandler<DeleteItem> for ItemService<R>
where
    R: Repository<Item>,
{
    async fn handle(&self, ctx: &AppContext, cmd: DeleteItem) -> Result<(), AppError> {
        self.items.delete(&cmd.id).await?;

        tracing::info!(
            command = DeleteItem::NAME,
            correlation_id = ctx.correlation_id(),
            item_id = %cmd.id,
            "item deleted"
        );
        Ok(())
    }
}

#[async_trait]
impl<R> QueryHandler<GetItem> for ItemService<R>
where
    R: Repository<Item>,
{
    async fn handle(&self, _ctx: &AppContext, q: GetItem) -> Result<Item, AppError> {
        Ok(self.items.get_by_id(&q.id).await?)
    }
}

#[async_trait]
impl<R> QueryHandler<ListItems> for ItemService<R>
where
    R: Repository<Item>,
{
    async fn handle(&self, _ctx: &AppContext, q: ListItems) -> Result<Page<Item>, AppError> {
        let filters = q.filters.clone().with_safelist(ITEM_SORT_SAFELIST);
        q.validate(&filters)?;

        Ok(self.items.get_all(q.to_filter(), &filters).await?)
    }
}
