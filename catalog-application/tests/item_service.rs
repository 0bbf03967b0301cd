use catalog_application::collections::{ITEMS, provision_all};
use catalog_application::command_handler::CommandHandler;
use catalog_application::context::AppContext;
use catalog_application::error::AppError;
use catalog_application::item_service::{
    CreateItem, DeleteItem, GetItem, ItemService, ListItems, UpdateItem,
};
use catalog_application::model::{Item, ItemId};
use catalog_application::patch::{ItemPatch, Patch};
use catalog_application::query_handler::QueryHandler;
use catalog_domain::persist::{DocumentRepository, Filters, InMemoryDocumentStore};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

type Repo = Arc<DocumentRepository<InMemoryDocumentStore, Item>>;

async fn service() -> ItemService<Repo> {
    let store = InMemoryDocumentStore::new();
    provision_all(&store, Duration::from_secs(1)).await.unwrap();
    ItemService::new(Arc::new(DocumentRepository::new(store, ITEMS)))
}

async fn create(svc: &ItemService<Repo>, name: &str, price: f64) -> ItemId {
    CommandHandler::handle(
        svc,
        &AppContext::default(),
        CreateItem {
            name: name.to_string(),
            description: format!("{name} description"),
            price,
        },
    )
    .await
    .unwrap()
}

async fn get(svc: &ItemService<Repo>, id: &ItemId) -> Result<Item, AppError> {
    QueryHandler::handle(svc, &AppContext::default(), GetItem { id: id.clone() }).await
}

async fn list(svc: &ItemService<Repo>, q: ListItems) -> Result<Vec<String>, AppError> {
    let page = QueryHandler::handle(svc, &AppContext::default(), q).await?;
    Ok(page.items.into_iter().map(|i| i.name).collect())
}

#[tokio::test]
async fn create_then_get() {
    let svc = service().await;
    let id = create(&svc, "Pen", 2.5).await;

    let item = get(&svc, &id).await.unwrap();
    assert_eq!(item.id, id);
    assert_eq!(item.version, 1);
    assert_eq!(item.created_at, item.updated_at);
}

#[tokio::test]
async fn create_rejects_invalid_input_before_storing() {
    let svc = service().await;
    let err = CommandHandler::handle(
        &svc,
        &AppContext::default(),
        CreateItem {
            name: String::new(),
            description: "x".into(),
            price: 1000.01,
        },
    )
    .await
    .unwrap_err();

    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.get("name"), Some("must be provided"));
    assert!(errors.contains("price"));
    assert!(!errors.contains("description"));
}

#[tokio::test]
async fn duplicate_name_is_an_internal_store_failure() {
    let svc = service().await;
    create(&svc, "Pen", 2.5).await;

    let err = CommandHandler::handle(
        &svc,
        &AppContext::default(),
        CreateItem {
            name: "Pen".into(),
            description: "another".into(),
            price: 3.0,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));
}

#[tokio::test]
async fn partial_update_changes_only_price() {
    let svc = service().await;
    let id = create(&svc, "Pen", 2.5).await;
    let before = get(&svc, &id).await.unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    let updated = CommandHandler::handle(
        &svc,
        &AppContext::builder().correlation_id("c-1").build(),
        UpdateItem {
            id: id.clone(),
            patch: ItemPatch {
                price: Patch::Set(4.0),
                ..Default::default()
            },
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.version, before.version + 1);
    assert_eq!(updated.price, 4.0);
    assert_eq!(updated.name, before.name);
    assert_eq!(updated.description, before.description);
    assert_eq!(updated.created_at, before.created_at);
    assert!(updated.updated_at > before.updated_at);

    assert_eq!(get(&svc, &id).await.unwrap(), updated);
}

#[tokio::test]
async fn invalid_patch_is_rejected_and_nothing_changes() {
    let svc = service().await;
    let id = create(&svc, "Pen", 2.5).await;

    let err = CommandHandler::handle(
        &svc,
        &AppContext::default(),
        UpdateItem {
            id: id.clone(),
            patch: ItemPatch {
                name: Patch::Set(String::new()),
                ..Default::default()
            },
        },
    )
    .await
    .unwrap_err();
    assert!(err.validation_errors().is_some());

    let stored = get(&svc, &id).await.unwrap();
    assert_eq!(stored.name, "Pen");
    assert_eq!(stored.version, 1);
}

#[tokio::test]
async fn delete_and_unknown_ids_are_not_found() {
    let svc = service().await;
    let id = create(&svc, "Pen", 2.5).await;

    CommandHandler::handle(&svc, &AppContext::default(), DeleteItem { id: id.clone() })
        .await
        .unwrap();
    assert!(get(&svc, &id).await.unwrap_err().is_not_found());

    let unknown = ItemId::new(Uuid::now_v7());
    let err = CommandHandler::handle(&svc, &AppContext::default(), DeleteItem { id: unknown })
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = CommandHandler::handle(
        &svc,
        &AppContext::default(),
        UpdateItem {
            id,
            patch: ItemPatch::default(),
        },
    )
    .await
    .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn list_filters_by_name_and_price() {
    let svc = service().await;
    create(&svc, "Red Pen", 2.0).await;
    create(&svc, "Blue Pen", 5.0).await;
    create(&svc, "Notebook", 7.5).await;

    let names = list(
        &svc,
        ListItems::builder()
            .name("pen")
            .filters(Filters::new(1, 20, "-price"))
            .build(),
    )
    .await
    .unwrap();
    assert_eq!(names, vec!["Blue Pen", "Red Pen"]);

    let names = list(
        &svc,
        ListItems::builder()
            .min_price(3.0)
            .max_price(8.0)
            .filters(Filters::new(1, 20, "name"))
            .build(),
    )
    .await
    .unwrap();
    assert_eq!(names, vec!["Blue Pen", "Notebook"]);

    let names = list(&svc, ListItems::builder().name("   ").build())
        .await
        .unwrap();
    assert_eq!(names.len(), 3);
}

#[tokio::test]
async fn list_validation_reports_every_bad_field() {
    let svc = service().await;

    let err = list(
        &svc,
        ListItems::builder()
            .min_price(5.0)
            .max_price(2.0)
            .filters(Filters::new(0, 101, "_id"))
            .build(),
    )
    .await
    .unwrap_err();

    let errors = err.validation_errors().unwrap();
    assert_eq!(
        errors.get("max_price"),
        Some("must be greater or equal to specified min_price")
    );
    assert!(errors.contains("page"));
    assert!(errors.contains("page_size"));
    assert_eq!(errors.get("sort"), Some("invalid sort value"));

    let err = list(&svc, ListItems::builder().min_price(0.05).build())
        .await
        .unwrap_err();
    assert!(err.validation_errors().unwrap().contains("min_price"));
}

#[tokio::test]
async fn list_pages_report_metadata() {
    let svc = service().await;
    for i in 0..5 {
        create(&svc, &format!("item {i}"), 1.0 + i as f64).await;
    }

    let page = QueryHandler::handle(
        &svc,
        &AppContext::default(),
        ListItems::builder()
            .filters(Filters::new(2, 2, "price"))
            .build(),
    )
    .await
    .unwrap();

    assert_eq!(page.metadata.total_records, 5);
    assert_eq!(page.metadata.last_page, 3);
    assert_eq!(page.metadata.current_page, 2);
    let prices: Vec<f64> = page.items.iter().map(|i| i.price).collect();
    assert_eq!(prices, vec![3.0, 4.0]);
}
