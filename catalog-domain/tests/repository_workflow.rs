use async_trait::async_trait;
use catalog_domain::error::DomainError;
use catalog_domain::persist::{
    CollectionSpec, Document, DocumentRepository, DocumentStore, FieldRule, FieldType, Filter,
    Filters, FindOptions, InMemoryDocumentStore, IndexModel, Repository, Schema, StoreError,
    provision,
};
use catalog_macros::entity;
use serde_json::Value;
use std::time::Duration;

#[entity(id = String)]
struct Product {
    name: String,
    price: f64,
}

fn product(name: &str, price: f64) -> Product {
    Product {
        id: String::new(),
        version: 1,
        name: name.to_string(),
        price,
    }
}

fn products_spec() -> CollectionSpec {
    CollectionSpec::builder()
        .name("products")
        .schema(
            Schema::strict()
                .required(["id", "name", "price", "version"])
                .property("id", FieldRule::new(FieldType::String))
                .property("name", FieldRule::new(FieldType::String))
                .property(
                    "price",
                    FieldRule::new(FieldType::Number)
                        .minimum(0.1)
                        .maximum(1000.0),
                )
                .property("version", FieldRule::new(FieldType::Integer).minimum(1.0)),
        )
        .indexes(vec![IndexModel::unique("name"), IndexModel::text("name")])
        .build()
}

async fn setup() -> (InMemoryDocumentStore, DocumentRepository<InMemoryDocumentStore, Product>) {
    let store = InMemoryDocumentStore::new();
    provision(&store, &products_spec(), Duration::from_secs(1))
        .await
        .unwrap();
    let repo = DocumentRepository::new(store.clone(), "products");
    (store, repo)
}

#[tokio::test]
async fn concurrent_writers_one_wins() {
    let (_store, repo) = setup().await;
    let id = repo.create(&product("Pen", 2.0)).await.unwrap();

    let a = repo.get_by_id(&id).await.unwrap();
    let b = repo.get_by_id(&id).await.unwrap();

    let mut a = a;
    a.price = 3.0;
    let saved = repo.update(a).await.unwrap();
    assert_eq!(saved.version, 2);

    let mut b = b;
    b.price = 9.0;
    let err = repo.update(b).await.unwrap_err();
    assert!(matches!(err, DomainError::EditConflict { expected: 1, .. }));

    let stored = repo.get_by_id(&id).await.unwrap();
    assert_eq!(stored.price, 3.0);
    assert_eq!(stored.version, 2);
}

#[tokio::test]
async fn update_after_delete_is_edit_conflict() {
    let (_store, repo) = setup().await;
    let id = repo.create(&product("Pen", 2.0)).await.unwrap();
    let loaded = repo.get_by_id(&id).await.unwrap();

    repo.delete(&id).await.unwrap();
    assert!(repo.get_by_id(&id).await.unwrap_err().is_not_found());
    assert!(repo.update(loaded).await.unwrap_err().is_edit_conflict());
}

#[tokio::test]
async fn schema_violations_surface_as_store_errors() {
    let (_store, repo) = setup().await;
    let err = repo.create(&product("Gold", 1000.5)).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Store {
            source: StoreError::SchemaViolation { .. }
        }
    ));

    repo.create(&product("Pen", 2.0)).await.unwrap();
    let err = repo.create(&product("Pen", 3.0)).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Store {
            source: StoreError::DuplicateKey { .. }
        }
    ));
}

#[tokio::test]
async fn pagination_metadata_and_past_last_page() {
    let (_store, repo) = setup().await;
    for i in 0..45 {
        repo.create(&product(&format!("item-{i:02}"), 1.0 + i as f64))
            .await
            .unwrap();
    }

    let page = repo
        .get_all(Filter::new(), &Filters::new(3, 20, "price"))
        .await
        .unwrap();
    assert_eq!(page.len(), 5);
    assert_eq!(page.metadata.total_records, 45);
    assert_eq!(page.metadata.last_page, 3);
    assert_eq!(page.metadata.current_page, 3);
    assert_eq!(page.items[0].price, 41.0);

    let beyond = repo
        .get_all(Filter::new(), &Filters::new(4, 20, "price"))
        .await
        .unwrap();
    assert!(beyond.is_empty());
    assert_eq!(beyond.metadata.last_page, 3);

    let capped = repo
        .get_all(Filter::new(), &Filters::new(1, 500, "-price"))
        .await
        .unwrap();
    assert_eq!(capped.len(), 45);
    assert_eq!(capped.metadata.page_size, 100);
    assert_eq!(capped.items[0].price, 45.0);
}

#[tokio::test]
async fn empty_result_has_zeroed_metadata() {
    let (_store, repo) = setup().await;
    repo.create(&product("Pen", 2.0)).await.unwrap();

    let page = repo
        .get_all(Filter::new().gte("price", 500.0), &Filters::default())
        .await
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.metadata, Default::default());
}

#[tokio::test]
async fn text_and_range_filters_combine() {
    let (_store, repo) = setup().await;
    for (name, price) in [("Red Pen", 2.0), ("Blue Pen", 5.0), ("Pencil", 1.0)] {
        repo.create(&product(name, price)).await.unwrap();
    }

    let page = repo
        .get_all(
            Filter::new().text("pen").gte("price", 3.0).lte("price", 10.0),
            &Filters::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page.items[0].name, "Blue Pen");
}

#[tokio::test]
async fn provisioning_twice_keeps_data_and_indexes() {
    let (store, repo) = setup().await;
    repo.create(&product("Pen", 2.0)).await.unwrap();

    provision(&store, &products_spec(), Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(store.len("products"), 1);
    assert_eq!(store.index_names("products"), vec!["name_1", "name_text"]);
}

/// 在读取操作上人为注入延迟的存储
struct SlowStore {
    inner: InMemoryDocumentStore,
    delay: Duration,
}

#[async_trait]
impl DocumentStore for SlowStore {
    async fn create_collection(&self, name: &str, schema: Schema) -> Result<(), StoreError> {
        self.inner.create_collection(name, schema).await
    }

    async fn create_indexes(
        &self,
        collection: &str,
        indexes: &[IndexModel],
    ) -> Result<(), StoreError> {
        self.inner.create_indexes(collection, indexes).await
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<Value, StoreError> {
        self.inner.insert_one(collection, document).await
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.find_one(collection, filter).await
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.find(collection, filter, options).await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.inner.count(collection, filter).await
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        replacement: Document,
    ) -> Result<u64, StoreError> {
        self.inner.replace_one(collection, filter, replacement).await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.inner.delete_one(collection, filter).await
    }
}

#[tokio::test]
async fn slow_store_times_out() {
    let inner = InMemoryDocumentStore::new();
    provision(&inner, &products_spec(), Duration::from_secs(1))
        .await
        .unwrap();

    let repo: DocumentRepository<_, Product> = DocumentRepository::new(
        SlowStore {
            inner,
            delay: Duration::from_millis(200),
        },
        "products",
    )
    .with_timeout(Duration::from_millis(20));

    let id = repo.create(&product("Pen", 2.0)).await.unwrap();
    let err = repo.get_by_id(&id).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Store {
            source: StoreError::Timeout {
                operation: "find_one",
                ..
            }
        }
    ));
}
