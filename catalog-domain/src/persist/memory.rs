//! 进程内文档存储
//!
//! 基于 `DashMap` 的 `DocumentStore` 实现，执行结构校验、唯一索引与文本索引语义，
//! 用于测试与本地开发。所有操作在同一临界区内完成，不跨越 await 持有锁。
//!
use crate::persist::{
    Document, DocumentStore, Filter, FindOptions, ID_FIELD, IndexKind, IndexModel, Predicate,
    Schema, SortDirection, StoreError,
};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Collection {
    schema: Schema,
    indexes: Vec<IndexModel>,
    documents: BTreeMap<String, Document>,
}

impl Collection {
    fn new(schema: Schema) -> Self {
        Self {
            schema,
            indexes: Vec::new(),
            documents: BTreeMap::new(),
        }
    }

    fn text_fields(&self) -> Vec<&str> {
        self.indexes
            .iter()
            .filter(|i| i.kind == IndexKind::Text)
            .map(|i| i.field.as_str())
            .collect()
    }

    fn matches(&self, name: &str, filter: &Filter, document: &Document) -> Result<bool, StoreError> {
        for predicate in filter.predicates() {
            let ok = match predicate {
                Predicate::Eq { field, value } => document
                    .get(field)
                    .is_some_and(|v| values_equal(v, value)),
                Predicate::Gte { field, value } => document
                    .get(field)
                    .and_then(Value::as_f64)
                    .is_some_and(|n| n >= *value),
                Predicate::Lte { field, value } => document
                    .get(field)
                    .and_then(Value::as_f64)
                    .is_some_and(|n| n <= *value),
                Predicate::Text { search } => {
                    let fields = self.text_fields();
                    if fields.is_empty() {
                        return Err(StoreError::TextIndexRequired {
                            collection: name.to_string(),
                        });
                    }
                    text_matches(search, &fields, document)
                }
            };
            if !ok {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn first_match(&self, name: &str, filter: &Filter) -> Result<Option<String>, StoreError> {
        // 以 id 开头的过滤条件直接按主键定位
        if let Some(Predicate::Eq { field, value }) = filter.predicates().first()
            && field == ID_FIELD
        {
            let key = id_key(value);
            return match self.documents.get(&key) {
                Some(document) if self.matches(name, filter, document)? => Ok(Some(key)),
                _ => Ok(None),
            };
        }

        for (key, document) in &self.documents {
            if self.matches(name, filter, document)? {
                return Ok(Some(key.clone()));
            }
        }
        Ok(None)
    }

    /// 唯一索引检查；`skip` 为正在被替换的文档主键
    fn check_unique(
        &self,
        name: &str,
        document: &Document,
        skip: Option<&str>,
    ) -> Result<(), StoreError> {
        for index in self.indexes.iter().filter(|i| i.unique) {
            let Some(value) = document.get(&index.field) else {
                continue;
            };
            let taken = self
                .documents
                .iter()
                .filter(|(key, _)| Some(key.as_str()) != skip)
                .any(|(_, other)| other.get(&index.field).is_some_and(|v| values_equal(v, value)));
            if taken {
                return Err(StoreError::DuplicateKey {
                    collection: name.to_string(),
                    index: index.name.clone(),
                    value: display_value(value),
                });
            }
        }
        Ok(())
    }

    fn validate(&self, name: &str, document: &Document) -> Result<(), StoreError> {
        self.schema
            .validate(document)
            .map_err(|reason| StoreError::SchemaViolation {
                collection: name.to_string(),
                reason,
            })
    }
}

/// 进程内文档存储（克隆共享同一份数据）
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<DashMap<String, Collection>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    pub fn index_names(&self, collection: &str) -> Vec<String> {
        self.collections
            .get(collection)
            .map(|c| c.indexes.iter().map(|i| i.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|c| c.documents.len())
            .unwrap_or(0)
    }

    fn not_found(name: &str) -> StoreError {
        StoreError::CollectionNotFound {
            collection: name.to_string(),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create_collection(&self, name: &str, schema: Schema) -> Result<(), StoreError> {
        use dashmap::mapref::entry::Entry;

        match self.collections.entry(name.to_string()) {
            Entry::Occupied(_) => Err(StoreError::CollectionExists {
                collection: name.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(Collection::new(schema));
                Ok(())
            }
        }
    }

    async fn create_indexes(
        &self,
        collection: &str,
        indexes: &[IndexModel],
    ) -> Result<(), StoreError> {
        let mut coll = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        for index in indexes {
            if let Some(existing) = coll.indexes.iter().find(|i| i.name == index.name) {
                if existing == index {
                    continue;
                }
                return Err(StoreError::IndexConflict {
                    collection: collection.to_string(),
                    index: index.name.clone(),
                });
            }

            if index.unique {
                let mut seen: Vec<&Value> = Vec::new();
                for document in coll.documents.values() {
                    if let Some(v) = document.get(&index.field) {
                        if seen.iter().any(|s| values_equal(s, v)) {
                            return Err(StoreError::DuplicateKey {
                                collection: collection.to_string(),
                                index: index.name.clone(),
                                value: display_value(v),
                            });
                        }
                        seen.push(v);
                    }
                }
            }

            coll.indexes.push(index.clone());
        }

        Ok(())
    }

    async fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<Value, StoreError> {
        let mut coll = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        let id = match document.get(ID_FIELD) {
            None | Some(Value::Null) => {
                let generated = Value::String(Uuid::now_v7().to_string());
                document.insert(ID_FIELD.to_string(), generated.clone());
                generated
            }
            Some(v) => v.clone(),
        };

        coll.validate(collection, &document)?;

        let key = id_key(&id);
        if coll.documents.contains_key(&key) {
            return Err(StoreError::DuplicateKey {
                collection: collection.to_string(),
                index: ID_FIELD.to_string(),
                value: key,
            });
        }
        coll.check_unique(collection, &document, None)?;

        coll.documents.insert(key, document);
        Ok(id)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let coll = self
            .collections
            .get(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        Ok(coll
            .first_match(collection, filter)?
            .and_then(|key| coll.documents.get(&key).cloned()))
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let coll = self
            .collections
            .get(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        let mut matched = Vec::new();
        for document in coll.documents.values() {
            if coll.matches(collection, filter, document)? {
                matched.push(document);
            }
        }

        let sort = &options.sort;
        matched.sort_by(|a, b| {
            let primary = compare_values(a.get(&sort.field), b.get(&sort.field));
            let primary = match sort.direction {
                SortDirection::Ascending => primary,
                SortDirection::Descending => primary.reverse(),
            };
            primary.then_with(|| compare_values(a.get(ID_FIELD), b.get(ID_FIELD)))
        });

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = options
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let coll = self
            .collections
            .get(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        let mut total = 0;
        for document in coll.documents.values() {
            if coll.matches(collection, filter, document)? {
                total += 1;
            }
        }
        Ok(total)
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        mut replacement: Document,
    ) -> Result<u64, StoreError> {
        let mut coll = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        let Some(key) = coll.first_match(collection, filter)? else {
            return Ok(0);
        };

        let original_id = coll
            .documents
            .get(&key)
            .and_then(|d| d.get(ID_FIELD))
            .cloned()
            .unwrap_or(Value::Null);
        match replacement.get(ID_FIELD) {
            None => {
                replacement.insert(ID_FIELD.to_string(), original_id);
            }
            Some(id) if !values_equal(id, &original_id) => {
                return Err(StoreError::InvalidDocument {
                    reason: "replacement must not change the document id".to_string(),
                });
            }
            Some(_) => {}
        }

        coll.validate(collection, &replacement)?;
        coll.check_unique(collection, &replacement, Some(&key))?;

        coll.documents.insert(key, replacement);
        Ok(1)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut coll = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        match coll.first_match(collection, filter)? {
            Some(key) => {
                coll.documents.remove(&key);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

fn id_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) if a.is_number() && b.is_number() => x == y,
        _ => a == b,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => {
                let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => a.to_string().cmp(&b.to_string()),
        },
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn text_matches(search: &str, fields: &[&str], document: &Document) -> bool {
    let terms: Vec<String> = tokens(search).collect();
    if terms.is_empty() {
        return false;
    }
    fields
        .iter()
        .filter_map(|f| document.get(*f).and_then(Value::as_str))
        .flat_map(tokens)
        .any(|token| terms.contains(&token))
}
