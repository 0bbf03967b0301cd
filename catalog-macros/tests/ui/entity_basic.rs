use catalog_domain::entity::{Entity, Identifier};
use catalog_macros::{entity, entity_id};
use uuid::Uuid;

#[entity_id]
struct ProductId(Uuid);

#[entity(id = ProductId)]
struct Product {
    name: String,
    price: f64,
}

fn main() {
    let p = Product {
        id: ProductId::new(Uuid::new_v4()),
        version: 1,
        name: "pen".into(),
        price: 2.5,
    };

    assert_eq!(p.version(), 1);
    assert!(!p.id().is_unassigned());

    let id = p.id().clone();
    let bumped = p.clone().with_version(2);
    assert_eq!(bumped.version(), 2);
    assert_eq!(bumped.id(), &id);
    assert_eq!(bumped.name, "pen");

    let json = serde_json::to_value(&bumped).unwrap();
    assert_eq!(json["version"], 2);
    assert_eq!(json["id"], id.to_string());

    let back: Product = serde_json::from_value(json).unwrap();
    assert_eq!(back.price, 2.5);
    let _ = format!("{:?}", back);
}
