use catalog_domain::entity::Entity;
use catalog_macros::entity;

// 默认 id 类型为 String；已声明的 id/version 字段会被替换到最前
#[entity]
pub struct Tag {
    label: String,
    version: u8,
}

#[entity(id = i64, debug = false)]
struct Secret {
    value: String,
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret(..)")
    }
}

fn main() {
    let t = Tag {
        id: "t-1".to_string(),
        version: 3,
        label: "x".into(),
    };
    let v: i64 = t.version();
    assert_eq!(v, 3);
    assert_eq!(t.label, "x");

    let s = Secret {
        id: 9,
        version: 1,
        value: "hidden".into(),
    };
    assert_eq!(format!("{:?}", s), "Secret(..)");
    assert_eq!(*s.id(), 9);
}
