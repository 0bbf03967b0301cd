use catalog_domain::entity::Identifier;
use catalog_macros::entity_id;
use std::str::FromStr;
use uuid::Uuid;

#[entity_id]
struct UserId(Uuid);

#[entity_id(debug = false)]
struct ProfileId(Uuid);

impl std::fmt::Debug for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProfileId(..)")
    }
}

fn main() {
    let raw = Uuid::new_v4();
    let id = UserId::new(raw);
    let _ = format!("{:?}", id);

    assert_eq!(id.to_string(), raw.to_string());
    assert_eq!(UserId::from_str(&raw.to_string()).unwrap(), id);
    assert_eq!(id.as_ref(), &raw);
    assert_eq!(UserId::from(raw), id);
    assert!(!id.is_unassigned());
    assert!(UserId::default().is_unassigned());
    assert_eq!(id.clone().into_inner(), raw);

    let pid = ProfileId::new(Uuid::new_v4());
    assert_eq!(format!("{:?}", pid), "ProfileId(..)");
}
