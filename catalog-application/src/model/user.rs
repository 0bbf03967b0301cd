use crate::replica::UserUpdated;
use catalog_macros::entity;
use std::collections::BTreeSet;

/// 用户副本（由身份服务拥有，本服务只保存非权威副本）
///
/// 本地版本不会回退：只接受版本号严格大于已存储版本的事件。
#[entity(id = i64)]
#[derive(PartialEq)]
pub struct User {
    pub name: String,
    pub permissions: BTreeSet<String>,
}

impl User {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// 以事件内容覆盖本地副本（包括版本号）
    pub fn apply(&mut self, event: UserUpdated) {
        self.name = event.name;
        self.permissions = event.permissions.into_iter().collect();
        self.version = event.version;
    }
}

impl From<UserUpdated> for User {
    fn from(event: UserUpdated) -> Self {
        Self {
            id: event.id,
            version: event.version,
            name: event.name,
            permissions: event.permissions.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(version: i64, perms: &[&str]) -> UserUpdated {
        UserUpdated {
            id: 42,
            name: format!("user-v{version}"),
            permissions: perms.iter().map(|p| p.to_string()).collect(),
            version,
        }
    }

    #[test]
    fn from_event_copies_version_and_dedups_permissions() {
        let user = User::from(event(3, &["items:read", "items:read", "items:write"]));
        assert_eq!(user.id, 42);
        assert_eq!(user.version, 3);
        assert_eq!(user.permissions.len(), 2);
        assert!(user.has_permission("items:write"));
    }

    #[test]
    fn apply_replaces_fields() {
        let mut user = User::from(event(3, &["items:read"]));
        user.apply(event(5, &[]));
        assert_eq!(user.name, "user-v5");
        assert_eq!(user.version, 5);
        assert!(!user.has_permission("items:read"));
    }
}
