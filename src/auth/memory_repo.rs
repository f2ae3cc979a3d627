use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::repo::{StoreError, UserStore};
use crate::auth::repo_types::{NewUser, User, UserChanges};

/// `UserStore` over a map, enforcing the same email uniqueness as the
/// `users_email_lower_key` index.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, None) {
            return Err(StoreError::UniqueViolation("users_email_lower_key".into()));
        }
        let now = OffsetDateTime::now_utc();
        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            phone: user.phone,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<u64, StoreError> {
        let mut users = self.users.write().await;
        if let Some(email) = &changes.email {
            if email_taken(&users, email, Some(id)) {
                return Err(StoreError::UniqueViolation("users_email_lower_key".into()));
            }
        }
        let Some(user) = users.get_mut(&id) else {
            return Ok(0);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        if let Some(phone) = changes.phone {
            user.phone = phone;
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(1)
    }

    async fn destroy(&self, id: Uuid) -> Result<u64, StoreError> {
        Ok(self.users.write().await.remove(&id).map_or(0, |_| 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test User".into(),
            email: email.into(),
            password_hash: "hash".into(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let store = MemoryUserStore::default();
        store.create(new_user("a@x.com")).await.unwrap();
        let err = store.create(new_user("A@X.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn update_is_partial_and_destroy_is_idempotent() {
        let store = MemoryUserStore::default();
        let user = store.create(new_user("a@x.com")).await.unwrap();

        let changes = UserChanges {
            name: Some("B".into()),
            phone: Some(Some("555".into())),
            ..Default::default()
        };
        assert_eq!(store.update(user.id, changes).await.unwrap(), 1);
        let updated = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.name, "B");
        assert_eq!(updated.email, "a@x.com");
        assert_eq!(updated.phone.as_deref(), Some("555"));

        assert_eq!(store.destroy(user.id).await.unwrap(), 1);
        assert_eq!(store.destroy(user.id).await.unwrap(), 0);
        assert_eq!(store.update(user.id, UserChanges::default()).await.unwrap(), 0);
    }
}
