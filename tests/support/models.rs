//! Test entities and result records.

use docrepo::{Entity, GenericRepository, InMemoryCollection, InMemoryStore, Repository};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Stored shape of a user.
#[derive(Debug, Clone, Serialize, Deserialize, Entity)]
#[entity(collection = "users")]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[entity(default = "member")]
    #[serde(default)]
    pub role: String,
    #[entity(default = 0)]
    #[serde(default)]
    pub logins: i64,
}

/// Plain record handed back to callers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub logins: i64,
}

pub type UserRepository = GenericRepository<User, UserRecord, InMemoryCollection<User>>;

pub fn user_repository(store: &InMemoryStore) -> UserRepository {
    GenericRepository::new(store.collection::<User>())
}

pub fn email(name: &str) -> String {
    format!("{}@example.com", name.to_lowercase())
}

/// Creates one user per name, in order.
pub async fn seed<R>(repo: &R, names: &[&str]) -> Vec<R::Record>
where
    R: Repository<Entity = User>,
{
    let mut created = Vec::with_capacity(names.len());
    for name in names {
        let record = repo
            .create(&json!({ "name": name, "email": email(name) }))
            .await
            .unwrap();
        created.push(record);
    }
    created
}

/// Creates users with an explicit role.
pub async fn seed_with_role<R>(repo: &R, names: &[&str], role: &str) -> Vec<R::Record>
where
    R: Repository<Entity = User>,
{
    let mut created = Vec::with_capacity(names.len());
    for name in names {
        let record = repo
            .create(&json!({ "name": name, "email": email(name), "role": role }))
            .await
            .unwrap();
        created.push(record);
    }
    created
}

pub fn names(records: &[UserRecord]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}
