mod support;

use docrepo::{
    async_trait, to_payload, Collection, GenericRepository, InMemoryCollection, InMemoryStore,
    ObjectId, Repository, RepositoryConfig, RepositoryError, Result, StorageError,
};
use serde::Serialize;
use serde_json::json;
use support::models::{email, names, User, UserRecord};

/// Repository that supports bulk creation on top of the base contract.
struct UserBatchRepository {
    users: InMemoryCollection<User>,
    config: RepositoryConfig,
}

impl UserBatchRepository {
    fn new(store: &InMemoryStore) -> Self {
        support::init_tracing();
        Self {
            users: store.collection::<User>(),
            config: RepositoryConfig::default(),
        }
    }
}

#[async_trait]
impl Repository for UserBatchRepository {
    type Entity = User;
    type Record = UserRecord;
    type Handle = InMemoryCollection<User>;

    fn collection(&self) -> &Self::Handle {
        &self.users
    }

    fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    async fn create_many<D>(&self, data: &[D]) -> Result<Vec<UserRecord>>
    where
        D: Serialize + Sync,
    {
        let docs = data.iter().map(to_payload).collect::<Result<Vec<_>>>()?;
        if docs.is_empty() {
            return Ok(Vec::new());
        }
        let stored = self.users.insert_many(docs).await?;
        self.to_records(stored)
    }
}

#[tokio::test]
async fn overridden_create_many_inserts_in_order() {
    let store = InMemoryStore::new();
    let repo = UserBatchRepository::new(&store);

    let created = repo
        .create_many(&[
            json!({ "name": "Ada", "email": email("Ada") }),
            json!({ "name": "Grace", "email": email("Grace"), "role": "admin" }),
        ])
        .await
        .unwrap();

    assert_eq!(names(&created), vec!["Ada", "Grace"]);
    assert_eq!(created[0].role, "member");
    assert_eq!(created[1].role, "admin");
    assert!(created.iter().all(|u| ObjectId::is_valid(&u.id)));
    assert_eq!(repo.count(json!({})).await.unwrap(), 2);
}

#[tokio::test]
async fn overridden_create_many_is_all_or_nothing() {
    let store = InMemoryStore::new();
    let repo = UserBatchRepository::new(&store);
    let id = ObjectId::new().to_hex();

    let err = repo
        .create_many(&[
            json!({ "_id": id, "name": "Ada", "email": email("Ada") }),
            json!({ "_id": id, "name": "Grace", "email": email("Grace") }),
        ])
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RepositoryError::Storage(StorageError::DuplicateKey {
            collection: "users".into(),
            id,
        })
    );

    let err = repo
        .create_many(&[json!({ "name": "Ada", "email": email("Ada") }), json!({})])
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidArgument(_)));

    assert_eq!(repo.count(json!({})).await.unwrap(), 0);
}

#[tokio::test]
async fn overridden_create_many_accepts_typed_entities() {
    let store = InMemoryStore::new();
    let repo = UserBatchRepository::new(&store);

    let batch: Vec<User> = ["Ada", "Grace", "Hedy"]
        .iter()
        .map(|name| User {
            id: None,
            name: name.to_string(),
            email: email(name),
            role: "member".into(),
            logins: 1,
        })
        .collect();

    let created = repo.create_many(&batch).await.unwrap();
    assert_eq!(created.len(), 3);
    assert!(created.iter().all(|u| u.logins == 1));

    let empty: Vec<User> = Vec::new();
    assert!(repo.create_many(&empty).await.unwrap().is_empty());
}

#[tokio::test]
async fn other_operations_still_come_from_the_base() {
    let store = InMemoryStore::new();
    let batch = UserBatchRepository::new(&store);
    let plain: GenericRepository<User, UserRecord, _> =
        GenericRepository::new(store.collection::<User>());

    let created = batch
        .create_many(&[json!({ "name": "Ada", "email": email("Ada") })])
        .await
        .unwrap();

    let found = plain.get(&created[0].id, None).await.unwrap().unwrap();
    assert_eq!(found, created[0]);

    batch.remove(&created[0].id).await.unwrap();
    assert_eq!(plain.count(json!({})).await.unwrap(), 0);

    let err = plain
        .create_many(&[json!({ "name": "Grace", "email": email("Grace") })])
        .await
        .unwrap_err();
    assert_eq!(err, RepositoryError::NotImplemented("create_many"));
}
