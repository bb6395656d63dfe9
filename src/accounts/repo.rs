use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use tracing::debug;

use super::repo_types::{PublicUser, User};
use crate::error::AppError;

const USERS_COLLECTION: &str = "users";

/// Persistence seam for user documents.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_name_pattern(&self, pattern: &str) -> Result<Vec<PublicUser>, AppError>;
    async fn find_by_contact_pattern(&self, pattern: &str) -> Result<Vec<PublicUser>, AppError>;
    async fn insert(&self, user: User) -> Result<User, AppError>;
}

/// MongoDB-backed store over the `users` collection.
#[derive(Clone)]
pub struct MongoUserStore {
    users: Collection<User>,
}

impl MongoUserStore {
    /// Opens the collection and makes sure the unique email index exists.
    pub async fn init(db: &Database) -> mongodb::error::Result<Self> {
        let users = db.collection::<User>(USERS_COLLECTION);
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        users.create_index(index).await?;
        Ok(Self { users })
    }

    fn public(&self) -> Collection<PublicUser> {
        self.users.clone_with_type::<PublicUser>()
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = self.users.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    async fn find_by_name_pattern(&self, pattern: &str) -> Result<Vec<PublicUser>, AppError> {
        let cursor = self
            .public()
            .find(doc! { "name": { "$regex": pattern, "$options": "i" } })
            .projection(doc! { "password_hash": 0 })
            .await?;
        let users: Vec<PublicUser> = cursor.try_collect().await?;
        debug!(matches = users.len(), "name search");
        Ok(users)
    }

    async fn find_by_contact_pattern(&self, pattern: &str) -> Result<Vec<PublicUser>, AppError> {
        let cursor = self
            .public()
            .find(doc! { "contact": { "$regex": pattern } })
            .projection(doc! { "password_hash": 0 })
            .await?;
        let users: Vec<PublicUser> = cursor.try_collect().await?;
        debug!(matches = users.len(), "contact search");
        Ok(users)
    }

    async fn insert(&self, mut user: User) -> Result<User, AppError> {
        let result = self.users.insert_one(&user).await?;
        user.id = result.inserted_id.as_object_id();
        Ok(user)
    }
}
