use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::users;

/// User display profile as stored by the identity layer.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub oauth_provider: String,
    pub oauth_id: String,
    pub nickname: String,
    pub avatar_url: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            oauth_provider: model.oauth_provider,
            oauth_id: model.oauth_id,
            nickname: model.nickname,
            avatar_url: model.avatar_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Insert or refresh the profile for an OAuth identity. The identity is
    /// keyed by `(oauth_provider, oauth_id)`; nickname and avatar follow
    /// whatever the provider reported last.
    pub async fn upsert(
        &self,
        oauth_provider: &str,
        oauth_id: &str,
        nickname: &str,
        avatar_url: &str,
    ) -> Result<User> {
        let existing = users::Entity::find()
            .filter(users::Column::OauthProvider.eq(oauth_provider))
            .filter(users::Column::OauthId.eq(oauth_id))
            .one(&self.conn)
            .await
            .context("Failed to query user by OAuth identity")?;

        let now = Utc::now().to_rfc3339();

        if let Some(user) = existing {
            let mut active: users::ActiveModel = user.into();
            active.nickname = Set(nickname.to_string());
            active.avatar_url = Set(avatar_url.to_string());
            active.updated_at = Set(now);
            let updated = active
                .update(&self.conn)
                .await
                .context("Failed to update user profile")?;
            return Ok(User::from(updated));
        }

        let model = users::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            oauth_provider: Set(oauth_provider.to_string()),
            oauth_id: Set(oauth_id.to_string()),
            nickname: Set(nickname.to_string()),
            avatar_url: Set(avatar_url.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(&self.conn)
            .await
            .context("Failed to insert user profile")?;
        Ok(User::from(inserted))
    }
}
