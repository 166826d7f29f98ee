use chrono::Utc;
use model::entities::{post, user};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::{info, instrument};

use crate::error::{Result, ServiceError};

/// Content for a new journal entry. The body is treated as rich text
/// and sanitized before storage; the language tag, when present, comes
/// from an external detector.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: Option<String>,
    pub body: String,
    pub language: Option<String>,
}

/// The post store the feed reads from. Post identity is immutable:
/// ids are never reused and the timestamp is assigned at insert.
#[derive(Clone, Debug)]
pub struct PostService {
    db: DatabaseConnection,
}

impl PostService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Insert a post for `author_id` with a server-assigned timestamp.
    #[instrument(skip(self, new_post))]
    pub async fn create_post(&self, author_id: i32, new_post: NewPost) -> Result<post::Model> {
        if user::Entity::find_by_id(author_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound("user", author_id));
        }

        let created = post::ActiveModel {
            title: Set(new_post.title),
            body: Set(ammonia::clean(&new_post.body)),
            timestamp: Set(Utc::now()),
            user_id: Set(author_id),
            language: Set(new_post.language),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(post_id = created.id, author_id, "post created");
        Ok(created)
    }

    pub async fn find_by_id(&self, post_id: i32) -> Result<Option<post::Model>> {
        Ok(post::Entity::find_by_id(post_id).one(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{new_user, setup_services};

    #[tokio::test]
    async fn create_assigns_timestamp_and_author() {
        let (identity, _, _, posts) = setup_services().await;
        let bob = identity.create_user(new_user("bob")).await.unwrap();

        let before = Utc::now();
        let post = posts
            .create_post(
                bob.id,
                NewPost {
                    title: Some("Hello".to_string()),
                    body: "First entry".to_string(),
                    language: Some("en".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(post.user_id, bob.id);
        assert!(post.timestamp >= before);
        assert_eq!(posts.find_by_id(post.id).await.unwrap().unwrap().id, post.id);
    }

    #[tokio::test]
    async fn body_is_sanitized() {
        let (identity, _, _, posts) = setup_services().await;
        let bob = identity.create_user(new_user("bob")).await.unwrap();

        let post = posts
            .create_post(
                bob.id,
                NewPost {
                    title: None,
                    body: "<b>bold</b><script>alert('x')</script>".to_string(),
                    language: None,
                },
            )
            .await
            .unwrap();

        assert!(post.body.contains("<b>bold</b>"));
        assert!(!post.body.contains("script"));
    }

    #[tokio::test]
    async fn unknown_author_is_not_found() {
        let (_, _, _, posts) = setup_services().await;

        let err = posts
            .create_post(
                999,
                NewPost {
                    title: None,
                    body: "orphan".to_string(),
                    language: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("user", 999)));
    }
}
