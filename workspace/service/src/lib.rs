//! The journal core: identity store, social graph, feed composer, the
//! post store the feed reads from, and the shared pagination helper.
//!
//! Every component is constructed with an explicit database handle;
//! there is no ambient global state to look things up from.

pub mod error;
pub mod feed;
pub mod graph;
pub mod identity;
pub mod pagination;
pub mod posts;
pub mod token;

pub use error::{Result, ServiceError};
pub use feed::FeedService;
pub use graph::SocialGraph;
pub use identity::{IdentityService, NewUser, ProfileUpdate};
pub use posts::{NewPost, PostService};
pub use token::TokenSigner;

#[cfg(test)]
pub(crate) mod test_support {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

    use crate::identity::{IdentityService, NewUser};
    use crate::posts::{NewPost, PostService};
    use crate::{FeedService, SocialGraph, TokenSigner};

    pub async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");
        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
        db
    }

    pub async fn setup_services() -> (IdentityService, SocialGraph, FeedService, PostService) {
        let db = setup_db().await;
        let signer = TokenSigner::new(b"test-secret", 600);
        let identity = IdentityService::new(db.clone(), signer).expect("identity service");
        let graph = SocialGraph::new(db.clone());
        let feed = FeedService::new(db.clone());
        let posts = PostService::new(db);
        (identity, graph, feed, posts)
    }

    pub fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password: format!("pw-{name}"),
        }
    }

    pub async fn seed_posts(posts: &PostService, author_id: i32, count: usize) {
        for i in 0..count {
            posts
                .create_post(
                    author_id,
                    NewPost {
                        title: None,
                        body: format!("entry {i}"),
                        language: None,
                    },
                )
                .await
                .expect("seed post");
        }
    }
}
