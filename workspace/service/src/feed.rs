use common::{Page, PageRequest};
use model::entities::{follow_edge, post};
use sea_orm::sea_query::Query;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select,
};
use tracing::instrument;

use crate::error::Result;
use crate::pagination::paginate;

/// Builds the personalized, deduplicated, time-ordered post feed.
///
/// The eligible-author set (the user plus everyone they follow) is
/// evaluated as a subquery inside one statement, so there is no
/// per-author fetch-and-merge and a follow committed mid-request cannot
/// duplicate or skip posts within one page. Drift between two separate
/// page requests is accepted.
#[derive(Clone, Debug)]
pub struct FeedService {
    db: DatabaseConnection,
}

impl FeedService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The following feed: posts authored by `user_id` or by anyone
    /// they follow, ordered (timestamp desc, id desc). The user is
    /// always in their own feed; no self-follow edge is needed.
    #[instrument(skip(self))]
    pub async fn feed_for(&self, user_id: i32, req: &PageRequest) -> Result<Page<post::Model>> {
        paginate(self.following_feed_query(user_id), &self.db, req).await
    }

    /// The public home timeline: every post, same ordering contract.
    #[instrument(skip(self))]
    pub async fn feed_all(&self, req: &PageRequest) -> Result<Page<post::Model>> {
        paginate(sorted(post::Entity::find()), &self.db, req).await
    }

    /// One author's posts, newest first, as shown on a profile page.
    #[instrument(skip(self))]
    pub async fn posts_by(&self, user_id: i32, req: &PageRequest) -> Result<Page<post::Model>> {
        paginate(
            sorted(post::Entity::find().filter(post::Column::UserId.eq(user_id))),
            &self.db,
            req,
        )
        .await
    }

    fn following_feed_query(&self, user_id: i32) -> Select<post::Entity> {
        sorted(
            post::Entity::find().filter(
                Condition::any()
                    .add(post::Column::UserId.eq(user_id))
                    .add(
                        post::Column::UserId.in_subquery(
                            Query::select()
                                .column(follow_edge::Column::FollowedId)
                                .from(follow_edge::Entity)
                                .and_where(follow_edge::Column::FollowerId.eq(user_id))
                                .to_owned(),
                        ),
                    ),
            ),
        )
    }
}

/// The one ordering contract every listing shares: timestamp desc with
/// the id tiebreak that keeps pagination deterministic.
fn sorted(select: Select<post::Entity>) -> Select<post::Entity> {
    select
        .order_by_desc(post::Column::Timestamp)
        .order_by_desc(post::Column::Id)
}
