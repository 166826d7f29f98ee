use model::entities::follow_edge;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Set,
};
use tracing::{debug, instrument};

use crate::error::Result;

/// Follow/unfollow edges, membership queries, and exact counts.
///
/// Both edits are idempotent: following an already-followed user and
/// unfollowing a non-followed user are no-ops, never errors. A
/// self-follow request is tolerated as a harmless no-op even though the
/// API layer rejects it first.
#[derive(Clone, Debug)]
pub struct SocialGraph {
    db: DatabaseConnection,
}

impl SocialGraph {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Idempotent edge insert.
    #[instrument(skip(self))]
    pub async fn follow(&self, follower: i32, target: i32) -> Result<()> {
        if follower == target {
            debug!("self-follow ignored");
            return Ok(());
        }
        follow_edge::Entity::insert(follow_edge::ActiveModel {
            follower_id: Set(follower),
            followed_id: Set(target),
        })
        .on_conflict(
            OnConflict::columns([
                follow_edge::Column::FollowerId,
                follow_edge::Column::FollowedId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .do_nothing()
        .exec(&self.db)
        .await?;
        Ok(())
    }

    /// Idempotent edge delete.
    #[instrument(skip(self))]
    pub async fn unfollow(&self, follower: i32, target: i32) -> Result<()> {
        follow_edge::Entity::delete_many()
            .filter(follow_edge::Column::FollowerId.eq(follower))
            .filter(follow_edge::Column::FollowedId.eq(target))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn is_following(&self, follower: i32, target: i32) -> Result<bool> {
        Ok(follow_edge::Entity::find_by_id((follower, target))
            .one(&self.db)
            .await?
            .is_some())
    }

    /// Exact count of users following `user`, computed at call time.
    pub async fn followers_count(&self, user: i32) -> Result<u64> {
        Ok(follow_edge::Entity::find()
            .filter(follow_edge::Column::FollowedId.eq(user))
            .count(&self.db)
            .await?)
    }

    /// Exact count of users `user` follows, computed at call time.
    pub async fn following_count(&self, user: i32) -> Result<u64> {
        Ok(follow_edge::Entity::find()
            .filter(follow_edge::Column::FollowerId.eq(user))
            .count(&self.db)
            .await?)
    }

    /// Ids of everyone `user` follows.
    pub async fn following_ids(&self, user: i32) -> Result<Vec<i32>> {
        Ok(follow_edge::Entity::find()
            .select_only()
            .column(follow_edge::Column::FollowedId)
            .filter(follow_edge::Column::FollowerId.eq(user))
            .into_tuple()
            .all(&self.db)
            .await?)
    }

    /// Ids of everyone following `user`.
    pub async fn follower_ids(&self, user: i32) -> Result<Vec<i32>> {
        Ok(follow_edge::Entity::find()
            .select_only()
            .column(follow_edge::Column::FollowerId)
            .filter(follow_edge::Column::FollowedId.eq(user))
            .into_tuple()
            .all(&self.db)
            .await?)
    }
}
