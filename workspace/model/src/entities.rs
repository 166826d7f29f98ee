//! Root for all SeaORM entity modules of the journal application:
//! users, their posts, and the directed follow edges between users.

pub mod follow_edge;
pub mod post;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::follow_edge::Entity as FollowEdge;
    pub use super::post::Entity as Post;
    pub use super::user::Entity as User;
}
