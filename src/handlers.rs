pub mod auth;
pub mod feed;
pub mod follows;
pub mod health;
pub mod posts;
pub mod users;
