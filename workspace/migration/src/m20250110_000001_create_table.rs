use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_len_null(Users::Firstname, 50))
                    .col(string_len_null(Users::Lastname, 50))
                    .col(string_len(Users::Username, 64).unique_key())
                    .col(string_len(Users::Email, 120).unique_key())
                    .col(string_len(Users::PasswordHash, 256))
                    .col(string_len_null(Users::AboutMe, 140))
                    .col(timestamp_with_time_zone_null(Users::LastSeen))
                    .to_owned(),
            )
            .await?;

        // Create posts table
        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(pk_auto(Posts::Id))
                    .col(string_len_null(Posts::Title, 120))
                    .col(text(Posts::Body))
                    .col(timestamp_with_time_zone(Posts::Timestamp))
                    .col(integer(Posts::UserId))
                    .col(string_len_null(Posts::Language, 8))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_author")
                            .from(Posts::Table, Posts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create follow_edges table (directed follower -> followed pairs)
        manager
            .create_table(
                Table::create()
                    .table(FollowEdges::Table)
                    .if_not_exists()
                    .col(integer(FollowEdges::FollowerId))
                    .col(integer(FollowEdges::FollowedId))
                    .primary_key(
                        Index::create()
                            .name("pk_follow_edges")
                            .col(FollowEdges::FollowerId)
                            .col(FollowEdges::FollowedId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_follow_edges_follower")
                            .from(FollowEdges::Table, FollowEdges::FollowerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_follow_edges_followed")
                            .from(FollowEdges::Table, FollowEdges::FollowedId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Feed queries sort on timestamp and filter on author
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_timestamp")
                    .table(Posts::Table)
                    .col(Posts::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_user_id")
                    .table(Posts::Table)
                    .col(Posts::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FollowEdges::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Firstname,
    Lastname,
    Username,
    Email,
    PasswordHash,
    AboutMe,
    LastSeen,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    Title,
    Body,
    Timestamp,
    UserId,
    Language,
}

#[derive(DeriveIden)]
enum FollowEdges {
    Table,
    FollowerId,
    FollowedId,
}
