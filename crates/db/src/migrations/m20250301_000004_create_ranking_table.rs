//! Create ranking table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ranking::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ranking::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ranking::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Ranking::DishId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Ranking::RestaurantId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Ranking::DishType).string_len(64))
                    .col(ColumnDef::new(Ranking::Rank).small_integer())
                    .col(ColumnDef::new(Ranking::TasteStatus).string_len(16))
                    .col(ColumnDef::new(Ranking::Notes).text())
                    .col(
                        ColumnDef::new(Ranking::PhotoUrls)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Ranking::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Ranking::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ranking_user")
                            .from(Ranking::Table, Ranking::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ranking_dish")
                            .from(Ranking::Table, Ranking::DishId)
                            .to(Dish::Table, Dish::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ranking_restaurant")
                            .from(Ranking::Table, Ranking::RestaurantId)
                            .to(Restaurant::Table, Restaurant::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, dish_id) - one ranking per user per dish.
        // Backstop for the concurrent-create race.
        manager
            .create_index(
                Index::create()
                    .name("idx_ranking_user_dish")
                    .table(Ranking::Table)
                    .col(Ranking::UserId)
                    .col(Ranking::DishId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: dish_id (listing and stats per dish)
        manager
            .create_index(
                Index::create()
                    .name("idx_ranking_dish_id")
                    .table(Ranking::Table)
                    .col(Ranking::DishId)
                    .to_owned(),
            )
            .await?;

        // Index: user_id (listing a user's rankings)
        manager
            .create_index(
                Index::create()
                    .name("idx_ranking_user_id")
                    .table(Ranking::Table)
                    .col(Ranking::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (recency ordering)
        manager
            .create_index(
                Index::create()
                    .name("idx_ranking_created_at")
                    .table(Ranking::Table)
                    .col(Ranking::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Exactly one of rank / taste_status; rank bounded to [1, 5]
        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE \"ranking\" ADD CONSTRAINT \"chk_ranking_assessment\" \
                 CHECK ((\"rank\" IS NULL) <> (\"taste_status\" IS NULL))",
            )
            .await?;
        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE \"ranking\" ADD CONSTRAINT \"chk_ranking_rank_range\" \
                 CHECK (\"rank\" IS NULL OR (\"rank\" BETWEEN 1 AND 5))",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ranking::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Ranking {
    Table,
    Id,
    UserId,
    DishId,
    RestaurantId,
    DishType,
    Rank,
    TasteStatus,
    Notes,
    PhotoUrls,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Dish {
    Table,
    Id,
}

#[derive(Iden)]
enum Restaurant {
    Table,
    Id,
}
