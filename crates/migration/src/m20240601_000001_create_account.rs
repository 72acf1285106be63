//! Create `account` table.
//!
//! Identity rows; role comes from `is_staff` or an attached profile table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(pk_auto(Account::Id))
                    .col(string_len(Account::Username, 150).unique_key().not_null())
                    .col(string_len(Account::FirstName, 150).not_null().default(""))
                    .col(string_len(Account::LastName, 150).not_null().default(""))
                    .col(string_len(Account::Email, 254).not_null().default(""))
                    .col(boolean(Account::IsStaff).not_null().default(false))
                    .col(boolean(Account::IsActive).not_null().default(true))
                    .col(timestamp_with_time_zone(Account::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Account::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Account::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Account { Table, Id, Username, FirstName, LastName, Email, IsStaff, IsActive, CreatedAt, UpdatedAt }
