//! Create `account_credentials` table storing password hashes.
//! One row per account, removed together with it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AccountCredentials::Table)
                    .if_not_exists()
                    .col(pk_auto(AccountCredentials::Id))
                    .col(integer(AccountCredentials::AccountId).unique_key().not_null())
                    .col(string_len(AccountCredentials::PasswordHash, 255).not_null())
                    .col(string_len(AccountCredentials::PasswordAlgorithm, 64).not_null())
                    .col(timestamp_with_time_zone(AccountCredentials::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(AccountCredentials::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_credentials_account")
                            .from(AccountCredentials::Table, AccountCredentials::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AccountCredentials::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AccountCredentials {
    Table,
    Id,
    AccountId,
    PasswordHash,
    PasswordAlgorithm,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Account { Table, Id }
