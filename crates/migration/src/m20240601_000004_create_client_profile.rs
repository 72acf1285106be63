//! Create `client_profile` table, one-to-one with `account`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClientProfile::Table)
                    .if_not_exists()
                    .col(pk_auto(ClientProfile::Id))
                    .col(integer(ClientProfile::AccountId).unique_key().not_null())
                    .col(string_len(ClientProfile::Phone, 15).not_null().default(""))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_profile_account")
                            .from(ClientProfile::Table, ClientProfile::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ClientProfile::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ClientProfile { Table, Id, AccountId, Phone }

#[derive(DeriveIden)]
enum Account { Table, Id }
