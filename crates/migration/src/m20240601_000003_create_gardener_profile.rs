//! Create `gardener_profile` table, one-to-one with `account`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GardenerProfile::Table)
                    .if_not_exists()
                    .col(pk_auto(GardenerProfile::Id))
                    .col(integer(GardenerProfile::AccountId).unique_key().not_null())
                    .col(string_len(GardenerProfile::Specialty, 100).not_null().default(""))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gardener_profile_account")
                            .from(GardenerProfile::Table, GardenerProfile::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(GardenerProfile::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum GardenerProfile { Table, Id, AccountId, Specialty }

#[derive(DeriveIden)]
enum Account { Table, Id }
