//! Create `visit_request` table.
//!
//! Owned by a client profile (cascade); the assigned gardener is nulled when
//! its profile disappears.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VisitRequest::Table)
                    .if_not_exists()
                    .col(pk_auto(VisitRequest::Id))
                    .col(integer(VisitRequest::ClientId).not_null())
                    .col(ColumnDef::new(VisitRequest::GardenerId).integer().null())
                    .col(string_len(VisitRequest::Address, 300).not_null())
                    .col(string_len(VisitRequest::ServiceType, 100).not_null())
                    .col(string_len(VisitRequest::Availability, 200).not_null())
                    .col(
                        integer(VisitRequest::AreaM2)
                            .not_null()
                            .check(Expr::col(VisitRequest::AreaM2).gte(0)),
                    )
                    .col(ColumnDef::new(VisitRequest::Latitude).double().null())
                    .col(ColumnDef::new(VisitRequest::Longitude).double().null())
                    .col(string_len(VisitRequest::State, 20).not_null().default("solicitada"))
                    .col(timestamp_with_time_zone(VisitRequest::CreatedAt).not_null())
                    .col(
                        ColumnDef::new(VisitRequest::ConfirmedVisitAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_visit_request_client")
                            .from(VisitRequest::Table, VisitRequest::ClientId)
                            .to(ClientProfile::Table, ClientProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_visit_request_gardener")
                            .from(VisitRequest::Table, VisitRequest::GardenerId)
                            .to(GardenerProfile::Table, GardenerProfile::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(VisitRequest::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum VisitRequest {
    Table,
    Id,
    ClientId,
    GardenerId,
    Address,
    ServiceType,
    Availability,
    AreaM2,
    Latitude,
    Longitude,
    State,
    CreatedAt,
    ConfirmedVisitAt,
}

#[derive(DeriveIden)]
enum ClientProfile { Table, Id }

#[derive(DeriveIden)]
enum GardenerProfile { Table, Id }
