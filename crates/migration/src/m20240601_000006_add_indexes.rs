use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const INDEXES: [(&str, VisitRequest); 4] = [
    ("idx_visit_request_state", VisitRequest::State),
    ("idx_visit_request_client", VisitRequest::ClientId),
    ("idx_visit_request_gardener", VisitRequest::GardenerId),
    ("idx_visit_request_created_at", VisitRequest::CreatedAt),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, col) in INDEXES {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(VisitRequest::Table)
                        .col(col)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, _) in INDEXES {
            manager
                .drop_index(Index::drop().name(name).table(VisitRequest::Table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden, Clone, Copy)]
enum VisitRequest { Table, State, ClientId, GardenerId, CreatedAt }
