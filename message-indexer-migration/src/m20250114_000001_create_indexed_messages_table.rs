use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IndexedMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IndexedMessages::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IndexedMessages::Sender).string().not_null())
                    .col(ColumnDef::new(IndexedMessages::Message).text().not_null())
                    .col(
                        ColumnDef::new(IndexedMessages::Timestamp)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // covers the recent-messages listing: timestamp order with id tie-break
        manager
            .create_index(
                Index::create()
                    .name("idx_indexed_messages_timestamp_id")
                    .table(IndexedMessages::Table)
                    .col(IndexedMessages::Timestamp)
                    .col(IndexedMessages::Id)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_indexed_messages_sender")
                    .table(IndexedMessages::Table)
                    .col(IndexedMessages::Sender)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IndexedMessages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum IndexedMessages {
    Table,
    Id,
    Sender,
    Message,
    Timestamp,
}
