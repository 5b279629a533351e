use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ========== READINGS ==========
        // `ts` stays nullable: rows written without a timestamp are kept and
        // skipped at aggregation time instead of being rejected on insert.
        manager
            .create_table(
                Table::create()
                    .table(Readings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Readings::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(ColumnDef::new(Readings::Ts).timestamp_with_time_zone())
                    .col(ColumnDef::new(Readings::Ph).double())
                    .col(ColumnDef::new(Readings::Temp).double())
                    .col(ColumnDef::new(Readings::Outlet1).double())
                    .col(ColumnDef::new(Readings::Outlet2).double())
                    .col(ColumnDef::new(Readings::Outlet3).double())
                    .col(ColumnDef::new(Readings::Outlet4).double())
                    .to_owned(),
            )
            .await?;

        // Both store queries walk the newest rows first
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_readings_ts ON readings (ts DESC NULLS LAST)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Readings::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Readings {
    Table,
    Id,
    Ts,
    Ph,
    Temp,
    Outlet1,
    Outlet2,
    Outlet3,
    Outlet4,
}
