use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // At most one open alert per (user, type). Closes the
        // check-then-act window in alert derivation: a concurrent insert
        // loses with a unique violation instead of duplicating the alert.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_alert_open_per_type \
                 ON alert (user_id, alert_type) WHERE resolved = false;",
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_alert_open_per_type;")
            .await?;
        Ok(())
    }
}
