use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // Already-voted gate: at most one ballot per (poll, user).
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_poll_ballots_poll_user_unique ON poll_ballots(poll_id, user_id)",
        )
        .await?;

        // Never two vote rows for the identical option by the same user.
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_poll_votes_selection_unique ON poll_votes(poll_id, user_id, anilist_id, kind)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_oauth_identity_unique ON users(oauth_provider, oauth_id)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_poll_options_poll ON poll_options(poll_id)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_poll_votes_poll ON poll_votes(poll_id)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_poll_votes_poll")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_poll_options_poll")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_users_oauth_identity_unique")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_poll_votes_selection_unique")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_poll_ballots_poll_user_unique")
            .await?;

        Ok(())
    }
}
