use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

use crate::models::{OptionKind, Poll, PollVote, PollWithCreator, VoteSelection};

pub mod migrator;
pub mod repositories;

pub use repositories::user::User;
pub use repositories::vote::BallotOutcome;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn poll_repo(&self) -> repositories::poll::PollRepository {
        repositories::poll::PollRepository::new(self.conn.clone())
    }

    fn vote_repo(&self) -> repositories::vote::VoteRepository {
        repositories::vote::VoteRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Polls
    // ========================================================================

    pub async fn create_poll(&self, poll: &Poll) -> Result<()> {
        self.poll_repo().create(poll).await
    }

    pub async fn get_poll(&self, id: &str) -> Result<Option<Poll>> {
        self.poll_repo().get(id).await
    }

    pub async fn get_poll_with_creator(&self, id: &str) -> Result<Option<PollWithCreator>> {
        self.poll_repo().get_with_creator(id).await
    }

    // ========================================================================
    // Votes
    // ========================================================================

    pub async fn record_ballot(
        &self,
        poll_id: &str,
        user_id: &str,
        selections: &[VoteSelection],
    ) -> Result<BallotOutcome> {
        self.vote_repo()
            .record_ballot(poll_id, user_id, selections)
            .await
    }

    pub async fn votes_by_poll_and_user(
        &self,
        poll_id: &str,
        user_id: &str,
    ) -> Result<Vec<PollVote>> {
        self.vote_repo().list_by_poll_and_user(poll_id, user_id).await
    }

    pub async fn vote_counts_by_option(
        &self,
        poll_id: &str,
    ) -> Result<HashMap<(i32, OptionKind), u64>> {
        self.vote_repo().count_by_option(poll_id).await
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn upsert_user(
        &self,
        oauth_provider: &str,
        oauth_id: &str,
        nickname: &str,
        avatar_url: &str,
    ) -> Result<User> {
        self.user_repo()
            .upsert(oauth_provider, oauth_id, nickname, avatar_url)
            .await
    }
}
