use std::collections::HashMap;

use anyhow::Result;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{poll_ballots, poll_votes, prelude::*};
use crate::models::{OptionKind, PollVote, VoteSelection};

/// Outcome of the atomic ballot insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallotOutcome {
    /// All vote rows were persisted.
    Recorded,
    /// A uniqueness constraint fired: the user already holds a ballot (or a
    /// vote row for one of the selections) on this poll. Nothing was kept.
    Duplicate,
}

/// Repository for vote rows. Votes are written once through [`Self::record_ballot`]
/// and never mutated or deleted afterwards.
pub struct VoteRepository {
    conn: DatabaseConnection,
}

impl VoteRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_vote_model(v: poll_votes::Model) -> Result<PollVote> {
        let kind: OptionKind = v
            .kind
            .parse()
            .map_err(|e: String| anyhow::anyhow!("Corrupt vote row {}: {e}", v.id))?;

        Ok(PollVote {
            id: v.id,
            user_id: v.user_id,
            poll_id: v.poll_id,
            anilist_id: v.anilist_id,
            kind,
        })
    }

    fn is_unique_violation(err: &DbErr) -> bool {
        matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
    }

    // ========================================================================
    // Vote Operations
    // ========================================================================

    /// Persist one ballot row plus one vote row per selection, all or
    /// nothing. The ballot's `(poll_id, user_id)` unique index is the
    /// already-voted gate; a violation of it (or of the per-selection index)
    /// rolls the whole submission back and reports [`BallotOutcome::Duplicate`].
    pub async fn record_ballot(
        &self,
        poll_id: &str,
        user_id: &str,
        selections: &[VoteSelection],
    ) -> Result<BallotOutcome> {
        let txn = self.conn.begin().await?;
        let now = Utc::now().to_rfc3339();

        let ballot = poll_ballots::ActiveModel {
            poll_id: Set(poll_id.to_string()),
            user_id: Set(user_id.to_string()),
            created_at: Set(now.clone()),
            ..Default::default()
        };

        if let Err(err) = PollBallots::insert(ballot).exec(&txn).await {
            txn.rollback().await?;
            if Self::is_unique_violation(&err) {
                return Ok(BallotOutcome::Duplicate);
            }
            return Err(err.into());
        }

        for selection in selections {
            let vote = poll_votes::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                user_id: Set(user_id.to_string()),
                poll_id: Set(poll_id.to_string()),
                anilist_id: Set(selection.anilist_id),
                kind: Set(selection.kind.to_string()),
                created_at: Set(now.clone()),
            };

            if let Err(err) = PollVotes::insert(vote).exec(&txn).await {
                txn.rollback().await?;
                if Self::is_unique_violation(&err) {
                    return Ok(BallotOutcome::Duplicate);
                }
                return Err(err.into());
            }
        }

        txn.commit().await?;
        info!(
            "Recorded ballot for user {} on poll {} ({} selections)",
            user_id,
            poll_id,
            selections.len()
        );
        Ok(BallotOutcome::Recorded)
    }

    /// All prior votes by one user on one poll, empty if none.
    pub async fn list_by_poll_and_user(
        &self,
        poll_id: &str,
        user_id: &str,
    ) -> Result<Vec<PollVote>> {
        let rows = PollVotes::find()
            .filter(poll_votes::Column::PollId.eq(poll_id))
            .filter(poll_votes::Column::UserId.eq(user_id))
            .order_by_asc(poll_votes::Column::CreatedAt)
            .all(&self.conn)
            .await?;

        rows.into_iter().map(Self::map_vote_model).collect()
    }

    /// Vote count per option key for one poll. Options without votes are
    /// absent here; the service layer zero-fills from the poll's option list.
    pub async fn count_by_option(&self, poll_id: &str) -> Result<HashMap<(i32, OptionKind), u64>> {
        let rows = PollVotes::find()
            .filter(poll_votes::Column::PollId.eq(poll_id))
            .all(&self.conn)
            .await?;

        let mut counts: HashMap<(i32, OptionKind), u64> = HashMap::new();
        for row in rows {
            let vote = Self::map_vote_model(row)?;
            *counts.entry((vote.anilist_id, vote.kind)).or_insert(0) += 1;
        }

        Ok(counts)
    }
}
