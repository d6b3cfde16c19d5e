use anyhow::Result;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::entities::{poll_options, polls, prelude::*, users};
use crate::models::{Creator, OptionKind, Poll, PollOption, PollWithCreator};

/// Repository for poll definitions. Polls are immutable once created, so the
/// contract is create and read only.
pub struct PollRepository {
    conn: DatabaseConnection,
}

impl PollRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Model Conversion Helpers
    // ========================================================================

    fn map_option_model(o: poll_options::Model) -> Result<PollOption> {
        let kind: OptionKind = o
            .kind
            .parse()
            .map_err(|e: String| anyhow::anyhow!("Corrupt poll option row {}: {e}", o.id))?;

        Ok(PollOption {
            anilist_id: o.anilist_id,
            kind,
            text: o.text,
        })
    }

    fn map_poll_model(p: polls::Model, options: Vec<poll_options::Model>) -> Result<Poll> {
        let options = options
            .into_iter()
            .map(Self::map_option_model)
            .collect::<Result<Vec<_>>>()?;

        Ok(Poll {
            id: p.id,
            user_id: p.user_id,
            title: p.title,
            end_date: p.end_date,
            multi_options: p.multi_options,
            options,
        })
    }

    // ========================================================================
    // Poll Operations
    // ========================================================================

    /// Persist a poll and its option list atomically.
    pub async fn create(&self, poll: &Poll) -> Result<()> {
        let txn = self.conn.begin().await?;

        let poll_model = polls::ActiveModel {
            id: Set(poll.id.clone()),
            user_id: Set(poll.user_id.clone()),
            title: Set(poll.title.clone()),
            end_date: Set(poll.end_date.clone()),
            multi_options: Set(poll.multi_options),
            created_at: Set(Utc::now().to_rfc3339()),
        };
        Polls::insert(poll_model).exec(&txn).await?;

        for (position, option) in poll.options.iter().enumerate() {
            let option_model = poll_options::ActiveModel {
                poll_id: Set(poll.id.clone()),
                anilist_id: Set(option.anilist_id),
                kind: Set(option.kind.to_string()),
                text: Set(option.text.clone()),
                position: Set(position as i32),
                ..Default::default()
            };
            PollOptions::insert(option_model).exec(&txn).await?;
        }

        txn.commit().await?;
        info!("Created poll {} ({} options)", poll.id, poll.options.len());
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Poll>> {
        let Some(poll) = Polls::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let options = self.options_for(id).await?;
        Ok(Some(Self::map_poll_model(poll, options)?))
    }

    /// Same as [`Self::get`], additionally resolving the creator's display
    /// profile. A missing user row degrades to an anonymous creator rather
    /// than failing the read.
    pub async fn get_with_creator(&self, id: &str) -> Result<Option<PollWithCreator>> {
        let Some(poll) = Polls::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let creator = Users::find_by_id(&poll.user_id)
            .one(&self.conn)
            .await?
            .map_or_else(Creator::anonymous, |u: users::Model| Creator {
                nickname: u.nickname,
                avatar_url: u.avatar_url,
            });

        let options = self.options_for(id).await?;
        Ok(Some(PollWithCreator {
            poll: Self::map_poll_model(poll, options)?,
            creator,
        }))
    }

    async fn options_for(&self, poll_id: &str) -> Result<Vec<poll_options::Model>> {
        Ok(PollOptions::find()
            .filter(poll_options::Column::PollId.eq(poll_id))
            .order_by_asc(poll_options::Column::Position)
            .all(&self.conn)
            .await?)
    }
}
